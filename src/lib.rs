pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod logger;
pub mod signer;
pub mod source;

pub use config::SignerConfig;
pub use crypto::{KeyEncoding, SignatureAlgorithm};
pub use errors::{KeyError, KeyKind};
pub use signer::KeySigner;
pub use source::KeySource;
