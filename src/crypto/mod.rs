//! Crypto primitives behind the signer: algorithm resolution, PKCS#8/SPKI key decoding,
//! and SHA-256-with-RSA signing with Base64 wrapping.

pub mod algorithm;
pub mod keys;
pub mod signature;

pub use algorithm::SignatureAlgorithm;
pub use keys::{KeyEncoding, MAX_MODULUS_BITS, decode_private_key, decode_public_key, fingerprint};
pub use signature::{decode_signature, encode_signature, sign_message, verify_message};
