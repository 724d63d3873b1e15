//! The key signer: one private key slot, one public key slot, sign and verify.

use crate::config::SignerConfig;
use crate::crypto::{self, KeyEncoding, SignatureAlgorithm};
use crate::errors::{KeyError, KeyKind};
use crate::source::KeySource;
use log::{debug, info};
use parking_lot::RwLock;
use rsa::pkcs1v15::{SigningKey, VerifyingKey};
use sha2::Sha256;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, LazyLock};

const AUDIT: &str = "keysigner::audit";

static SHARED: LazyLock<KeySigner> = LazyLock::new(KeySigner::new);

struct PublicSlot {
    key: VerifyingKey<Sha256>,
    fingerprint: String,
}

/// Holds at most one private and one public RSA key.
///
/// Loading replaces the slot atomically (last load wins). Sign and verify take a
/// snapshot of the slot, so a concurrent load never affects an operation in flight.
pub struct KeySigner {
    algorithm: SignatureAlgorithm,
    encoding: KeyEncoding,
    private_key: RwLock<Option<Arc<SigningKey<Sha256>>>>,
    public_key: RwLock<Option<Arc<PublicSlot>>>,
}

impl Default for KeySigner {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySigner {
    /// Empty signer using SHA256withRSA and DER keys.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(SignatureAlgorithm::default(), KeyEncoding::default())
    }

    #[must_use]
    pub fn with_options(algorithm: SignatureAlgorithm, encoding: KeyEncoding) -> Self {
        Self {
            algorithm,
            encoding,
            private_key: RwLock::new(None),
            public_key: RwLock::new(None),
        }
    }

    /// Build a signer from configuration, loading any key paths it names.
    ///
    /// # Errors
    /// `AlgorithmUnavailable` for an unsupported algorithm, otherwise any load error.
    pub fn from_config(cfg: &SignerConfig) -> Result<Self, KeyError> {
        let signer = Self::with_options(cfg.algorithm()?, cfg.encoding());
        if let Some(p) = &cfg.private_key {
            signer.load_private_key_from_path(p)?;
        }
        if let Some(p) = &cfg.public_key {
            signer.load_public_key_from_path(p)?;
        }
        Ok(signer)
    }

    /// Process-wide instance, created on first use.
    ///
    /// Prefer constructing a signer and passing it where needed; this exists for callers
    /// that want one ambient key pair per process.
    pub fn shared() -> &'static KeySigner {
        &SHARED
    }

    #[must_use]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    #[must_use]
    pub fn encoding(&self) -> KeyEncoding {
        self.encoding
    }

    /// Decode PKCS#8 bytes and install them as the private key.
    ///
    /// # Errors
    /// `KeyFormat` if the bytes are not an RSA PKCS#8 key; the slot is left unchanged.
    pub fn load_private_key(&self, bytes: &[u8]) -> Result<(), KeyError> {
        self.install_private(bytes, "bytes")
    }

    /// Decode SubjectPublicKeyInfo bytes and install them as the public key.
    ///
    /// # Errors
    /// `KeyFormat` if the bytes are not an RSA SPKI key; the slot is left unchanged.
    pub fn load_public_key(&self, bytes: &[u8]) -> Result<(), KeyError> {
        self.install_public(bytes, "bytes")
    }

    /// # Errors
    /// `Io` if the source cannot be read, otherwise as [`KeySigner::load_private_key`].
    pub fn load_private_key_from(&self, source: KeySource) -> Result<(), KeyError> {
        let origin = source.describe();
        let bytes = source.read_all()?;
        self.install_private(&bytes, &origin)
    }

    /// # Errors
    /// `Io` if the source cannot be read, otherwise as [`KeySigner::load_public_key`].
    pub fn load_public_key_from(&self, source: KeySource) -> Result<(), KeyError> {
        let origin = source.describe();
        let bytes = source.read_all()?;
        self.install_public(&bytes, &origin)
    }

    /// # Errors
    /// See [`KeySigner::load_private_key_from`].
    pub fn load_private_key_from_path<P: AsRef<Path>>(&self, path: P) -> Result<(), KeyError> {
        self.load_private_key_from(KeySource::Path(path.as_ref().to_path_buf()))
    }

    /// # Errors
    /// See [`KeySigner::load_public_key_from`].
    pub fn load_public_key_from_path<P: AsRef<Path>>(&self, path: P) -> Result<(), KeyError> {
        self.load_public_key_from(KeySource::Path(path.as_ref().to_path_buf()))
    }

    /// # Errors
    /// See [`KeySigner::load_private_key_from`].
    pub fn load_private_key_from_url(&self, url: &str) -> Result<(), KeyError> {
        self.load_private_key_from(KeySource::Url(url.to_string()))
    }

    /// # Errors
    /// See [`KeySigner::load_public_key_from`].
    pub fn load_public_key_from_url(&self, url: &str) -> Result<(), KeyError> {
        self.load_public_key_from(KeySource::Url(url.to_string()))
    }

    /// # Errors
    /// See [`KeySigner::load_private_key_from`].
    pub fn load_private_key_from_reader<R: Read + Send + 'static>(&self, reader: R) -> Result<(), KeyError> {
        self.load_private_key_from(KeySource::Reader(Box::new(reader)))
    }

    /// # Errors
    /// See [`KeySigner::load_public_key_from`].
    pub fn load_public_key_from_reader<R: Read + Send + 'static>(&self, reader: R) -> Result<(), KeyError> {
        self.load_public_key_from(KeySource::Reader(Box::new(reader)))
    }

    fn install_private(&self, bytes: &[u8], origin: &str) -> Result<(), KeyError> {
        let key = crypto::decode_private_key(bytes, self.encoding)?;
        let signing = Arc::new(SigningKey::<Sha256>::new(key));
        let replaced = self.private_key.write().replace(signing).is_some();
        info!(target: AUDIT, "loaded private key from {origin} (replaced={replaced})");
        Ok(())
    }

    fn install_public(&self, bytes: &[u8], origin: &str) -> Result<(), KeyError> {
        let key = crypto::decode_public_key(bytes, self.encoding)?;
        let fingerprint = crypto::fingerprint(&key)?;
        info!(target: AUDIT, "loaded public key {fingerprint} from {origin}");
        let slot = Arc::new(PublicSlot { key: VerifyingKey::<Sha256>::new(key), fingerprint });
        *self.public_key.write() = Some(slot);
        Ok(())
    }

    fn signing_key(&self) -> Result<Arc<SigningKey<Sha256>>, KeyError> {
        self.private_key.read().clone().ok_or(KeyError::KeyNotLoaded(KeyKind::Private))
    }

    fn public_slot(&self) -> Result<Arc<PublicSlot>, KeyError> {
        self.public_key.read().clone().ok_or(KeyError::KeyNotLoaded(KeyKind::Public))
    }

    /// Sign the UTF-8 bytes of `plaintext`, returning padded standard Base64.
    ///
    /// # Errors
    /// `KeyNotLoaded(Private)` before a private key is loaded.
    pub fn sign(&self, plaintext: &str) -> Result<String, KeyError> {
        let sig = self.sign_bytes(plaintext.as_bytes())?;
        Ok(crypto::encode_signature(&sig))
    }

    /// # Errors
    /// `KeyNotLoaded(Private)` before a private key is loaded.
    pub fn sign_bytes(&self, message: &[u8]) -> Result<Vec<u8>, KeyError> {
        let key = self.signing_key()?;
        let sig = crypto::sign_message(&key, message)?;
        info!(target: AUDIT, "signed {} byte message with {}", message.len(), self.algorithm);
        Ok(sig)
    }

    /// Check a Base64 signature over the UTF-8 bytes of `plaintext`.
    ///
    /// A signature that decodes but does not match (wrong key, altered message, altered or
    /// wrongly sized signature) is `Ok(false)`.
    ///
    /// # Errors
    /// `KeyNotLoaded(Public)` before a public key is loaded; `Encoding` if the signature is not Base64.
    pub fn verify(&self, plaintext: &str, signature_b64: &str) -> Result<bool, KeyError> {
        let slot = self.public_slot()?;
        let sig = crypto::decode_signature(signature_b64)?;
        Ok(Self::check(&slot, plaintext.as_bytes(), &sig))
    }

    /// # Errors
    /// `KeyNotLoaded(Public)` before a public key is loaded.
    pub fn verify_bytes(&self, message: &[u8], signature: &[u8]) -> Result<bool, KeyError> {
        let slot = self.public_slot()?;
        Ok(Self::check(&slot, message, signature))
    }

    fn check(slot: &PublicSlot, message: &[u8], signature: &[u8]) -> bool {
        let ok = crypto::verify_message(&slot.key, message, signature);
        info!(target: AUDIT, "verify with {} -> {}", slot.fingerprint, if ok { "valid" } else { "invalid" });
        ok
    }

    #[must_use]
    pub fn has_private_key(&self) -> bool {
        self.private_key.read().is_some()
    }

    #[must_use]
    pub fn has_public_key(&self) -> bool {
        self.public_key.read().is_some()
    }

    /// Hex SHA-256 of the loaded public key's SPKI encoding.
    #[must_use]
    pub fn public_key_fingerprint(&self) -> Option<String> {
        self.public_key.read().as_ref().map(|s| s.fingerprint.clone())
    }

    /// Drop both keys.
    pub fn clear(&self) {
        *self.private_key.write() = None;
        *self.public_key.write() = None;
        debug!("key slots cleared");
    }
}
