//! Decoding of PKCS#8 private keys and X.509 SubjectPublicKeyInfo public keys.

use crate::errors::{KeyError, KeyKind};
use rsa::pkcs1;
use rsa::pkcs8::der::SecretDocument;
use rsa::pkcs8::{EncodePublicKey, PrivateKeyInfo, SubjectPublicKeyInfoRef};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

const PEM_PREFIX: &[u8] = b"-----BEGIN";

/// Largest accepted modulus. `rsa`'s own PKCS#8 decoders stop at 4096 bits.
pub const MAX_MODULUS_BITS: usize = 16384;

/// How raw key bytes are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEncoding {
    /// Binary DER (PKCS#8 for private keys, SPKI for public keys).
    #[default]
    Der,
    /// PEM armored `PRIVATE KEY` / `PUBLIC KEY`.
    Pem,
    /// PEM if the bytes start with a `-----BEGIN` line, DER otherwise.
    Auto,
}

impl KeyEncoding {
    fn resolve(self, bytes: &[u8]) -> KeyEncoding {
        match self {
            KeyEncoding::Auto if bytes.trim_ascii_start().starts_with(PEM_PREFIX) => KeyEncoding::Pem,
            KeyEncoding::Auto => KeyEncoding::Der,
            other => other,
        }
    }
}

impl fmt::Display for KeyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEncoding::Der => f.write_str("der"),
            KeyEncoding::Pem => f.write_str("pem"),
            KeyEncoding::Auto => f.write_str("auto"),
        }
    }
}

impl FromStr for KeyEncoding {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "der" => Ok(KeyEncoding::Der),
            "pem" => Ok(KeyEncoding::Pem),
            "auto" => Ok(KeyEncoding::Auto),
            other => Err(KeyError::Config(format!("unknown key encoding '{other}'"))),
        }
    }
}

fn pem_text(kind: KeyKind, bytes: &[u8]) -> Result<&str, KeyError> {
    std::str::from_utf8(bytes).map_err(|e| KeyError::format(kind, format!("PEM is not UTF-8: {e}")))
}

fn big(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

fn checked_public(kind: KeyKind, n: BigUint, e: BigUint) -> Result<RsaPublicKey, KeyError> {
    RsaPublicKey::new_with_max_size(n, e, MAX_MODULUS_BITS).map_err(|e| KeyError::format(kind, e))
}

fn private_from_der(der: &[u8]) -> Result<RsaPrivateKey, KeyError> {
    let kind = KeyKind::Private;
    let info = PrivateKeyInfo::try_from(der).map_err(|e| KeyError::format(kind, e))?;
    info.algorithm.assert_algorithm_oid(pkcs1::ALGORITHM_OID).map_err(|e| KeyError::format(kind, e))?;
    let key = pkcs1::RsaPrivateKey::try_from(info.private_key).map_err(|e| KeyError::format(kind, e))?;
    if key.other_prime_infos.is_some() {
        return Err(KeyError::format(kind, "multi-prime RSA keys are not supported"));
    }
    let n = big(key.modulus.as_bytes());
    let e = big(key.public_exponent.as_bytes());
    checked_public(kind, n.clone(), e.clone())?;
    let primes = vec![big(key.prime1.as_bytes()), big(key.prime2.as_bytes())];
    RsaPrivateKey::from_components(n, e, big(key.private_exponent.as_bytes()), primes)
        .map_err(|e| KeyError::format(kind, e))
}

fn public_from_der(der: &[u8]) -> Result<RsaPublicKey, KeyError> {
    let kind = KeyKind::Public;
    let spki = SubjectPublicKeyInfoRef::try_from(der).map_err(|e| KeyError::format(kind, e))?;
    spki.algorithm.assert_algorithm_oid(pkcs1::ALGORITHM_OID).map_err(|e| KeyError::format(kind, e))?;
    let bits = spki
        .subject_public_key
        .as_bytes()
        .ok_or_else(|| KeyError::format(kind, "public key bit string is not byte aligned"))?;
    let key = pkcs1::RsaPublicKey::try_from(bits).map_err(|e| KeyError::format(kind, e))?;
    checked_public(kind, big(key.modulus.as_bytes()), big(key.public_exponent.as_bytes()))
}

fn pem_der(kind: KeyKind, bytes: &[u8], label: &str) -> Result<SecretDocument, KeyError> {
    let (found, doc) = SecretDocument::from_pem(pem_text(kind, bytes)?).map_err(|e| KeyError::format(kind, e))?;
    if found != label {
        return Err(KeyError::format(kind, format!("expected PEM label '{label}', found '{found}'")));
    }
    Ok(doc)
}

/// Decode an RSA private key from PKCS#8 bytes. Moduli up to [`MAX_MODULUS_BITS`] are accepted.
///
/// # Errors
/// Returns `KeyFormat` if the bytes are not a PKCS#8 RSA private key in the given encoding.
pub fn decode_private_key(bytes: &[u8], encoding: KeyEncoding) -> Result<RsaPrivateKey, KeyError> {
    match encoding.resolve(bytes) {
        KeyEncoding::Pem => private_from_der(pem_der(KeyKind::Private, bytes, "PRIVATE KEY")?.as_bytes()),
        _ => private_from_der(bytes),
    }
}

/// Decode an RSA public key from X.509 SubjectPublicKeyInfo bytes.
///
/// # Errors
/// Returns `KeyFormat` if the bytes are not an SPKI RSA public key in the given encoding.
pub fn decode_public_key(bytes: &[u8], encoding: KeyEncoding) -> Result<RsaPublicKey, KeyError> {
    match encoding.resolve(bytes) {
        KeyEncoding::Pem => public_from_der(pem_der(KeyKind::Public, bytes, "PUBLIC KEY")?.as_bytes()),
        _ => public_from_der(bytes),
    }
}

/// Lowercase hex SHA-256 of the key's SPKI DER encoding.
///
/// # Errors
/// Returns `KeyFormat` if the key cannot be re-encoded.
pub fn fingerprint(key: &RsaPublicKey) -> Result<String, KeyError> {
    let der = key.to_public_key_der().map_err(|e| KeyError::format(KeyKind::Public, e))?;
    Ok(hex::encode(Sha256::digest(der.as_bytes())))
}
