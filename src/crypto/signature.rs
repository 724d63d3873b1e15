use crate::errors::KeyError;
use base64::{Engine, engine::general_purpose::STANDARD};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use sha2::Sha256;

/// RSASSA-PKCS1-v1_5 over SHA-256. Deterministic for a fixed key and message.
///
/// # Errors
/// Returns `Signing` if the backend rejects the operation (e.g. a modulus too small for the digest info).
pub fn sign_message(key: &SigningKey<Sha256>, message: &[u8]) -> Result<Vec<u8>, KeyError> {
    let sig: Signature = key.try_sign(message).map_err(|e| KeyError::Signing(e.to_string()))?;
    Ok(sig.to_vec())
}

/// Checks `signature` against `message`. Any mismatch, including a signature
/// whose length does not match the modulus, is `false`.
#[must_use]
pub fn verify_message(key: &VerifyingKey<Sha256>, message: &[u8], signature: &[u8]) -> bool {
    match Signature::try_from(signature) {
        Ok(sig) => key.verify(message, &sig).is_ok(),
        Err(_) => false,
    }
}

#[must_use]
pub fn encode_signature(signature: &[u8]) -> String {
    STANDARD.encode(signature)
}

/// Standard alphabet, padding required.
///
/// # Errors
/// Returns `Encoding` if the input is not valid Base64.
pub fn decode_signature(signature_b64: &str) -> Result<Vec<u8>, KeyError> {
    Ok(STANDARD.decode(signature_b64)?)
}
