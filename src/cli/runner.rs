use super::command::{Command, MessageInput};
use crate::errors::{KeyError, KeyKind};
use crate::signer::KeySigner;
use std::io::Write;
use std::path::Path;

/// Result of a successfully executed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Valid,
    Invalid,
}

impl Outcome {
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Done | Outcome::Valid => 0,
            Outcome::Invalid => 1,
        }
    }
}

fn read_message(input: &MessageInput) -> Result<Vec<u8>, KeyError> {
    match input {
        MessageInput::Text(s) => Ok(s.as_bytes().to_vec()),
        MessageInput::File(p) => {
            std::fs::read(p).map_err(|e| KeyError::Io(format!("{}: {e}", p.display())))
        }
    }
}

fn ensure_key(signer: &KeySigner, kind: KeyKind, path: Option<&Path>) -> Result<(), KeyError> {
    match (kind, path) {
        (KeyKind::Private, Some(p)) => signer.load_private_key_from_path(p),
        (KeyKind::Public, Some(p)) => signer.load_public_key_from_path(p),
        (KeyKind::Private, None) if signer.has_private_key() => Ok(()),
        (KeyKind::Public, None) if signer.has_public_key() => Ok(()),
        (kind, None) => Err(KeyError::KeyNotLoaded(kind)),
    }
}

/// Execute a command against `signer`, writing its output line to `out`.
///
/// A key path on the command replaces whatever the signer already holds; without one the
/// signer's current key is used.
pub fn run(signer: &KeySigner, cmd: Command, out: &mut dyn Write) -> Result<Outcome, Box<dyn std::error::Error>> {
    match cmd {
        Command::Sign { key, message } => {
            ensure_key(signer, KeyKind::Private, key.as_deref())?;
            let bytes = read_message(&message)?;
            let sig = signer.sign_bytes(&bytes)?;
            writeln!(out, "{}", crate::crypto::encode_signature(&sig))?;
            Ok(Outcome::Done)
        }
        Command::Verify { key, message, signature } => {
            ensure_key(signer, KeyKind::Public, key.as_deref())?;
            let bytes = read_message(&message)?;
            let sig = crate::crypto::decode_signature(signature.trim())?;
            if signer.verify_bytes(&bytes, &sig)? {
                writeln!(out, "valid")?;
                Ok(Outcome::Valid)
            } else {
                writeln!(out, "invalid")?;
                Ok(Outcome::Invalid)
            }
        }
        Command::Fingerprint { key } => {
            ensure_key(signer, KeyKind::Public, key.as_deref())?;
            let fp = signer.public_key_fingerprint().ok_or(KeyError::KeyNotLoaded(KeyKind::Public))?;
            writeln!(out, "{fp}")?;
            Ok(Outcome::Done)
        }
    }
}
