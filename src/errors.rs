use std::fmt;
use thiserror::Error;

/// Which of the two key slots an operation concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Private,
    Public,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Private => f.write_str("private"),
            KeyKind::Public => f.write_str("public"),
        }
    }
}

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid {kind} key: {reason}")]
    KeyFormat { kind: KeyKind, reason: String },

    #[error("Algorithm unavailable: {0}")]
    AlgorithmUnavailable(String),

    #[error("No {0} key loaded")]
    KeyNotLoaded(KeyKind),

    #[error("Invalid Base64 signature: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<std::io::Error> for KeyError {
    fn from(e: std::io::Error) -> Self {
        KeyError::Io(e.to_string())
    }
}

impl KeyError {
    pub(crate) fn format(kind: KeyKind, reason: impl fmt::Display) -> Self {
        KeyError::KeyFormat { kind, reason: reason.to_string() }
    }
}
