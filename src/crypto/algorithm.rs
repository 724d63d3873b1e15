use crate::errors::KeyError;
use std::fmt;
use std::str::FromStr;

/// Signature schemes the backend provides.
///
/// Only RSASSA-PKCS1-v1_5 over SHA-256 is available; any other name resolves to
/// [`KeyError::AlgorithmUnavailable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    #[default]
    Sha256WithRsa,
}

impl SignatureAlgorithm {
    /// Resolve an algorithm by name, case-insensitively. `RS256` is accepted as an alias.
    ///
    /// # Errors
    /// Returns `AlgorithmUnavailable` for names the backend does not implement.
    pub fn from_name(name: &str) -> Result<Self, KeyError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sha256withrsa" | "rs256" => Ok(SignatureAlgorithm::Sha256WithRsa),
            _ => Err(KeyError::AlgorithmUnavailable(name.to_string())),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha256WithRsa => "SHA256withRSA",
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}
