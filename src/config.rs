//! Signer configuration from TOML files and `KEYSIGNER_*` environment variables.
//!
//! Lookup order for the file: explicit path, `KEYSIGNER_CONFIG`, `./keysigner.toml`,
//! then `<config dir>/keysigner/keysigner.toml`. The first file found is used; environment
//! variables then fill any field the file left unset.

use crate::crypto::{KeyEncoding, SignatureAlgorithm};
use crate::errors::KeyError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "keysigner.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignerConfig {
    pub algorithm: Option<String>,
    pub encoding: Option<KeyEncoding>,
    pub private_key: Option<PathBuf>,
    pub public_key: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    /// Rolled log files to keep per appender.
    pub log_retention: Option<usize>,
}

impl SignerConfig {
    /// # Errors
    /// Returns `Config` on invalid TOML or unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, KeyError> {
        toml::from_str(s).map_err(|e| KeyError::Config(e.to_string()))
    }

    /// # Errors
    /// Returns `Config` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, KeyError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| KeyError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&s).map_err(|e| KeyError::Config(format!("{}: {e}", path.display())))
    }

    /// Resolve configuration from the process environment.
    ///
    /// # Errors
    /// See [`SignerConfig::load_with`].
    pub fn load(explicit: Option<&Path>) -> Result<Self, KeyError> {
        Self::load_with(explicit, |k| std::env::var(k).ok())
    }

    /// Resolve configuration with an injectable environment lookup.
    ///
    /// # Errors
    /// Returns `Config` if an explicitly given file is missing, or if the selected file is invalid.
    pub fn load_with<F>(explicit: Option<&Path>, env: F) -> Result<Self, KeyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(p) = explicit {
            if !p.exists() {
                return Err(KeyError::Config(format!("config file not found: {}", p.display())));
            }
        }
        let mut cfg = match candidate_paths(explicit, &env).into_iter().find(|p| p.exists()) {
            Some(p) => {
                log::debug!("loading config from {}", p.display());
                Self::from_file(&p)?
            }
            None => Self::default(),
        };
        cfg.fill_from_env(&env)?;
        Ok(cfg)
    }

    /// Fill unset fields from `KEYSIGNER_*` variables.
    ///
    /// # Errors
    /// Returns `Config` if `KEYSIGNER_ENCODING` is not a known encoding or
    /// `KEYSIGNER_LOG_RETENTION` is not a non-negative integer.
    pub fn fill_from_env<F>(&mut self, env: F) -> Result<(), KeyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.algorithm.is_none() {
            self.algorithm = env("KEYSIGNER_ALGORITHM");
        }
        if self.encoding.is_none() {
            if let Some(s) = env("KEYSIGNER_ENCODING") {
                self.encoding = Some(s.parse()?);
            }
        }
        if self.private_key.is_none() {
            self.private_key = env("KEYSIGNER_PRIVATE_KEY").map(PathBuf::from);
        }
        if self.public_key.is_none() {
            self.public_key = env("KEYSIGNER_PUBLIC_KEY").map(PathBuf::from);
        }
        if self.log_dir.is_none() {
            self.log_dir = env("KEYSIGNER_LOG_DIR").map(PathBuf::from);
        }
        if self.log_level.is_none() {
            self.log_level = env("KEYSIGNER_LOG_LEVEL");
        }
        if self.log_retention.is_none() {
            if let Some(s) = env("KEYSIGNER_LOG_RETENTION") {
                let keep = s
                    .trim()
                    .parse()
                    .map_err(|e| KeyError::Config(format!("KEYSIGNER_LOG_RETENTION '{s}': {e}")))?;
                self.log_retention = Some(keep);
            }
        }
        Ok(())
    }

    /// # Errors
    /// Returns `AlgorithmUnavailable` if the configured name is not supported.
    pub fn algorithm(&self) -> Result<SignatureAlgorithm, KeyError> {
        match &self.algorithm {
            Some(name) => SignatureAlgorithm::from_name(name),
            None => Ok(SignatureAlgorithm::default()),
        }
    }

    #[must_use]
    pub fn encoding(&self) -> KeyEncoding {
        self.encoding.unwrap_or_default()
    }
}

fn candidate_paths<F>(explicit: Option<&Path>, env: &F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let mut paths = Vec::new();
    if let Some(p) = explicit {
        paths.push(p.to_path_buf());
    }
    if let Some(p) = env("KEYSIGNER_CONFIG") {
        paths.push(PathBuf::from(p));
    }
    if let Ok(cur) = std::env::current_dir() {
        paths.push(cur.join(CONFIG_FILE_NAME));
    }
    if let Some(dir) = dirs_next::config_dir() {
        paths.push(dir.join("keysigner").join(CONFIG_FILE_NAME));
    }
    paths
}
