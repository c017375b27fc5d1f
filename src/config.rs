//! Editor configuration, loadable from TOML.
//!
//! ```toml
//! row-cache-limit = 32
//! bssid-policy = "unrestricted"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::BssidPolicy;

const DEFAULT_ROW_CACHE_LIMIT: usize = 16;

/// Errors loading an [`EditorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Tunables for a [`RuleEditor`](crate::RuleEditor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EditorConfig {
    /// Maximum number of released rows kept for reuse.
    pub row_cache_limit: usize,
    /// Which operators BSSID conditions offer.
    pub bssid_policy: BssidPolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            row_cache_limit: DEFAULT_ROW_CACHE_LIMIT,
            bssid_policy: BssidPolicy::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on malformed input or unknown keys.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on I/O or parse failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }
}
