//! Emitter configuration.
//!
//! Settings can be a standalone TOML document or an `[emitter]` table inside a
//! larger application file:
//!
//! ```toml
//! [emitter]
//! throw_uncaught_errors = false
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Return an error from `emit` when the error channel fires with no
    /// listeners.
    pub throw_uncaught_errors: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            throw_uncaught_errors: true,
        }
    }
}

impl EmitterConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut table: toml::Table = toml::from_str(content)?;
        let section = match table.remove("emitter") {
            Some(toml::Value::Table(section)) => section,
            Some(other) => {
                return Err(ConfigError::Parse(serde::de::Error::custom(format!(
                    "`emitter` must be a table, got {}",
                    other.type_str()
                ))))
            }
            None => table,
        };
        Ok(toml::Value::Table(section).try_into()?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "loaded emitter config");
        Ok(config)
    }
}
