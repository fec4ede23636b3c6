//! Bridge Configuration
//!
//! Which bridge flavor is in use and which optional host libraries are
//! available. The stock rule sets read this once, when they are populated.
//!
//! ## Sources
//!
//! - TOML, via [`BridgeConfig::from_toml_str`] / [`BridgeConfig::from_file`]
//! - Environment: `JBRIDGE_MODE` (`jpype` | `jep`),
//!   `JBRIDGE_NUMERIC_ARRAYS` and `JBRIDGE_TABLES` (booleans)
//! - Code, via [`set`]
//!
//! ```toml
//! mode = "jep"
//! numeric_arrays = false
//! tables = true
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use parking_lot::{const_rwlock, RwLock};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable selecting the mode
pub const ENV_MODE: &str = "JBRIDGE_MODE";
/// Environment variable toggling numeric array support
pub const ENV_NUMERIC_ARRAYS: &str = "JBRIDGE_NUMERIC_ARRAYS";
/// Environment variable toggling table support
pub const ENV_TABLES: &str = "JBRIDGE_TABLES";

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {message}")]
    Io {
        /// File that was read
        path: String,
        /// Underlying I/O error
        message: String,
    },

    /// TOML did not parse or did not match the schema
    #[error("invalid config: {message}")]
    Parse {
        /// Parser message
        message: String,
    },

    /// Config could not be rendered as TOML
    #[error("cannot serialize config: {message}")]
    Serialize {
        /// Serializer message
        message: String,
    },

    /// A setting had an unrecognized value
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Setting or variable name
        key: String,
        /// Offending value
        value: String,
    },
}

/// Bridge flavor.
///
/// In `Jpype` mode raw primitives can reach the host boundary unboxed, so
/// the raw-primitive and primitive-array rules are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Jpype,
    Jep,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpype" => Ok(Mode::Jpype),
            "jep" => Ok(Mode::Jep),
            _ => Err(ConfigError::InvalidValue {
                key: ENV_MODE.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Bridge settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Bridge flavor
    pub mode: Mode,
    /// A numeric array library is available on the host
    pub numeric_arrays: bool,
    /// A dataframe library is available on the host
    pub tables: bool,
}

impl BridgeConfig {
    /// The built-in defaults: JPype mode, all optional libraries present
    pub const DEFAULT: BridgeConfig = BridgeConfig {
        mode: Mode::Jpype,
        numeric_arrays: true,
        tables: true,
    };

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Read and parse a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::DEFAULT.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(mode) = lookup(ENV_MODE) {
            self.mode = mode.parse()?;
        }
        if let Some(value) = lookup(ENV_NUMERIC_ARRAYS) {
            self.numeric_arrays = parse_flag(ENV_NUMERIC_ARRAYS, &value)?;
        }
        if let Some(value) = lookup(ENV_TABLES) {
            self.tables = parse_flag(ENV_TABLES, &value)?;
        }
        Ok(self)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

// ============================================================================
// Process-wide Configuration
// ============================================================================

static CURRENT: RwLock<Option<BridgeConfig>> = const_rwlock(None);

/// Replace the process-wide configuration.
///
/// Takes effect for registries populated afterwards; stock rules already
/// registered are not revisited.
pub fn set(config: BridgeConfig) {
    debug!(?config, "bridge configuration set");
    *CURRENT.write() = Some(config);
}

/// The process-wide configuration.
///
/// Loaded from the environment on first use; an invalid environment falls
/// back to the defaults.
pub fn current() -> BridgeConfig {
    if let Some(config) = *CURRENT.read() {
        return config;
    }
    let mut slot = CURRENT.write();
    *slot.get_or_insert_with(|| match BridgeConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "ignoring invalid bridge environment");
            BridgeConfig::DEFAULT
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_toml_round_trip() {
        let config = BridgeConfig::from_toml_str("mode = \"jep\"\nnumeric_arrays = false\n").unwrap();
        assert_eq!(
            config,
            BridgeConfig {
                mode: Mode::Jep,
                numeric_arrays: false,
                tables: true,
            }
        );
        let rendered = config.to_toml_string().unwrap();
        assert_eq!(BridgeConfig::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(BridgeConfig::from_toml_str("").unwrap(), BridgeConfig::default());
    }

    #[test]
    fn test_bad_toml() {
        let err = BridgeConfig::from_toml_str("mode = \"graal\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let config = BridgeConfig::DEFAULT
            .with_overrides(|key| match key {
                ENV_MODE => Some("JEP".to_string()),
                ENV_TABLES => Some("0".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.mode, Mode::Jep);
        assert!(!config.tables);
        assert!(config.numeric_arrays);

        let err = BridgeConfig::DEFAULT
            .with_overrides(|key| (key == ENV_NUMERIC_ARRAYS).then(|| "maybe".to_string()))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_NUMERIC_ARRAYS.to_string(),
                value: "maybe".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_file() {
        let err = BridgeConfig::from_file("/nonexistent/jbridge.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
