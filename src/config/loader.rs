//! Configuration loading from disk.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::DemoConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Why a configuration could not be produced.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Every semantic problem found, in field order.
    Validation(Vec<ValidationError>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid TOML in {}: {}", path.display(), source)
            }
            ConfigError::Validation(errors) => {
                let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
                write!(f, "invalid config: {}", joined.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Read, parse and validate a TOML config file. Missing sections and
/// fields take their defaults.
pub fn load_config(path: &Path) -> Result<DemoConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: DemoConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&config).map_err(ConfigError::Validation)?;
    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Load from `path` when given, otherwise validate and return the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<DemoConfig, ConfigError> {
    let Some(path) = path else {
        let config = DemoConfig::default();
        validate_config(&config).map_err(ConfigError::Validation)?;
        return Ok(config);
    };
    load_config(path)
}
