//! Scribe configuration
//!
//! TOML-based configuration loading with sensible defaults. A minimal config
//! should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use scribe_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[writer]\npath = \"logs/app.log\"").unwrap();
//! assert_eq!(config.writer.buffer_size, 64 * 1024);
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [writer]
//! path = "logs/app_{date: %Y-%m-%d}.log"
//! charset = "UTF-8"
//! buffer_size = 65536
//! backups = 10
//! latest_link = "logs/latest.log"
//!
//! [[writer.policies]]
//! type = "size"
//! limit = 10485760
//!
//! [[writer.policies]]
//! type = "daily"
//! time = "03:00"
//! ```

mod error;
mod validation;
mod writer;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

pub use error::{ConfigError, Result};
pub use writer::{FileWriterConfig, PolicyConfig, DEFAULT_BUFFER_SIZE};

/// Top-level configuration for the Scribe logging framework
///
/// All sections are optional and fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rolling file writer configuration
    pub writer: FileWriterConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        text.parse()
    }

    /// Validate config consistency
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
