//! Project configuration (`cxxrefl.toml`)
//!
//! ```toml
//! [output]
//! dir = "generated"
//! extension = "refl.hpp"
//! include-source = true
//! ```
//!
//! Every key is optional. The nearest `cxxrefl.toml` in the source file's
//! directory or one of its ancestors applies.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file searched for by [`Config::discover`].
pub const CONFIG_FILE_NAME: &str = "cxxrefl.toml";

/// Errors that can occur loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where and how generated descriptors are written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Output directory, relative to the source file's directory
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Output file extension; the artifact is `<stem>.<extension>`
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Emit an `#include` of the source file at the top of the artifact
    #[serde(default = "default_include_source")]
    pub include_source: bool,
}

fn default_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_extension() -> String {
    "refl.hpp".to_string()
}

fn default_include_source() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            extension: default_extension(),
            include_source: default_include_source(),
        }
    }
}

impl Config {
    /// Load a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a configuration from TOML text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let extension = &self.output.extension;
        if extension.is_empty() {
            return Err(ConfigError::Invalid(
                "output.extension cannot be empty".to_string(),
            ));
        }
        if extension.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "output.extension '{}' cannot contain a path separator",
                extension
            )));
        }
        Ok(())
    }

    /// Find the nearest configuration file at or above `start`.
    pub fn find_file(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load the nearest configuration file at or above `start`, or the
    /// defaults when there is none.
    pub fn discover(start: &Path) -> Result<Self, ConfigError> {
        match Self::find_file(start) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using configuration file");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_empty() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.output.dir, PathBuf::from("generated"));
        assert_eq!(config.output.extension, "refl.hpp");
        assert!(config.output.include_source);
    }

    #[test]
    fn test_parse_output_section() {
        let config = Config::from_str(
            r#"
            [output]
            dir = "meta"
            extension = "gen.h"
            include-source = false
            "#,
        )
        .unwrap();
        assert_eq!(config.output.dir, PathBuf::from("meta"));
        assert_eq!(config.output.extension, "gen.h");
        assert!(!config.output.include_source);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = Config::from_str("[output]\nsuffix = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_extension_rejected() {
        let err = Config::from_str("[output]\nextension = \"\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Config::from_str("[output]\nextension = \"a/b\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_discover_searches_ancestors() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("src").join("game");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "[output]\ndir = \"reflection\"\n",
        )
        .unwrap();

        let config = Config::discover(&nested).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("reflection"));
        assert_eq!(
            Config::find_file(&nested),
            Some(temp.path().join(CONFIG_FILE_NAME))
        );
    }
}
