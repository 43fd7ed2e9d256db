//! Configuration file parser for ~/.config/feedstack/config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde, though we log a warning when
//! the file contains potential typos.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified. Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the SQLite document store.
    pub database: String,

    /// Words per chunk produced by the splitter.
    pub split_length: usize,

    /// Words of overlap between consecutive chunks.
    pub split_overlap: usize,

    /// Dimension of the embedding vectors.
    pub embedding_dimension: usize,

    /// Duplicate handling on store writes: "skip", "overwrite", or "fail".
    pub duplicate_policy: String,

    /// Fail a feed source when an entry lacks a title or description
    /// (mirrors the original converter); false substitutes empty strings.
    pub strict_entries: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: "feedstack.db".to_string(),
            split_length: 150,
            split_overlap: 50,
            embedding_dimension: 384,
            duplicate_policy: "skip".to_string(),
            strict_entries: true,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse as a raw table first to detect unknown keys (likely typos)
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "database",
                "split_length",
                "split_overlap",
                "embedding_dimension",
                "duplicate_policy",
                "strict_entries",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(path = %path.display(), database = %config.database, "Loaded configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if crate::store::DuplicatePolicy::parse(&self.duplicate_policy).is_none() {
            return Err(ConfigError::InvalidValue(format!(
                "duplicate_policy must be skip, overwrite, or fail (got {:?})",
                self.duplicate_policy
            )));
        }
        if self.split_length == 0 || self.split_overlap >= self.split_length {
            return Err(ConfigError::InvalidValue(format!(
                "split_overlap {} must be smaller than split_length {}",
                self.split_overlap, self.split_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database, "feedstack.db");
        assert_eq!(config.split_length, 150);
        assert_eq!(config.split_overlap, 50);
        assert_eq!(config.embedding_dimension, 384);
        assert_eq!(config.duplicate_policy, "skip");
        assert!(config.strict_entries);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/feedstack_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.split_length, 150);
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = std::env::temp_dir().join("feedstack_config_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.duplicate_policy, "skip");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let dir = std::env::temp_dir().join("feedstack_config_test_partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "split_length = 200\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.split_length, 200);
        assert_eq!(config.split_overlap, 50); // default

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = std::env::temp_dir().join("feedstack_config_test_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let dir = std::env::temp_dir().join("feedstack_config_test_policy");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "duplicate_policy = \"maybe\"\n").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_overlap_not_smaller_than_length_rejected() {
        let dir = std::env::temp_dir().join("feedstack_config_test_overlap");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "split_length = 10\nsplit_overlap = 10\n").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("feedstack_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::TooLarge(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
