//! Configuration for wikislice

mod extract;
mod logging;

pub use extract::ExtractConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration, loaded from `wikislice.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Extraction settings
    #[serde(default)]
    pub extract: ExtractConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.extract.read_chunk_bytes == 0 {
            errors.push("read_chunk_bytes must be positive".to_string());
        }
        if self.extract.index_file.as_os_str().is_empty() {
            errors.push("index_file must not be empty".to_string());
        }
        if self.extract.archive_file.as_os_str().is_empty() {
            errors.push("archive_file must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config_passes_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn default_extract_config_values() {
        let cfg = ExtractConfig::default();
        assert_eq!(cfg.index_file, PathBuf::from("dump.index"));
        assert_eq!(
            cfg.archive_file,
            PathBuf::from("pages-articles-multistream.xml.bz2")
        );
        assert_eq!(cfg.workers, 0);
        assert_eq!(cfg.read_chunk_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn validate_rejects_zero_chunk_size() {
        let mut cfg = Config::default();
        cfg.extract.read_chunk_bytes = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("read_chunk_bytes must be positive"));
    }

    #[test]
    fn validate_collects_multiple_errors() {
        let mut cfg = Config::default();
        cfg.extract.read_chunk_bytes = 0;
        cfg.extract.index_file = PathBuf::new();
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("read_chunk_bytes must be positive"));
        assert!(msg.contains("index_file must not be empty"));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str("[extract]\nworkers = 4\n").unwrap();
        assert_eq!(config.extract.workers, 4);
        assert_eq!(config.extract.read_chunk_bytes, 16 * 1024 * 1024);
        assert_eq!(config.logging.level, LogLevel::Info);
    }
}
