//! Configuration loader
//!
//! Merges configuration sources with figment, later sources overriding
//! earlier ones:
//!
//! 1. `AppConfig::default()`
//! 2. A TOML file (`libris.toml` beside the process, under `./config/`, or
//!    in the user's config directory), or an explicit `--config` path
//! 3. Environment variables prefixed `LIBRIS__`, nested keys separated by
//!    double underscores (e.g. `LIBRIS__EMBEDDING__API_KEY`)

use std::env;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use tracing::info;

use libris_domain::error::{Error, Result};

use super::types::AppConfig;
use crate::constants::{CONFIG_ENV_PREFIX, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME};

/// Configuration loader service
#[derive(Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader that searches the default locations
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Pin the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load and validate the configuration
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        let file = self
            .config_path
            .clone()
            .or_else(Self::find_default_config_path);
        if let Some(path) = file {
            if path.exists() {
                info!(path = %path.display(), "loading configuration file");
                figment = figment.merge(Toml::file(&path));
            } else if self.config_path.is_some() {
                return Err(Error::config(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
        }

        figment = figment.merge(Env::prefixed(&format!("{}__", CONFIG_ENV_PREFIX)).split("__"));

        let config: AppConfig = figment
            .extract()
            .map_err(|e| Error::config(format!("failed to extract configuration: {}", e)))?;
        validate(&config)?;
        Ok(config)
    }

    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;
        let candidates = [
            current_dir.join(DEFAULT_CONFIG_FILENAME),
            current_dir.join("config").join(DEFAULT_CONFIG_FILENAME),
            dirs::config_dir()
                .map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME))
                .unwrap_or_default(),
        ];
        candidates.into_iter().find(|path| path.exists())
    }
}

/// Reject configurations that cannot produce a working system
fn validate(config: &AppConfig) -> Result<()> {
    if config.embedding.dimensions == 0 {
        return Err(Error::config("embedding.dimensions must be positive"));
    }
    if config.chunking.min_chars >= config.chunking.max_chars {
        return Err(Error::config(format!(
            "chunking.min_chars ({}) must be below chunking.max_chars ({})",
            config.chunking.min_chars, config.chunking.max_chars
        )));
    }
    let level = config.logging.level.to_lowercase();
    if !["trace", "debug", "info", "warn", "warning", "error"].contains(&level.as_str()) {
        return Err(Error::config(format!(
            "invalid logging.level '{}'",
            config.logging.level
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{ChunkingConfig, LoggingConfig};

    #[test]
    fn defaults_load_without_a_file() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.embedding.dimensions, 384);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let loader = ConfigLoader::new().with_config_path("/definitely/not/here.toml");
        assert!(loader.load().is_err());
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libris.toml");
        std::fs::write(&path, "[embedding]\ndimensions = 128\n").unwrap();
        let config = ConfigLoader::new().with_config_path(&path).load().unwrap();
        assert_eq!(config.embedding.dimensions, 128);
    }

    #[test]
    fn validation_rejects_inverted_chunk_bounds() {
        let mut config = AppConfig::default();
        config.chunking = ChunkingConfig {
            min_chars: 2000,
            max_chars: 1500,
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn validation_rejects_unknown_log_level() {
        let mut config = AppConfig::default();
        config.logging = LoggingConfig {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }
}
