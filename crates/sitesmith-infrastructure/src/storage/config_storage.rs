//! Storage for `config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use sitesmith_core::Result;
use sitesmith_core::config::GenerationConfig;

use crate::paths::SitesmithPaths;

/// Loads the generation settings from `config.toml`.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    pub fn new(paths: &SitesmithPaths) -> Result<Self> {
        Ok(Self {
            path: paths.config_file()?,
        })
    }

    /// Creates a ConfigStorage with a custom path (for testing).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads and validates the configuration.
    ///
    /// A missing file yields the defaults; every field is optional.
    pub fn load(&self) -> Result<GenerationConfig> {
        let config = if self.path.exists() {
            let content = fs::read_to_string(&self.path)?;
            toml::from_str::<GenerationConfig>(&content)?
        } else {
            debug!(path = %self.path.display(), "No config file; using defaults");
            GenerationConfig::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
