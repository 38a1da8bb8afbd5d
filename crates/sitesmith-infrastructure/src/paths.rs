//! Path management for sitesmith configuration files.
//!
//! ```text
//! ~/.config/sitesmith/         # Config directory (platform config dir)
//! ├── config.toml              # Candidate models, retry policy, defaults
//! └── secret.json              # API keys
//! ```
//!
//! `SITESMITH_CONFIG_DIR` overrides the directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sitesmith_core::SitesmithError;
use sitesmith_core::config::{GeminiSecret, GenerationConfig, SecretConfig};

const APP_DIR: &str = "sitesmith";
const CONFIG_DIR_ENV: &str = "SITESMITH_CONFIG_DIR";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for SitesmithError {
    fn from(err: PathError) -> Self {
        SitesmithError::configuration(err.to_string())
    }
}

/// Resolves sitesmith's configuration files.
#[derive(Debug, Clone, Default)]
pub struct SitesmithPaths {
    base: Option<PathBuf>,
}

impl SitesmithPaths {
    /// Uses `base` as the config directory when given, else the platform default.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the sitesmith configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to `secret.json`.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600).
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    /// Writes a default `config.toml` if none exists and returns its path.
    pub fn ensure_config_file(&self) -> Result<PathBuf, SitesmithError> {
        let path = self.config_file()?;
        if path.exists() {
            return Ok(path);
        }
        create_parent(&path)?;

        let template = toml::to_string_pretty(&GenerationConfig::default()).map_err(|e| {
            SitesmithError::Serialization {
                format: "TOML".to_string(),
                message: e.to_string(),
            }
        })?;
        fs::write(&path, template)?;
        Ok(path)
    }

    /// Writes a `secret.json` template if none exists and returns its path.
    ///
    /// On Unix the file is restricted to mode 600.
    pub fn ensure_secret_file(&self) -> Result<PathBuf, SitesmithError> {
        let path = self.secret_file()?;
        if path.exists() {
            return Ok(path);
        }
        create_parent(&path)?;

        let template = SecretConfig {
            gemini: Some(GeminiSecret {
                api_key: String::new(),
                model_name: None,
            }),
        };
        fs::write(&path, serde_json::to_string_pretty(&template)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(path)
    }
}

fn create_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}
