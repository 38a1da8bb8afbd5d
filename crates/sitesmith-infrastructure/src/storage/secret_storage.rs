//! Secret configuration file storage.
//!
//! Loads `secret.json` from the sitesmith config directory.

use std::fs;
use std::path::{Path, PathBuf};

use sitesmith_core::Result;
use sitesmith_core::config::SecretConfig;

use crate::paths::SitesmithPaths;

/// Read-only access to `secret.json`.
///
/// Does NOT:
/// - Write or modify secret files
/// - Validate API keys (see `Credential::parse`)
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates storage for the secret file resolved by `paths`.
    pub fn new(paths: &SitesmithPaths) -> Result<Self> {
        Ok(Self {
            path: paths.secret_file()?,
        })
    }

    /// Creates a SecretStorage with a custom path (for testing).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads and parses the file.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load(&self) -> Result<Option<SecretConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
