//! Secret service implementation.
//!
//! Resolves the Gemini API key from `secret.json`, then from the
//! `GEMINI_API_KEY` and `API_KEY` environment variables.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use sitesmith_core::config::{Credential, SecretConfig};
use sitesmith_core::secret::SecretService;
use sitesmith_core::{Result, SitesmithError};

use crate::paths::SitesmithPaths;
use crate::storage::SecretStorage;

/// Environment variables consulted after `secret.json`, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Loads secrets from disk and the process environment.
#[derive(Clone)]
pub struct SecretServiceImpl {
    secret_path: PathBuf,
    env: EnvLookup,
}

impl SecretServiceImpl {
    pub fn new(paths: &SitesmithPaths) -> Result<Self> {
        Ok(Self::with_path(paths.secret_file()?))
    }

    /// Creates a service reading a specific secret file (for testing).
    pub fn with_path(secret_path: impl Into<PathBuf>) -> Self {
        Self {
            secret_path: secret_path.into(),
            env: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    /// Replaces the environment lookup (for testing).
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }
}

#[async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        Ok(SecretStorage::with_path(&self.secret_path)
            .load()?
            .unwrap_or_default())
    }

    async fn resolve_credential(&self) -> Result<Credential> {
        let from_file = self
            .load_secrets()
            .await?
            .gemini
            .map(|gemini| ("secret.json", gemini.api_key));
        let from_env = API_KEY_ENV_VARS
            .iter()
            .filter_map(|&name| (self.env)(name).map(|value| (name, value)));

        let mut first_error = None;
        for (source, raw) in from_file.into_iter().chain(from_env) {
            if raw.trim().is_empty() {
                continue;
            }
            match Credential::parse(Some(&raw)) {
                Ok(credential) => {
                    debug!(source, "Resolved Gemini API key");
                    return Ok(credential);
                }
                Err(err) => {
                    debug!(source, "Ignoring unusable Gemini API key");
                    first_error.get_or_insert(err);
                }
            }
        }

        Err(first_error.unwrap_or_else(|| {
            SitesmithError::configuration(format!(
                "no Gemini API key found in {} or the {} environment variables",
                self.secret_path.display(),
                API_KEY_ENV_VARS.join("/")
            ))
        }))
    }
}
