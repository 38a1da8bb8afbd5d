pub mod bundle;
pub mod conversation;
pub mod init;
pub mod site;

mod files;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use sitesmith_core::config::{GenerationConfig, ModelCandidates};
use sitesmith_core::secret::SecretService;
use sitesmith_infrastructure::storage::ConfigStorage;
use sitesmith_infrastructure::{ConfigService, SecretServiceImpl, SitesmithPaths};
use sitesmith_interaction::GenerationService;

/// Settings shared by every command.
pub struct Context {
    paths: SitesmithPaths,
    preferred_models: Vec<String>,
}

impl Context {
    pub fn new(config_dir: Option<PathBuf>, preferred_models: Vec<String>) -> Self {
        Self {
            paths: SitesmithPaths::new(config_dir.as_deref()),
            preferred_models,
        }
    }

    pub fn paths(&self) -> &SitesmithPaths {
        &self.paths
    }

    /// Loads configuration and the API key, then connects to Gemini.
    ///
    /// `--model` flags, when given, replace the configured candidates.
    pub async fn service(&self) -> Result<GenerationService> {
        let secrets = Arc::new(SecretServiceImpl::new(&self.paths)?);
        let storage = ConfigStorage::new(&self.paths)?;
        let mut config = ConfigService::new(storage, secrets.clone()).load().await?;

        override_models(&mut config, &self.preferred_models)?;

        let credential = secrets.resolve_credential().await?;
        Ok(GenerationService::with_credential(config, credential)?)
    }
}

fn override_models(config: &mut GenerationConfig, models: &[String]) -> Result<()> {
    if !models.is_empty() {
        config.models = ModelCandidates::new(models.iter().cloned())?;
    }
    Ok(())
}
