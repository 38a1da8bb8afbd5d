//! Configuration service implementation.
//!
//! Combines `config.toml` with the preferred model named in `secret.json`.

use std::sync::Arc;
use tracing::debug;

use sitesmith_core::Result;
use sitesmith_core::config::GenerationConfig;
use sitesmith_core::secret::SecretService;

use crate::storage::ConfigStorage;

/// Loads the effective generation configuration.
pub struct ConfigService {
    storage: ConfigStorage,
    secrets: Arc<dyn SecretService>,
}

impl ConfigService {
    pub fn new(storage: ConfigStorage, secrets: Arc<dyn SecretService>) -> Self {
        Self { storage, secrets }
    }

    /// Loads `config.toml` and moves the secret file's `model_name`, if any,
    /// to the front of the candidate list.
    pub async fn load(&self) -> Result<GenerationConfig> {
        let mut config = self.storage.load()?;

        let preferred = self
            .secrets
            .load_secrets()
            .await?
            .gemini
            .and_then(|gemini| gemini.model_name);
        if let Some(model) = preferred {
            debug!(model = %model, "Preferring model from secret.json");
            config.models = config.models.with_preferred(&model);
        }

        Ok(config)
    }
}
