//! High-level generation API used by front ends.

use std::sync::Arc;

use sitesmith_core::artifact::{ArtifactSet, Locale, SourceFile};
use sitesmith_core::config::{Credential, GenerationConfig};
use sitesmith_core::conversation::ConversationTurn;
use sitesmith_core::{Result, SitesmithError};
use tracing::info;

use crate::fallback::FallbackOrchestrator;
use crate::gemini_api_agent::GeminiApiAgent;
use crate::invoker::ModelInvoker;
use crate::operation::{Request, Response};
use crate::tutor::TutorResponse;

pub struct GenerationService {
    orchestrator: FallbackOrchestrator,
    default_locale: Locale,
}

impl GenerationService {
    /// Validates `raw_key` and `config`, then connects to Gemini.
    ///
    /// Fails with a configuration error before any network call when the key is
    /// missing, blank, or a placeholder.
    pub fn connect(config: GenerationConfig, raw_key: Option<&str>) -> Result<Self> {
        let credential = Credential::parse(raw_key)?;
        Self::with_credential(config, credential)
    }

    pub fn with_credential(config: GenerationConfig, credential: Credential) -> Result<Self> {
        config.validate()?;
        let agent = GeminiApiAgent::from_config(credential, &config)?;
        info!(models = config.models.len(), "Connected to Gemini");
        Ok(Self::with_invoker(config, Arc::new(agent)))
    }

    pub fn with_invoker(config: GenerationConfig, invoker: Arc<dyn ModelInvoker>) -> Self {
        Self {
            orchestrator: FallbackOrchestrator::new(invoker, config.models, config.retry),
            default_locale: config.default_locale,
        }
    }

    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    pub async fn generate_site(&self, prompt: &str, locale: Option<Locale>) -> Result<ArtifactSet> {
        require_text(prompt, "prompt")?;
        let request = Request::Generate {
            prompt: prompt.to_string(),
            locale: locale.unwrap_or(self.default_locale),
        };
        self.run(request).await.and_then(expect_site)
    }

    /// Sends the complete current site plus `instruction`; returns the complete new site.
    pub async fn refine_site(
        &self,
        files: &[SourceFile],
        instruction: &str,
        locale: Option<Locale>,
    ) -> Result<ArtifactSet> {
        if files.is_empty() {
            return Err(SitesmithError::invalid_request("there is no site to refine"));
        }
        require_text(instruction, "instruction")?;
        let request = Request::Refine {
            files: files.to_vec(),
            instruction: instruction.to_string(),
            locale: locale.unwrap_or(self.default_locale),
        };
        self.run(request).await.and_then(expect_site)
    }

    /// Refines `current` when it has files, otherwise generates from scratch.
    pub async fn build_site(
        &self,
        prompt: &str,
        current: &[SourceFile],
        locale: Option<Locale>,
    ) -> Result<ArtifactSet> {
        if current.is_empty() {
            self.generate_site(prompt, locale).await
        } else {
            self.refine_site(current, prompt, locale).await
        }
    }

    pub async fn chat(&self, message: &str, history: &[ConversationTurn]) -> Result<String> {
        require_text(message, "message")?;
        let request = Request::Chat {
            message: message.to_string(),
            history: history.to_vec(),
        };
        match self.run(request).await? {
            Response::Text(reply) => Ok(reply),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn tutor(
        &self,
        message: &str,
        history: &[ConversationTurn],
        locale: Option<Locale>,
    ) -> Result<TutorResponse> {
        require_text(message, "message")?;
        let request = Request::Tutor {
            message: message.to_string(),
            history: history.to_vec(),
            locale: locale.unwrap_or(self.default_locale),
        };
        match self.run(request).await? {
            Response::Tutor(reply) => Ok(reply),
            other => Err(unexpected(&other)),
        }
    }

    async fn run(&self, request: Request) -> Result<Response> {
        self.orchestrator.run(&request).await
    }
}

fn require_text(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SitesmithError::invalid_request(format!("{what} must not be empty")));
    }
    Ok(())
}

fn expect_site(response: Response) -> Result<ArtifactSet> {
    match response {
        Response::Site(site) => Ok(site),
        other => Err(unexpected(&other)),
    }
}

fn unexpected(response: &Response) -> SitesmithError {
    SitesmithError::internal(format!("invoker returned an unexpected {} response", response.kind()))
}
