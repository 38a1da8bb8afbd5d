//! Configuration model for generation: candidate models, retry policy, and secrets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::artifact::Locale;
use crate::error::{Result, SitesmithError};

/// Gemini REST endpoint for model operations.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Candidate models in descending preference: most capable first, most available last.
pub const DEFAULT_MODELS: [&str; 4] = [
    "gemini-3-flash-preview",
    "gemini-2.0-flash-exp",
    "gemini-2.0-flash",
    "gemini-flash-lite-latest",
];

/// Ordered, non-empty, immutable list of model identifiers to try.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ModelCandidates(Arc<[String]>);

impl ModelCandidates {
    /// Builds a candidate list, rejecting empty lists and blank identifiers.
    pub fn new<I, S>(models: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let models: Vec<String> = models
            .into_iter()
            .map(|model| model.into().trim().to_string())
            .collect();

        if models.is_empty() {
            return Err(SitesmithError::configuration(
                "at least one candidate model must be configured",
            ));
        }
        if models.iter().any(|model| model.is_empty()) {
            return Err(SitesmithError::configuration(
                "candidate model identifiers must not be blank",
            ));
        }

        Ok(Self(models.into()))
    }

    /// Returns a new list with `model` moved to the front.
    pub fn with_preferred(&self, model: &str) -> Self {
        let model = model.trim();
        if model.is_empty() {
            return self.clone();
        }

        let mut models = vec![model.to_string()];
        models.extend(self.0.iter().filter(|m| m.as_str() != model).cloned());
        Self(models.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for ModelCandidates {
    fn default() -> Self {
        Self(DEFAULT_MODELS.iter().map(|m| m.to_string()).collect())
    }
}

impl TryFrom<Vec<String>> for ModelCandidates {
    type Error = SitesmithError;

    fn try_from(models: Vec<String>) -> Result<Self> {
        Self::new(models)
    }
}

impl From<ModelCandidates> for Vec<String> {
    fn from(candidates: ModelCandidates) -> Self {
        candidates.0.to_vec()
    }
}

/// How the delay between attempts on the same model grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    Fixed,
    #[default]
    Linear,
    Exponential,
}

/// Retry policy applied to each candidate model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts_per_model: u32,
    pub base_delay_ms: u64,
    pub backoff: BackoffStrategy,
    pub max_delay_ms: u64,
    /// Upper bound on a single request, including reading the response.
    pub attempt_timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts_per_model: 2,
            base_delay_ms: 2_000,
            backoff: BackoffStrategy::Linear,
            max_delay_ms: 10_000,
            attempt_timeout_ms: 60_000,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the failed attempt number `attempt` (1-based).
    ///
    /// Non-decreasing in `attempt` and capped at `max_delay_ms`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let millis = match self.backoff {
            BackoffStrategy::Fixed => self.base_delay_ms,
            BackoffStrategy::Linear => self.base_delay_ms.saturating_mul(u64::from(attempt)),
            BackoffStrategy::Exponential => {
                let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
                self.base_delay_ms.saturating_mul(factor)
            }
        };
        Duration::from_millis(millis.min(self.max_delay_ms))
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts_per_model == 0 {
            return Err(SitesmithError::configuration(
                "retry.max_attempts_per_model must be at least 1",
            ));
        }
        if self.attempt_timeout_ms == 0 {
            return Err(SitesmithError::configuration(
                "retry.attempt_timeout_ms must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Settings for the generation pipeline, loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub models: ModelCandidates,
    pub default_locale: Locale,
    pub base_url: String,
    pub retry: RetryPolicy,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            models: ModelCandidates::default(),
            default_locale: Locale::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<()> {
        self.retry.validate()?;
        if self.base_url.trim().is_empty() {
            return Err(SitesmithError::configuration("base_url must not be empty"));
        }
        Ok(())
    }
}

/// Root structure of `secret.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiSecret>,
}

/// Gemini API credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiSecret {
    pub api_key: String,
    /// Preferred model, tried before the configured candidates.
    #[serde(default)]
    pub model_name: Option<String>,
}

impl fmt::Debug for GeminiSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSecret")
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .finish()
    }
}

/// A validated API key. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Validates a raw key supplied by the environment.
    ///
    /// Missing, blank, and obvious placeholder values are configuration errors.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let value = raw.map(str::trim).unwrap_or_default();
        if value.is_empty() {
            return Err(SitesmithError::configuration("no Gemini API key is configured"));
        }
        if is_placeholder(value) {
            return Err(SitesmithError::configuration(
                "the configured Gemini API key is a placeholder value",
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

fn is_placeholder(value: &str) -> bool {
    const PLACEHOLDERS: [&str; 10] = [
        "undefined",
        "null",
        "none",
        "placeholder",
        "changeme",
        "api_key",
        "api-key",
        "apikey",
        "gemini_api_key",
        "todo",
    ];

    let lower = value.to_ascii_lowercase();
    PLACEHOLDERS.contains(&lower.as_str())
        || (lower.contains("your") && lower.contains("key"))
        || lower.contains("placeholder")
        || (value.starts_with('<') && value.ends_with('>'))
        || value.starts_with("${")
        || value.chars().all(|c| matches!(c, 'x' | 'X' | '*' | '.'))
}
