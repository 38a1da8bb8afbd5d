//! Error types for Sitesmith.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a fallback run ended without any candidate model succeeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionCause {
    /// Every candidate rejected the credential's access to the model.
    PermissionDenied,
    /// At least one candidate was rate limited, overloaded, or unreachable.
    Unavailable,
}

/// Coarse grouping used by callers to phrase a terminal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Permission,
    Availability,
    MalformedResponse,
    InvalidRequest,
    Internal,
}

/// A shared error type for the whole generation pipeline.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum SitesmithError {
    /// Credential missing, placeholder, or rejected; invalid configuration values.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The credential is valid but may not use this model.
    #[error("Permission denied for model '{model}': {message}")]
    Permission { model: String, message: String },

    /// Rate limit, overload, outage, timeout, or an ambiguous transport failure.
    #[error("Model '{model}' unavailable{}: {message}", status_suffix(.status_code))]
    Availability {
        model: String,
        status_code: Option<u16>,
        message: String,
    },

    /// The model answered, but not in the expected shape.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// The caller's request cannot be sent (blank prompt, nothing to refine).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Every candidate model failed.
    #[error("All candidate models failed after {attempts} attempt(s): {last_error}")]
    Exhausted {
        cause: ExhaustionCause,
        attempts: usize,
        last_error: Box<SitesmithError>,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn status_suffix(status_code: &Option<u16>) -> String {
    status_code
        .map(|code| format!(" (HTTP {code})"))
        .unwrap_or_default()
}

impl SitesmithError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn permission(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Permission {
            model: model.into(),
            message: message.into(),
        }
    }

    pub fn availability(
        model: impl Into<String>,
        status_code: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::Availability {
            model: model.into(),
            status_code,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_permission(&self) -> bool {
        matches!(self, Self::Permission { .. })
    }

    pub fn is_availability(&self) -> bool {
        matches!(self, Self::Availability { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Returns the category a caller should phrase this error under.
    ///
    /// `Exhausted` reports the category of its cause, so permission exhaustion
    /// and availability exhaustion stay distinguishable.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Permission { .. } => ErrorCategory::Permission,
            Self::Availability { .. } => ErrorCategory::Availability,
            Self::MalformedResponse(_) => ErrorCategory::MalformedResponse,
            Self::InvalidRequest(_) => ErrorCategory::InvalidRequest,
            Self::Exhausted { cause, .. } => match cause {
                ExhaustionCause::PermissionDenied => ErrorCategory::Permission,
                ExhaustionCause::Unavailable => ErrorCategory::Availability,
            },
            Self::Io { .. } | Self::Serialization { .. } | Self::Internal(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// Short, user-actionable advice for this error.
    pub fn remediation_hint(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Set a valid Gemini API key in secret.json or the GEMINI_API_KEY environment variable."
            }
            ErrorCategory::Permission => {
                "Check that your API key has access to the configured models and that billing/entitlements are enabled."
            }
            ErrorCategory::Availability => {
                "The model service is busy or unreachable. Wait a moment and try again."
            }
            ErrorCategory::MalformedResponse => {
                "The model returned an unexpected answer. Try rephrasing the request."
            }
            ErrorCategory::InvalidRequest => "Provide a non-empty prompt and an existing site to refine.",
            ErrorCategory::Internal => "An unexpected error occurred. Check the logs for details.",
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SitesmithError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for SitesmithError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SitesmithError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, SitesmithError>`.
pub type Result<T> = std::result::Result<T, SitesmithError>;
