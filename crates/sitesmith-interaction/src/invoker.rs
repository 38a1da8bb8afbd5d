//! The seam between orchestration and a concrete model provider.

use async_trait::async_trait;
use sitesmith_core::{Result, SitesmithError};

use crate::operation::{Request, Response};

/// Sends one request to one named model.
///
/// Implementations map provider failures onto [`SitesmithError`] so that
/// [`classify`] can decide whether to retry, move on, or stop.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, model: &str, request: &Request) -> Result<Response>;
}

/// How the orchestrator reacts to a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Transient: retry the same model after a delay.
    Retryable,
    /// This model is not usable with the credential: try the next one.
    Permission,
    /// Retrying cannot help: stop immediately.
    Fatal,
}

pub fn classify(error: &SitesmithError) -> FailureClass {
    match error {
        SitesmithError::Availability { .. } => FailureClass::Retryable,
        SitesmithError::Permission { .. } => FailureClass::Permission,
        _ => FailureClass::Fatal,
    }
}

/// The result of a single attempt, already classified.
#[derive(Debug)]
pub enum InvocationOutcome {
    Success(Response),
    RetryableFailure(SitesmithError),
    PermissionFailure(SitesmithError),
    FatalFailure(SitesmithError),
}

impl From<Result<Response>> for InvocationOutcome {
    fn from(result: Result<Response>) -> Self {
        match result {
            Ok(response) => Self::Success(response),
            Err(error) => match classify(&error) {
                FailureClass::Retryable => Self::RetryableFailure(error),
                FailureClass::Permission => Self::PermissionFailure(error),
                FailureClass::Fatal => Self::FatalFailure(error),
            },
        }
    }
}
