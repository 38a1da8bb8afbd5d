//! Fallback orchestration across an ordered list of candidate models.
//!
//! Each model is tried up to `max_attempts_per_model` times while it reports
//! transient unavailability, with a backoff delay between attempts. Permission
//! failures move straight to the next model. Any other failure stops the run.

use std::sync::Arc;

use sitesmith_core::config::{ModelCandidates, RetryPolicy};
use sitesmith_core::error::ExhaustionCause;
use sitesmith_core::{Result, SitesmithError};
use tracing::{debug, info, warn};

use crate::invoker::{InvocationOutcome, ModelInvoker};
use crate::operation::{Request, Response};

enum AttemptState {
    Trying { model_index: usize, attempt: u32 },
    Succeeded(Response),
    Aborted(SitesmithError),
    Exhausted,
}

/// What the run has seen so far, used to build the exhaustion error.
#[derive(Default)]
struct Tally {
    attempts: usize,
    permission_denied_models: usize,
    last_error: Option<SitesmithError>,
}

#[derive(Clone)]
pub struct FallbackOrchestrator {
    invoker: Arc<dyn ModelInvoker>,
    models: ModelCandidates,
    policy: RetryPolicy,
}

impl FallbackOrchestrator {
    pub fn new(invoker: Arc<dyn ModelInvoker>, models: ModelCandidates, policy: RetryPolicy) -> Self {
        Self {
            invoker,
            models,
            policy,
        }
    }

    pub fn models(&self) -> &ModelCandidates {
        &self.models
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `request` against the candidates in order until one succeeds.
    ///
    /// Returns the first success, the first fatal error unchanged, or
    /// [`SitesmithError::Exhausted`] once every candidate has been tried.
    pub async fn run(&self, request: &Request) -> Result<Response> {
        let operation = request.operation();
        let mut tally = Tally::default();
        let mut state = AttemptState::Trying {
            model_index: 0,
            attempt: 1,
        };

        loop {
            state = match state {
                AttemptState::Trying {
                    model_index,
                    attempt,
                } => self.step(request, model_index, attempt, &mut tally).await,
                AttemptState::Succeeded(response) => return Ok(response),
                AttemptState::Aborted(error) => {
                    warn!(%operation, attempts = tally.attempts, error = %error, "Generation failed");
                    return Err(error);
                }
                AttemptState::Exhausted => {
                    let error = self.exhausted(tally);
                    warn!(%operation, error = %error, "All candidate models failed");
                    return Err(error);
                }
            };
        }
    }

    async fn step(
        &self,
        request: &Request,
        model_index: usize,
        attempt: u32,
        tally: &mut Tally,
    ) -> AttemptState {
        let Some(model) = self.models.as_slice().get(model_index) else {
            return AttemptState::Exhausted;
        };
        let operation = request.operation();
        let next_model = AttemptState::Trying {
            model_index: model_index + 1,
            attempt: 1,
        };

        tally.attempts += 1;
        debug!(%operation, model = %model, attempt, "Invoking model");

        match InvocationOutcome::from(self.invoker.invoke(model, request).await) {
            InvocationOutcome::Success(response) => {
                info!(%operation, model = %model, attempt, "Model succeeded");
                AttemptState::Succeeded(response)
            }
            InvocationOutcome::FatalFailure(error) => AttemptState::Aborted(error),
            InvocationOutcome::PermissionFailure(error) => {
                warn!(%operation, model = %model, error = %error, "Model not available to this key; trying next model");
                tally.permission_denied_models += 1;
                tally.last_error = Some(error);
                next_model
            }
            InvocationOutcome::RetryableFailure(error) => {
                tally.last_error = Some(error);
                if attempt >= self.policy.max_attempts_per_model {
                    warn!(%operation, model = %model, attempt, "Model still unavailable; trying next model");
                    return next_model;
                }

                let delay = self.policy.delay_for(attempt);
                warn!(
                    %operation,
                    model = %model,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Model unavailable; retrying"
                );
                tokio::time::sleep(delay).await;
                AttemptState::Trying {
                    model_index,
                    attempt: attempt + 1,
                }
            }
        }
    }

    fn exhausted(&self, tally: Tally) -> SitesmithError {
        // Permission only when no candidate was merely unavailable; `last_error` keeps the detail.
        let cause = if tally.permission_denied_models == self.models.len() {
            ExhaustionCause::PermissionDenied
        } else {
            ExhaustionCause::Unavailable
        };
        let last_error = tally
            .last_error
            .unwrap_or_else(|| SitesmithError::internal("no candidate model was tried"));

        SitesmithError::Exhausted {
            cause,
            attempts: tally.attempts,
            last_error: Box::new(last_error),
        }
    }
}
