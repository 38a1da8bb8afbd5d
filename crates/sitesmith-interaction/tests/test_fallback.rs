mod common;

use std::time::Duration;

use common::{ScriptedInvoker, SITE_JSON, config, denied, rate_limited, reply};
use sitesmith_core::SitesmithError;
use sitesmith_core::artifact::Locale;
use sitesmith_core::config::{BackoffStrategy, RetryPolicy};
use sitesmith_core::error::ExhaustionCause;
use sitesmith_interaction::{FallbackOrchestrator, Request, Response};
use tokio::time::Instant;

fn generate() -> Request {
    Request::Generate {
        prompt: "a bakery landing page".into(),
        locale: Locale::En,
    }
}

fn assert_elapsed(started: Instant, expected_ms: u64) {
    let elapsed = started.elapsed();
    assert!(
        elapsed >= Duration::from_millis(expected_ms)
            && elapsed < Duration::from_millis(expected_ms + 100),
        "expected ~{expected_ms}ms of backoff, got {elapsed:?}"
    );
}

fn orchestrator(invoker: std::sync::Arc<ScriptedInvoker>, models: &[&str]) -> FallbackOrchestrator {
    let config = config(models);
    FallbackOrchestrator::new(invoker, config.models, config.retry)
}

#[tokio::test(start_paused = true)]
async fn test_falls_through_unavailable_models() {
    let invoker = ScriptedInvoker::new()
        .script("m1", vec![rate_limited("m1"), rate_limited("m1")])
        .script("m2", vec![rate_limited("m2"), rate_limited("m2")])
        .script("m3", vec![reply(SITE_JSON)])
        .into_arc();
    let orchestrator = orchestrator(invoker.clone(), &["m1", "m2", "m3"]);

    let started = Instant::now();
    let response = orchestrator.run(&generate()).await.unwrap();

    match response {
        Response::Site(site) => assert_eq!(site.files.len(), 2),
        other => panic!("unexpected response: {other:?}"),
    }
    assert_eq!(invoker.models_called(), vec!["m1", "m1", "m2", "m2", "m3"]);
    // One 2s backoff inside each exhausted model, none between models.
    assert_elapsed(started, 4_000);
}

#[tokio::test(start_paused = true)]
async fn test_retry_on_same_model_can_succeed() {
    let invoker = ScriptedInvoker::new()
        .script("m1", vec![rate_limited("m1"), reply(SITE_JSON)])
        .into_arc();
    let orchestrator = orchestrator(invoker.clone(), &["m1", "m2"]);

    assert!(orchestrator.run(&generate()).await.is_ok());
    assert_eq!(invoker.models_called(), vec!["m1", "m1"]);
}

#[tokio::test(start_paused = true)]
async fn test_all_permission_denied_tries_each_model_once() {
    let invoker = ScriptedInvoker::new()
        .script("m1", vec![denied("m1")])
        .script("m2", vec![denied("m2")])
        .script("m3", vec![denied("m3")])
        .into_arc();
    let orchestrator = orchestrator(invoker.clone(), &["m1", "m2", "m3"]);

    let started = Instant::now();
    let err = orchestrator.run(&generate()).await.unwrap_err();

    match err {
        SitesmithError::Exhausted {
            cause,
            attempts,
            last_error,
        } => {
            assert_eq!(cause, ExhaustionCause::PermissionDenied);
            assert_eq!(attempts, 3);
            assert!(last_error.is_permission());
            assert!(last_error.to_string().contains("m3"));
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
    assert_eq!(invoker.models_called(), vec!["m1", "m2", "m3"]);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_mixed_failures_exhaust_as_unavailable() {
    let invoker = ScriptedInvoker::new()
        .script("m1", vec![denied("m1")])
        .script("m2", vec![rate_limited("m2"), rate_limited("m2")])
        .into_arc();
    let orchestrator = orchestrator(invoker.clone(), &["m1", "m2"]);

    let err = orchestrator.run(&generate()).await.unwrap_err();

    match err {
        SitesmithError::Exhausted {
            cause,
            attempts,
            last_error,
        } => {
            assert_eq!(cause, ExhaustionCause::Unavailable);
            assert_eq!(attempts, 3);
            assert!(last_error.is_availability());
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_last_model_denied_after_outages_exhausts_as_unavailable() {
    let invoker = ScriptedInvoker::new()
        .script("m1", vec![rate_limited("m1"), rate_limited("m1")])
        .script("m2", vec![denied("m2")])
        .into_arc();
    let orchestrator = orchestrator(invoker.clone(), &["m1", "m2"]);

    let err = orchestrator.run(&generate()).await.unwrap_err();

    match err {
        SitesmithError::Exhausted {
            cause,
            attempts,
            last_error,
        } => {
            assert_eq!(cause, ExhaustionCause::Unavailable);
            assert_eq!(attempts, 3);
            assert!(last_error.is_permission());
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
    assert_eq!(invoker.models_called(), vec!["m1", "m1", "m2"]);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_generate_response_stops_immediately() {
    let invoker = ScriptedInvoker::new()
        .script("m1", vec![reply("Sorry, I can't build websites.")])
        .script("m2", vec![reply(SITE_JSON)])
        .into_arc();
    let orchestrator = orchestrator(invoker.clone(), &["m1", "m2"]);

    let err = orchestrator.run(&generate()).await.unwrap_err();

    assert!(err.is_malformed());
    assert_eq!(invoker.models_called(), vec!["m1"]);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_credential_stops_immediately() {
    let invoker = ScriptedInvoker::new()
        .script(
            "m1",
            vec![Err(SitesmithError::configuration("Gemini rejected the API key"))],
        )
        .into_arc();
    let orchestrator = orchestrator(invoker.clone(), &["m1", "m2", "m3"]);

    let err = orchestrator.run(&generate()).await.unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(invoker.models_called().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_tutor_prose_is_a_success() {
    let invoker = ScriptedInvoker::new()
        .script("m1", vec![reply("Verbs describe actions.")])
        .into_arc();
    let orchestrator = orchestrator(invoker.clone(), &["m1"]);
    let request = Request::Tutor {
        message: "what is a verb?".into(),
        history: Vec::new(),
        locale: Locale::En,
    };

    match orchestrator.run(&request).await.unwrap() {
        Response::Tutor(tutor) => {
            assert_eq!(tutor.board_content, "Verbs describe actions.");
            assert!(!tutor.chat_response.is_empty());
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_policy_never_sleeps() {
    let invoker = ScriptedInvoker::new().into_arc();
    let policy = RetryPolicy {
        max_attempts_per_model: 1,
        ..RetryPolicy::default()
    };
    let orchestrator = FallbackOrchestrator::new(invoker.clone(), config(&["m1", "m2"]).models, policy);

    let started = Instant::now();
    let err = orchestrator.run(&generate()).await.unwrap_err();

    assert!(err.is_exhausted());
    assert_eq!(invoker.models_called(), vec!["m1", "m2"]);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_grows_between_attempts() {
    let invoker = ScriptedInvoker::new().into_arc();
    let policy = RetryPolicy {
        max_attempts_per_model: 3,
        base_delay_ms: 1_000,
        backoff: BackoffStrategy::Exponential,
        ..RetryPolicy::default()
    };
    let orchestrator = FallbackOrchestrator::new(invoker.clone(), config(&["m1"]).models, policy);

    let started = Instant::now();
    let err = orchestrator.run(&generate()).await.unwrap_err();

    assert!(err.is_exhausted());
    assert_eq!(invoker.models_called().len(), 3);
    // 1s after the first attempt, 2s after the second, nothing after the last.
    assert_elapsed(started, 3_000);
}
