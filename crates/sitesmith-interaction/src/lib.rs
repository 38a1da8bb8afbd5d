//! Model invocation and fallback orchestration for sitesmith.
//!
//! [`GenerationService`] is the entry point: it turns a user request into a
//! [`Request`], hands it to a [`FallbackOrchestrator`] that walks the configured
//! candidate models, and unwraps the typed [`Response`].

pub mod fallback;
pub mod gemini_api_agent;
pub mod invoker;
pub mod operation;
pub mod prompts;
pub mod service;
pub mod tutor;

pub use fallback::FallbackOrchestrator;
pub use gemini_api_agent::GeminiApiAgent;
pub use invoker::{FailureClass, InvocationOutcome, ModelInvoker, classify};
pub use operation::{Operation, Request, Response};
pub use service::GenerationService;
pub use tutor::{TutorResponse, parse_tutor_response};
