//! GeminiApiAgent - Direct REST implementation of [`ModelInvoker`] for Gemini.
//!
//! One agent serves every candidate model; the model name is part of the URL.
//! The API key travels in the `x-goog-api-key` header so it never appears in
//! URLs, logs, or error messages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use sitesmith_core::config::{Credential, DEFAULT_BASE_URL, GenerationConfig};
use sitesmith_core::conversation::{ConversationTurn, prepare_history};
use sitesmith_core::{Result, SitesmithError};
use tracing::{debug, warn};

use crate::invoker::ModelInvoker;
use crate::operation::{Request, Response};
use crate::prompts;

const API_KEY_HEADER: &str = "x-goog-api-key";
const JSON_MIME_TYPE: &str = "application/json";

/// Invoker that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiAgent {
    client: Client,
    credential: Credential,
    base_url: String,
}

impl GeminiApiAgent {
    /// Creates an agent whose requests are cut off after `attempt_timeout`.
    pub fn new(credential: Credential, attempt_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(attempt_timeout)
            .build()
            .map_err(|err| SitesmithError::internal(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn from_config(credential: Credential, config: &GenerationConfig) -> Result<Self> {
        Ok(Self::new(credential, config.retry.attempt_timeout())?.with_base_url(&config.base_url))
    }

    /// Overrides the models endpoint, e.g. for a proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/{model}:generateContent", self.base_url)
    }

    async fn send_request(&self, model: &str, body: &GenerateContentRequest) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header(API_KEY_HEADER, self.credential.expose())
            .json(body)
            .send()
            .await
            .map_err(|err| transport_error(model, &err))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(model, status, &body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            if err.is_timeout() {
                transport_error(model, &err)
            } else {
                SitesmithError::malformed(format!("Failed to parse Gemini response: {err}"))
            }
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl ModelInvoker for GeminiApiAgent {
    async fn invoke(&self, model: &str, request: &Request) -> Result<Response> {
        let body = build_request(request);
        debug!(model, operation = %request.operation(), "Sending Gemini request");

        let reply = self.send_request(model, &body).await;
        interpret_reply(model, request, reply)
    }
}

/// Turns the outcome of one HTTP exchange into a typed response.
///
/// A tutor reply without usable text still gets the fixed empty board.
fn interpret_reply(model: &str, request: &Request, reply: Result<String>) -> Result<Response> {
    let text = match reply {
        Ok(text) => text,
        Err(err) if err.is_malformed() && matches!(request, Request::Tutor { .. }) => {
            warn!(model, error = %err, "Tutor reply had no usable text; showing empty board");
            String::new()
        }
        Err(err) => return Err(err),
    };
    debug!(model, response_chars = text.len(), "Gemini request succeeded");

    request.interpret(&text)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationSettings>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

impl Content {
    fn turn(role: &'static str, text: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            parts: vec![Part { text: text.into() }],
        }
    }

    fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSettings {
    response_mime_type: &'static str,
}

fn build_request(request: &Request) -> GenerateContentRequest {
    let json_output = request
        .operation()
        .expects_json()
        .then_some(GenerationSettings {
            response_mime_type: JSON_MIME_TYPE,
        });

    let (system, contents) = match request {
        Request::Generate { prompt, locale } => (
            prompts::SITE_SYSTEM_INSTRUCTION.to_string(),
            vec![Content::turn("user", prompts::generate_prompt(prompt, *locale))],
        ),
        Request::Refine {
            files,
            instruction,
            locale,
        } => (
            prompts::SITE_SYSTEM_INSTRUCTION.to_string(),
            vec![Content::turn(
                "user",
                prompts::refine_prompt(files, instruction, *locale),
            )],
        ),
        Request::Chat { message, history } => (
            prompts::CHAT_SYSTEM_INSTRUCTION.to_string(),
            conversation(history, message),
        ),
        Request::Tutor {
            message,
            history,
            locale,
        } => (
            prompts::tutor_system_instruction(*locale),
            conversation(history, message),
        ),
    };

    GenerateContentRequest {
        contents,
        system_instruction: Content::instruction(system),
        generation_config: json_output,
    }
}

fn conversation(history: &[ConversationTurn], message: &str) -> Vec<Content> {
    let mut contents: Vec<Content> = prepare_history(history)
        .into_iter()
        .map(|turn| Content::turn(turn.speaker.provider_role(), turn.text))
        .collect();
    contents.push(Content::turn("user", message));
    contents
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

/// Concatenates the text parts of the first candidate.
fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    let text = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .filter(|text| !text.trim().is_empty());

    match text {
        Some(text) => Ok(text),
        None => {
            let reason = response
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .map(|reason| format!(" (blocked: {reason})"))
                .unwrap_or_default();
            Err(SitesmithError::malformed(format!(
                "Gemini API returned no text in the response candidates{reason}"
            )))
        }
    }
}

fn map_http_error(model: &str, status: StatusCode, body: &str) -> SitesmithError {
    let parsed = serde_json::from_str::<ErrorWrapper>(body).ok();
    let status_text = parsed
        .as_ref()
        .and_then(|wrapper| wrapper.error.status.clone())
        .unwrap_or_default();
    let reasons: Vec<&str> = parsed
        .as_ref()
        .map(|wrapper| {
            wrapper
                .error
                .details
                .iter()
                .filter_map(|detail| detail.get("reason").and_then(serde_json::Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    let message = parsed
        .as_ref()
        .and_then(|wrapper| wrapper.error.message.clone())
        .unwrap_or_else(|| body.trim().to_string());
    let message = if status_text.is_empty() {
        message
    } else {
        format!("{status_text}: {message}")
    };

    let rejected_key = status == StatusCode::UNAUTHORIZED
        || status_text == "UNAUTHENTICATED"
        || reasons.contains(&"API_KEY_INVALID");
    if rejected_key {
        return SitesmithError::configuration(format!("Gemini rejected the API key: {message}"));
    }

    let denied = matches!(status, StatusCode::FORBIDDEN | StatusCode::NOT_FOUND)
        || matches!(status_text.as_str(), "PERMISSION_DENIED" | "NOT_FOUND");
    if denied {
        return SitesmithError::permission(model, message);
    }

    // 429/5xx, RESOURCE_EXHAUSTED, UNAVAILABLE, and anything unrecognized.
    SitesmithError::availability(model, Some(status.as_u16()), message)
}

fn transport_error(model: &str, err: &reqwest::Error) -> SitesmithError {
    let message = if err.is_timeout() {
        "Gemini API request timed out".to_string()
    } else {
        format!("Gemini API request failed: {err}")
    };
    SitesmithError::availability(model, None, message)
}
