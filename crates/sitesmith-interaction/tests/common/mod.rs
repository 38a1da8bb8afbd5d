#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sitesmith_core::config::{GenerationConfig, ModelCandidates};
use sitesmith_core::{Result, SitesmithError};
use sitesmith_interaction::{ModelInvoker, Request, Response};

pub const SITE_JSON: &str = r#"{"files":[{"name":"index.html","type":"html","content":"<link rel=\"stylesheet\" href=\"style.css\"><h1>Hi</h1>"},{"name":"style.css","type":"css","content":"h1{color:red}"}],"language":"en"}"#;

/// Replays a fixed script of raw replies or errors per model.
///
/// Unscripted calls answer with a 503 so that running off the end of a script
/// looks like an outage.
#[derive(Default)]
pub struct ScriptedInvoker {
    scripts: Mutex<HashMap<String, VecDeque<Result<String>>>>,
    calls: Mutex<Vec<(String, Request)>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, model: &str, steps: Vec<Result<String>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(model.to_string(), steps.into());
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Model names in call order.
    pub fn models_called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }
}

#[async_trait]
impl ModelInvoker for ScriptedInvoker {
    async fn invoke(&self, model: &str, request: &Request) -> Result<Response> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), request.clone()));

        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(model)
            .and_then(VecDeque::pop_front);

        match step {
            Some(Ok(text)) => request.interpret(&text),
            Some(Err(error)) => Err(error),
            None => Err(SitesmithError::availability(model, Some(503), "unscripted call")),
        }
    }
}

pub fn reply(text: &str) -> Result<String> {
    Ok(text.to_string())
}

pub fn rate_limited(model: &str) -> Result<String> {
    Err(SitesmithError::availability(model, Some(429), "RESOURCE_EXHAUSTED: quota"))
}

pub fn denied(model: &str) -> Result<String> {
    Err(SitesmithError::permission(model, "PERMISSION_DENIED: model not enabled"))
}

pub fn config(models: &[&str]) -> GenerationConfig {
    GenerationConfig {
        models: ModelCandidates::new(models.iter().copied()).unwrap(),
        ..GenerationConfig::default()
    }
}
