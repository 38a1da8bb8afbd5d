//! Response validation for generated sites.
//!
//! Models are asked for raw JSON, but routinely wrap it in Markdown code fences
//! or surround it with a sentence of prose. `extract_json` recovers the payload
//! from those shapes; `validate` then checks it describes a non-empty file set.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::model::{ArtifactSet, FileKind, Locale, SourceFile};
use crate::error::{Result, SitesmithError};

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\r?\n?```").expect("fence pattern is valid")
});

#[derive(Deserialize)]
struct RawArtifact {
    #[serde(default)]
    files: Vec<RawFile>,
    // Anything but a string is an unknown tag, not a broken payload.
    #[serde(alias = "locale", default)]
    language: Option<Value>,
}

#[derive(Deserialize)]
struct RawFile {
    #[serde(alias = "path", alias = "filename")]
    name: String,
    #[serde(rename = "type", alias = "kind", default)]
    kind: Option<String>,
    #[serde(alias = "code")]
    content: String,
}

/// Best-effort recovery of a JSON value from model output.
///
/// Tries, in order: the trimmed text, the first fenced code block, and the
/// outermost `{...}` / `[...]` span.
pub fn extract_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    if let Some(inner) = FENCED_BLOCK
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
    {
        if let Ok(value) = serde_json::from_str(inner.as_str().trim()) {
            return Some(value);
        }
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
            if start < end {
                if let Ok(value) = serde_json::from_str(&trimmed[start..=end]) {
                    return Some(value);
                }
            }
        }
    }

    None
}

/// Parses raw model output into an [`ArtifactSet`].
///
/// Unknown or missing language tags fall back to `default_locale`. Duplicate
/// file names keep the last content at the first position.
pub fn validate(raw: &str, default_locale: Locale) -> Result<ArtifactSet> {
    let value = extract_json(raw).ok_or_else(|| {
        SitesmithError::malformed("response is not valid JSON after removing code fences")
    })?;

    let artifact = match value {
        Value::Array(_) => RawArtifact {
            files: serde_json::from_value(value)
                .map_err(|err| SitesmithError::malformed(format!("invalid file list: {err}")))?,
            language: None,
        },
        Value::Object(_) => serde_json::from_value(value)
            .map_err(|err| SitesmithError::malformed(format!("invalid site payload: {err}")))?,
        other => {
            return Err(SitesmithError::malformed(format!(
                "expected an object with a `files` list, got {}",
                json_type(&other)
            )));
        }
    };

    if artifact.files.is_empty() {
        return Err(SitesmithError::malformed("response contains no files"));
    }

    let mut files: Vec<SourceFile> = Vec::with_capacity(artifact.files.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for raw_file in artifact.files {
        let name = normalize_name(&raw_file.name);
        if name.is_empty() {
            return Err(SitesmithError::malformed("a file in the response has an empty name"));
        }

        let kind = raw_file
            .kind
            .as_deref()
            .and_then(FileKind::parse)
            .unwrap_or_else(|| FileKind::from_name(&name));

        match positions.get(&name) {
            Some(&at) => {
                warn!(file = %name, "Duplicate file in model response; keeping the last copy");
                files[at] = SourceFile::new(name, kind, raw_file.content);
            }
            None => {
                positions.insert(name.clone(), files.len());
                files.push(SourceFile::new(name, kind, raw_file.content));
            }
        }
    }

    let locale = Locale::parse_or(artifact.language.as_ref().and_then(Value::as_str), default_locale);
    debug!(file_count = files.len(), %locale, "Validated site response");

    Ok(ArtifactSet::new(files, locale))
}

fn normalize_name(name: &str) -> String {
    let name = name.trim();
    let name = name.strip_prefix("./").unwrap_or(name);
    name.trim_start_matches('/').to_string()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
