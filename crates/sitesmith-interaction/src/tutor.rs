//! Tutor replies: a short chat line plus Markdown for the lesson board.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sitesmith_core::artifact::extract_json;
use tracing::debug;

/// Chat line used when the model omitted one.
pub const MATERIAL_READY_REPLY: &str = "Your lesson material is ready.";
/// Chat line used when the reply was not the expected JSON.
pub const UNSTRUCTURED_REPLY: &str = "I couldn't format this lesson properly, but here is the material.";
/// Board content used when the model returned nothing at all.
pub const EMPTY_BOARD: &str = "No lesson content was returned.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorResponse {
    pub chat_response: String,
    /// Markdown shown on the lesson board.
    pub board_content: String,
}

/// Parses a tutor reply. Never fails: both fields are always non-empty.
///
/// JSON with missing fields is completed with generic text; anything else is
/// treated as prose and placed on the board as-is.
pub fn parse_tutor_response(raw: &str) -> TutorResponse {
    let text = raw.trim();
    let board_fallback = || {
        if text.is_empty() {
            EMPTY_BOARD.to_string()
        } else {
            text.to_string()
        }
    };

    let structured = match extract_json(text) {
        Some(Value::Object(map)) if has_tutor_fields(&map) => Some(map),
        _ => None,
    };

    let Some(map) = structured else {
        debug!("Tutor reply is not structured JSON; using it as board content");
        return TutorResponse {
            chat_response: UNSTRUCTURED_REPLY.to_string(),
            board_content: board_fallback(),
        };
    };

    TutorResponse {
        chat_response: non_blank(&map, "chatResponse")
            .unwrap_or_else(|| MATERIAL_READY_REPLY.to_string()),
        board_content: non_blank(&map, "boardContent").unwrap_or_else(board_fallback),
    }
}

fn has_tutor_fields(map: &Map<String, Value>) -> bool {
    map.contains_key("chatResponse") || map.contains_key("boardContent")
}

fn non_blank(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
