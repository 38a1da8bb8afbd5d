//! The four generation operations and their typed inputs and outputs.

use std::fmt;

use sitesmith_core::artifact::{ArtifactSet, Locale, SourceFile, validate};
use sitesmith_core::conversation::ConversationTurn;
use sitesmith_core::{Result, SitesmithError};

use crate::tutor::{TutorResponse, parse_tutor_response};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Generate,
    Refine,
    Chat,
    Tutor,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Refine => "refine",
            Self::Chat => "chat",
            Self::Tutor => "tutor",
        }
    }

    /// Whether the model is asked for a JSON body rather than prose.
    pub fn expects_json(&self) -> bool {
        !matches!(self, Self::Chat)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for one of the four operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Generate {
        prompt: String,
        locale: Locale,
    },
    /// `files` is the complete current site; the model returns a complete replacement.
    Refine {
        files: Vec<SourceFile>,
        instruction: String,
        locale: Locale,
    },
    Chat {
        message: String,
        history: Vec<ConversationTurn>,
    },
    Tutor {
        message: String,
        history: Vec<ConversationTurn>,
        locale: Locale,
    },
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Generate { .. } => Operation::Generate,
            Self::Refine { .. } => Operation::Refine,
            Self::Chat { .. } => Operation::Chat,
            Self::Tutor { .. } => Operation::Tutor,
        }
    }

    /// Turns the raw text a model returned for this request into a typed response.
    ///
    /// Site operations fail with `MalformedResponse` when the text does not
    /// describe a file set, and chat fails on a blank reply. Tutor replies never
    /// fail.
    pub fn interpret(&self, text: &str) -> Result<Response> {
        match self {
            Self::Generate { locale, .. } => validate(text, *locale).map(Response::Site),
            Self::Refine { locale, .. } => {
                let mut site = validate(text, *locale)?;
                site.locale = *locale;
                Ok(Response::Site(site))
            }
            Self::Chat { .. } => {
                let reply = text.trim();
                if reply.is_empty() {
                    return Err(SitesmithError::malformed("model returned an empty chat reply"));
                }
                Ok(Response::Text(reply.to_string()))
            }
            Self::Tutor { .. } => Ok(Response::Tutor(parse_tutor_response(text))),
        }
    }
}

/// What a successful invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Site(ArtifactSet),
    Text(String),
    Tutor(TutorResponse),
}

impl Response {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Site(_) => "site",
            Self::Text(_) => "text",
            Self::Tutor(_) => "tutor",
        }
    }
}
