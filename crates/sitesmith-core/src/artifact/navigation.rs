//! Messages posted by a bundled preview to its embedder.

use serde::{Deserialize, Serialize};

use super::model::{FileKind, SourceFile};
use crate::error::Result;

/// Structured message emitted by the navigation script of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PreviewMessage {
    /// A local `.html` link was clicked inside the preview.
    Navigate { target: String },
}

impl PreviewMessage {
    /// Decodes a message received from the preview frame.
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Maps a navigation target to a markup page of the file set.
///
/// Leading `./` or `/` and any query string or fragment are ignored.
pub fn resolve_navigation<'a>(files: &'a [SourceFile], target: &str) -> Option<&'a SourceFile> {
    let path = target
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let path = path.strip_prefix("./").unwrap_or(path);
    let path = path.trim_start_matches('/');

    files
        .iter()
        .find(|file| file.kind == FileKind::Markup && file.name == path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages() -> Vec<SourceFile> {
        vec![
            SourceFile::inferred("index.html", "<html></html>"),
            SourceFile::inferred("about.html", "<html>about</html>"),
            SourceFile::inferred("blog/post.html", "<html>post</html>"),
            SourceFile::inferred("style.css", "a{}"),
        ]
    }

    #[test]
    fn test_parse_navigate_message() {
        let message = PreviewMessage::parse(r#"{"kind":"navigate","target":"about.html"}"#).unwrap();
        assert_eq!(
            message,
            PreviewMessage::Navigate {
                target: "about.html".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        assert!(PreviewMessage::parse(r#"{"kind":"reload"}"#).is_err());
    }

    #[test]
    fn test_resolve_navigation_normalizes_target() {
        let files = pages();

        assert_eq!(resolve_navigation(&files, "about.html").unwrap().name, "about.html");
        assert_eq!(resolve_navigation(&files, "./about.html#team").unwrap().name, "about.html");
        assert_eq!(
            resolve_navigation(&files, "/blog/post.html?ref=1").unwrap().name,
            "blog/post.html"
        );
        assert!(resolve_navigation(&files, "missing.html").is_none());
        assert!(resolve_navigation(&files, "style.css").is_none());
    }
}
