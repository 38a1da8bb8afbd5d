use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the entry page every generated site is expected to contain.
pub const INDEX_FILE: &str = "index.html";

/// The role a source file plays in the generated site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    #[serde(rename = "html", alias = "markup", alias = "htm")]
    Markup,
    #[serde(rename = "css", alias = "style")]
    Style,
    #[serde(rename = "js", alias = "script", alias = "javascript")]
    Script,
    #[serde(rename = "json", alias = "data")]
    Data,
}

impl FileKind {
    /// Infers the kind from a file name's extension.
    ///
    /// Anything that is not markup, a stylesheet, or a script is treated as data.
    pub fn from_name(name: &str) -> Self {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "html" | "htm" => Self::Markup,
            "css" => Self::Style,
            "js" | "mjs" => Self::Script,
            _ => Self::Data,
        }
    }

    /// Parses a kind tag as the model emits it (`html`, `css`, `js`, `json`, or the long names).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "html" | "htm" | "markup" => Some(Self::Markup),
            "css" | "style" => Some(Self::Style),
            "js" | "javascript" | "script" => Some(Self::Script),
            "json" | "data" => Some(Self::Data),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markup => "html",
            Self::Style => "css",
            Self::Script => "js",
            Self::Data => "json",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output language requested for generated copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Indonesian
    #[default]
    Id,
    /// Tetum
    Tet,
    /// English
    En,
    /// Portuguese
    Pt,
}

impl Locale {
    pub const ALL: [Locale; 4] = [Locale::Id, Locale::Tet, Locale::En, Locale::Pt];

    /// Parses a locale tag, ignoring case and any region suffix (`pt-PT`, `en_US`).
    pub fn parse(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "id" => Some(Self::Id),
            "tet" => Some(Self::Tet),
            "en" => Some(Self::En),
            "pt" => Some(Self::Pt),
            _ => None,
        }
    }

    /// Parses `tag`, falling back to `default` for missing or unknown tags.
    pub fn parse_or(tag: Option<&str>, default: Locale) -> Self {
        tag.and_then(Self::parse).unwrap_or(default)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Tet => "tet",
            Self::En => "en",
            Self::Pt => "pt",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named source file of a generated site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Relative path; at most one directory level (e.g. `js/app.js`).
    pub name: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: FileKind,
    pub content: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, kind: FileKind, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            content: content.into(),
        }
    }

    /// Creates a file whose kind is inferred from its extension.
    pub fn inferred(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        let kind = FileKind::from_name(&name);
        Self::new(name, kind, content)
    }
}

/// A complete generated site: every file plus the language its copy is written in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSet {
    pub files: Vec<SourceFile>,
    #[serde(rename = "language", alias = "locale", default)]
    pub locale: Locale,
}

impl ArtifactSet {
    pub fn new(files: Vec<SourceFile>, locale: Locale) -> Self {
        Self { files, locale }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Looks up a file by exact name.
    pub fn file(&self, name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|file| file.name == name)
    }

    /// The `index.html` entry page, if present.
    pub fn index(&self) -> Option<&SourceFile> {
        self.file(INDEX_FILE)
    }
}
