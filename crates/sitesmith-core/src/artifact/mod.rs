//! Generated site artifacts: the file model, response validation, and preview bundling.

pub mod bundler;
pub mod model;
pub mod navigation;
pub mod validator;

pub use bundler::{NAVIGATION_SCRIPT, PREVIEW_SANDBOX, bundle, bundle_entry};
pub use model::{ArtifactSet, FileKind, INDEX_FILE, Locale, SourceFile};
pub use navigation::{PreviewMessage, resolve_navigation};
pub use validator::{extract_json, validate};
