//! Domain model and pure transforms for Sitesmith.
//!
//! - [`artifact`]: generated files, response validation, preview bundling
//! - [`conversation`]: chat turns and alternation repair
//! - [`config`]: candidate models, retry policy, credentials
//! - [`error`]: the shared error taxonomy

pub mod artifact;
pub mod config;
pub mod conversation;
pub mod error;
pub mod secret;

// Re-export common error type
pub use error::{Result, SitesmithError};
