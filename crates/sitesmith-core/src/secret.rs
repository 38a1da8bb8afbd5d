//! Secret management service trait.
//!
//! Defines the interface for loading API keys from the hosting environment.

use crate::config::{Credential, SecretConfig};
use crate::error::Result;

/// Service for loading secret configuration.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Secret files have appropriate permissions (e.g., 600 on Unix)
/// - Secrets are never logged or exposed in error messages
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration file.
    async fn load_secrets(&self) -> Result<SecretConfig>;

    /// Resolves the Gemini credential from every supported source.
    ///
    /// Returns a `Configuration` error when no usable key is available.
    async fn resolve_credential(&self) -> Result<Credential>;
}
