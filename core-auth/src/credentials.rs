//! Credential Provider
//!
//! Supplies the bearer token and API origin to the client.
//!
//! ## Security
//!
//! - Token values are never logged; `Debug` output is redacted
//! - A missing token is not an error: requests still go out with an empty
//!   bearer value and the server answers with an authorization failure
//!
//! ## Example
//!
//! ```
//! use core_auth::{CredentialProvider, StaticCredentialProvider};
//!
//! let provider = StaticCredentialProvider::new("secret", "https://api.example.com/repos/o/r/contents/");
//! let credentials = provider.credentials().unwrap();
//!
//! assert_eq!(credentials.api_base(), "https://api.example.com/repos/o/r/contents");
//! assert_eq!(credentials.token(), "secret");
//! ```

use crate::error::{AuthError, Result};
use core_runtime::logging::redact_token;
use std::fmt;
use tracing::{debug, warn};
use url::Url;

/// Environment variable holding the bearer token.
pub const DEFAULT_TOKEN_VAR: &str = "REMOTE_CONTENT_TOKEN";

/// Environment variable holding the API origin.
pub const DEFAULT_API_BASE_VAR: &str = "REMOTE_CONTENT_API_BASE";

/// Bearer token plus the API origin it is valid for.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
    api_base: String,
}

impl Credentials {
    /// Validates `api_base` as an absolute http(s) URL and trims any
    /// trailing `/`.
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> Result<Self> {
        let api_base = api_base.into();
        let trimmed = api_base.trim().trim_end_matches('/');

        let parsed = Url::parse(trimmed).map_err(|e| AuthError::InvalidApiBase {
            url: api_base.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AuthError::InvalidApiBase {
                url: api_base.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let token = token.into();
        if token.is_empty() {
            warn!("No API token configured; requests will be sent with an empty bearer token");
        }

        Ok(Self {
            token,
            api_base: trimmed.to_string(),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// API origin without a trailing `/`.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &redact_token(&self.token))
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Source of [`Credentials`].
pub trait CredentialProvider: Send + Sync {
    fn credentials(&self) -> Result<Credentials>;
}

/// Fixed credentials supplied at construction.
#[derive(Clone)]
pub struct StaticCredentialProvider {
    token: String,
    api_base: String,
}

impl StaticCredentialProvider {
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: api_base.into(),
        }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn credentials(&self) -> Result<Credentials> {
        Credentials::new(self.token.clone(), self.api_base.clone())
    }
}

/// Reads credentials from environment variables on every call.
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    token_var: String,
    api_base_var: String,
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::with_vars(DEFAULT_TOKEN_VAR, DEFAULT_API_BASE_VAR)
    }
}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vars(token_var: impl Into<String>, api_base_var: impl Into<String>) -> Self {
        Self {
            token_var: token_var.into(),
            api_base_var: api_base_var.into(),
        }
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn credentials(&self) -> Result<Credentials> {
        let api_base = match std::env::var(&self.api_base_var) {
            Ok(value) if !value.trim().is_empty() => value,
            Ok(_) | Err(std::env::VarError::NotPresent) => {
                return Err(AuthError::MissingApiBase(self.api_base_var.clone()))
            }
            Err(std::env::VarError::NotUnicode(_)) => {
                return Err(AuthError::Unavailable(format!(
                    "{} is not valid unicode",
                    self.api_base_var
                )))
            }
        };

        let token = std::env::var(&self.token_var).unwrap_or_default();
        debug!(
            token_var = %self.token_var,
            api_base_var = %self.api_base_var,
            "Loaded credentials from environment"
        );

        Credentials::new(token, api_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_trailing_slash_is_trimmed() {
        let credentials = Credentials::new("t", "https://api.example.com/contents///").unwrap();
        assert_eq!(credentials.api_base(), "https://api.example.com/contents");
    }

    #[test]
    fn test_invalid_api_base_is_rejected() {
        let err = Credentials::new("t", "not a url").unwrap_err();
        assert!(matches!(err, AuthError::InvalidApiBase { .. }));

        let err = Credentials::new("t", "ftp://files.example.com").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_debug_never_prints_token() {
        let credentials = Credentials::new("super-secret-token", "https://api.example.com").unwrap();
        let rendered = format!("{:?}", credentials);

        assert!(!rendered.contains("super-secret-token"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(rendered.contains("https://api.example.com"));
    }

    #[test]
    fn test_empty_token_is_accepted() {
        let credentials = Credentials::new("", "https://api.example.com").unwrap();
        assert_eq!(credentials.token(), "");
    }

    #[test]
    fn test_static_provider() {
        let provider = StaticCredentialProvider::new("abc", "http://localhost:8080/");
        let credentials = provider.credentials().unwrap();

        assert_eq!(credentials.token(), "abc");
        assert_eq!(credentials.api_base(), "http://localhost:8080");
    }

    #[test]
    fn test_env_provider_reads_variables() {
        std::env::set_var("CORE_AUTH_TEST_TOKEN_A", "env-token");
        std::env::set_var("CORE_AUTH_TEST_BASE_A", "https://env.example.com/");

        let provider =
            EnvCredentialProvider::with_vars("CORE_AUTH_TEST_TOKEN_A", "CORE_AUTH_TEST_BASE_A");
        let credentials = provider.credentials().unwrap();

        assert_eq!(credentials.token(), "env-token");
        assert_eq!(credentials.api_base(), "https://env.example.com");
    }

    #[test]
    fn test_env_provider_missing_token_is_empty() {
        std::env::remove_var("CORE_AUTH_TEST_TOKEN_B");
        std::env::set_var("CORE_AUTH_TEST_BASE_B", "https://env.example.com");

        let provider =
            EnvCredentialProvider::with_vars("CORE_AUTH_TEST_TOKEN_B", "CORE_AUTH_TEST_BASE_B");
        assert_eq!(provider.credentials().unwrap().token(), "");
    }

    #[test]
    fn test_env_provider_missing_api_base() {
        std::env::remove_var("CORE_AUTH_TEST_BASE_C");

        let provider =
            EnvCredentialProvider::with_vars("CORE_AUTH_TEST_TOKEN_C", "CORE_AUTH_TEST_BASE_C");
        assert_eq!(
            provider.credentials().unwrap_err(),
            AuthError::MissingApiBase("CORE_AUTH_TEST_BASE_C".to_string())
        );
    }
}
