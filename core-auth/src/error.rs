use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("API base URL is not configured: set {0}")]
    MissingApiBase(String),

    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidApiBase { url: String, reason: String },

    #[error("Credential source unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
