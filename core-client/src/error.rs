use bridge_traits::BridgeError;
use thiserror::Error;

use crate::types::RequestId;

/// Failure class of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed response body
    Parse,
    /// Connection, timeout or interrupted exchange
    Transport,
    /// Unsuccessful status, missing field, not found, client state
    Application,
    /// The call was cancelled through the registry or by shutdown
    Cancelled,
}

/// Every way an operation can fail.
///
/// The `Display` output is exactly the message handed to
/// `ResultCallback::on_failure`, so its shape is part of the public contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("{0}")]
    Parse(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Cancelled: request {request_id} was cancelled")]
    Cancelled { request_id: RequestId },

    #[error("File not found")]
    NotFound,

    #[error("Error: HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("Error: {step}: HTTP {status}")]
    Rejected { step: &'static str, status: u16 },

    #[error("Error: missing field `{0}` in response")]
    MissingField(&'static str),

    #[error("Error: client has been shut down")]
    Shutdown,

    #[error("Error: operation aborted unexpectedly")]
    Aborted,

    #[error("Error: {0}")]
    Configuration(String),

    #[error("Error: {0}")]
    Other(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Parse(_) => ErrorKind::Parse,
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Cancelled { .. } => ErrorKind::Cancelled,
            ClientError::NotFound
            | ClientError::Http { .. }
            | ClientError::Rejected { .. }
            | ClientError::MissingField(_)
            | ClientError::Shutdown
            | ClientError::Aborted
            | ClientError::Configuration(_)
            | ClientError::Other(_) => ErrorKind::Application,
        }
    }

    /// Maps a pipeline failure for the call identified by `request_id`.
    pub fn from_bridge(err: BridgeError, request_id: &RequestId) -> Self {
        match err {
            BridgeError::Transport(message) => ClientError::Transport(message),
            BridgeError::Cancelled => ClientError::Cancelled {
                request_id: request_id.clone(),
            },
            other => ClientError::Other(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}

impl From<core_auth::AuthError> for ClientError {
    fn from(err: core_auth::AuthError) -> Self {
        ClientError::Configuration(err.to_string())
    }
}

impl From<core_runtime::Error> for ClientError {
    fn from(err: core_runtime::Error) -> Self {
        ClientError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
