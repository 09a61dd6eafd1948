use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The request never produced a response (DNS, connect, TLS, timeout, reset).
    #[error("{0}")]
    Transport(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl BridgeError {
    /// Transport failures are the only class the retry stage acts on.
    pub fn is_transport(&self) -> bool {
        matches!(self, BridgeError::Transport(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, BridgeError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
