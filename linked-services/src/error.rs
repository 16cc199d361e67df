use thiserror::Error;
use shared::types::ServiceId;
use crate::schema::Field;

/// A required field is empty. Raised before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub missing: Vec<Field>,
    pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Network or file-read failure; local state is left as it was
    #[error("transport error: {0}")]
    Transport(String),

    /// The collection endpoint refused the request with a message of its own
    #[error("{0}")]
    ServerRejection(String),

    #[error("linked service {0} not found")]
    NotFound(ServiceId),

    #[error("connection test already running for {0}")]
    Busy(ServiceId),
}

impl From<reqwest::Error> for ManagerError {
    fn from(err: reqwest::Error) -> Self {
        ManagerError::Transport(err.to_string())
    }
}

impl ManagerError {
    /// Text shown to the operator, or `None` when the failure is resolved silently.
    /// `fallback` is the retry hint used for transport failures.
    pub fn user_message(&self, fallback: &str) -> Option<String> {
        match self {
            ManagerError::Validation(err) => Some(err.message.to_string()),
            ManagerError::Transport(_) => Some(fallback.to_string()),
            ManagerError::ServerRejection(message) => Some(format!("Error: {}", message)),
            ManagerError::NotFound(_) | ManagerError::Busy(_) => None,
        }
    }
}
