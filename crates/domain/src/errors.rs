//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Rendezvous
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum RendezvousError {
    /// Backend unreachable or answered with a non-2xx status.
    #[error("Network error: {0}")]
    Network(String),

    /// Credentials rejected by a backend.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The NLU classifier call failed.
    #[error("NLU error: {0}")]
    Nlu(String),

    /// The user typed "cancel" while a slot was being filled.
    #[error("Cancelled by user")]
    UserCancelled,

    /// Some but not all calendar writes succeeded.
    #[error("Meeting confirmed on {confirmed:?} but not on {failed:?}")]
    PartialScheduleFailure { confirmed: Vec<String>, failed: Vec<String> },

    /// No calendar write succeeded.
    #[error("Meeting could not be scheduled on {failed:?}")]
    TotalScheduleFailure { failed: Vec<String> },

    /// A participant has no calendar backend configured.
    #[error("No calendar configured for {0}")]
    MissingCalendarConfig(String),

    /// The conversation's inbound side went away before a message arrived.
    #[error("Conversation channel closed: {0}")]
    ChannelClosed(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RendezvousError {
    /// Whether the error came from talking to a remote service (network or
    /// credentials), as opposed to a local failure.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Auth(_))
    }
}

/// Result type alias for Rendezvous operations
pub type Result<T> = std::result::Result<T, RendezvousError>;
