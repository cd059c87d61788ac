//! Domain errors for the Trickia quiz engine.

use thiserror::Error;

/// Domain-level errors that can occur in the Trickia system.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A session operation was invoked in the wrong lifecycle state.
    #[error("Invalid session state: cannot {operation} while {state}")]
    InvalidState { operation: String, state: String },

    /// Every attempt against the question provider was exhausted.
    #[error("No question available after {attempts} attempt(s)")]
    NoQuestionAvailable { attempts: u32 },

    /// The allowed theme list was empty after filtering unknown themes.
    #[error("No valid themes in selection")]
    EmptyThemeSet,

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    #[error("Question provider error: {0}")]
    ProviderError(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DomainError {
    pub fn invalid_state(operation: impl Into<String>, state: impl std::fmt::Display) -> Self {
        Self::InvalidState {
            operation: operation.into(),
            state: state.to_string(),
        }
    }

    /// True for errors caused by the caller rather than by the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidState { .. } | Self::UnknownTheme(_) | Self::ValidationFailed(_)
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
