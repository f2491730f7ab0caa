use thiserror::Error;

/// Failures surfaced by the ticket, user and survey services.
#[derive(Debug, Error)]
pub enum HelpdeskError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The record exists but its current state forbids the operation.
    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl HelpdeskError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        HelpdeskError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        HelpdeskError::InvalidState(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        HelpdeskError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        HelpdeskError::Conflict(message.into())
    }
}

pub type Result<T, E = HelpdeskError> = std::result::Result<T, E>;
