//! Error types for the order board.

use crate::framework::FrameworkError;
use thiserror::Error;

/// Errors that can occur during order board operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BoardError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// An error occurred while communicating with the board actor.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for BoardError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => BoardError::NotFound(id),
            other => BoardError::ActorCommunicationError(other.to_string()),
        }
    }
}
