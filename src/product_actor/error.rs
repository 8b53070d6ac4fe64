use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Outcome of a rejected product operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product already exists: {0}")]
    DuplicateKey(String),
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for ProductError {
    fn from(error: FrameworkError) -> Self {
        match error {
            FrameworkError::DuplicateKey(name) => ProductError::DuplicateKey(name),
            FrameworkError::NotFound(name) => ProductError::NotFound(name),
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}
