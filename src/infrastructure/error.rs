//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::document::DocumentError;

/// Infrastructure errors wrap application errors and add I/O-level concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("selector failed: {message}")]
    Selector { message: String },
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
