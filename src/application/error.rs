//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{DomainError, LayerId};

/// Application errors wrap domain errors and add orchestration-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("no destination layer for {id} in group '{group}'")]
    UnresolvedMember { group: String, id: LayerId },

    #[error("no default template configured")]
    TemplateNotConfigured,

    #[error("default template not found: {0}")]
    TemplateMissing(PathBuf),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
