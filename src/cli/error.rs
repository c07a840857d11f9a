//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::document::DocumentError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DocumentError> for CliError {
    fn from(e: DocumentError) -> Self {
        CliError::Infra(InfraError::Document(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Document(doc) => match doc {
                    DocumentError::Read { .. } => crate::exitcode::NOINPUT,
                    DocumentError::Parse { .. } | DocumentError::Invalid { .. } => {
                        crate::exitcode::DATAERR
                    }
                    DocumentError::Serialize(_) | DocumentError::Write { .. } => {
                        crate::exitcode::IOERR
                    }
                },
                InfraError::Selector { .. } => crate::exitcode::SOFTWARE,
                InfraError::Application(app) => match app {
                    ApplicationError::TemplateNotConfigured
                    | ApplicationError::TemplateMissing(_)
                    | ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::Domain(_) | ApplicationError::UnresolvedMember { .. } => {
                        crate::exitcode::DATAERR
                    }
                    ApplicationError::OperationFailed { .. } => crate::exitcode::SOFTWARE,
                },
            },
        }
    }
}
