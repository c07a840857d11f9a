//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::expr::ExprError;
use crate::domain::layer::LayerId;

/// Domain errors represent violations of the document model.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid expression in filter '{filter}': {source}")]
    InvalidExpression {
        filter: String,
        #[source]
        source: ExprError,
    },

    #[error("duplicate layer handle: {0}")]
    DuplicateHandle(LayerId),
}
