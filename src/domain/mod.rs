//! Domain layer: entities and the merge core
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod document;
pub mod error;
pub mod expr;
pub mod filter;
pub mod layer;
pub mod merge;

pub use document::Document;
pub use error::DomainError;
pub use expr::{ExprError, Expression};
pub use filter::{FilterKind, FilterNode, FilterTree};
pub use layer::{IdMap, LayerId, LayerRecord, LayerTable};
pub use merge::{merge_trees, MergeError, MergeHost, MergeStats, UnresolvedMembers};
