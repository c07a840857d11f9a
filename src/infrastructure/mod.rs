//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements the document store and selector boundary traits
//! and wires up services.

pub mod di;
pub mod document;
pub mod error;
pub mod traits;

pub use document::{DocumentError, TomlDocumentStore};
pub use error::{InfraError, InfraResult};
