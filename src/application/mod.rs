//! Application layer: services orchestrating domain logic over I/O traits

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
