//! lfmerge: merge layer filter trees between drawing documents.
//!
//! A drawing document carries a layer table and a hierarchy of named layer
//! filters (boolean expressions over layer properties, or explicit layer
//! groups). `lfmerge` copies the filter hierarchy of one document into
//! another without disturbing anything already there: filters are matched
//! by name level by level, missing ones are created, and the layers a
//! group references are cloned into the destination with their ids
//! remapped.
//!
//! Layering:
//! - `domain`: layer table, filter tree, expression language, merge
//!   algorithm. No I/O.
//! - `application`: the import service orchestrating a merge between two
//!   stored documents.
//! - `infrastructure`: TOML document store, interactive selector, DI
//!   container.
//! - `cli`: clap argument surface and command dispatch.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
