//! I/O boundary traits for testability
//!
//! These traits abstract the document store and the interactive picker,
//! allowing services and commands to be tested with mock implementations.

use std::path::{Path, PathBuf};

use crate::domain::Document;
use crate::infrastructure::document::DocumentError;

/// Document persistence abstraction.
pub trait DocumentStore: Send + Sync {
    /// Load and validate a document from disk.
    fn load(&self, path: &Path) -> Result<Document, DocumentError>;

    /// Persist a document, replacing the target atomically.
    fn save(&self, path: &Path, document: &Document) -> Result<(), DocumentError>;
}

/// Interactive FZF-style picker abstraction.
pub trait Selector: Send + Sync {
    /// Present candidate paths to the user and return the chosen one.
    /// Returns None if the user cancels (Esc/Ctrl-C).
    fn pick(&self, candidates: &[PathBuf], prompt: &str) -> Result<Option<PathBuf>, String>;
}

/// Real picker implementation using skim (FZF-like).
#[derive(Debug, Default)]
pub struct SkimSelector;

impl Selector for SkimSelector {
    fn pick(&self, candidates: &[PathBuf], prompt: &str) -> Result<Option<PathBuf>, String> {
        use skim::prelude::*;
        use std::io::Cursor;

        if candidates.is_empty() {
            return Ok(None);
        }

        let displays: Vec<String> = candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        let input = displays.join("\n");

        let options = SkimOptionsBuilder::default()
            .prompt(Some(prompt))
            .height(Some("50%"))
            .multi(false)
            .build()
            .map_err(|e| format!("failed to build skim options: {e}"))?;

        let item_reader = SkimItemReader::default();
        let items = item_reader.of_bufread(Cursor::new(input));

        let output = Skim::run_with(&options, Some(items));

        match output {
            Some(out) if out.is_abort => Ok(None),
            Some(out) => {
                if let Some(selected) = out.selected_items.first() {
                    let chosen = selected.output().to_string();
                    let path = displays
                        .iter()
                        .position(|d| *d == chosen)
                        .map(|i| candidates[i].clone());
                    Ok(path)
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }
}
