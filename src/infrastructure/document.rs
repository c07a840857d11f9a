//! TOML drawing-document store.
//!
//! A document file holds a `[[layers]]` table and a nested `[[filters]]`
//! tree. Each filter node carries exactly one of `expression` or `layers`.
//! Saving is atomic: the document is serialized to a temp file next to the
//! target and renamed over it, so a failed import never leaves a partially
//! written destination.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::domain::{Document, FilterKind, FilterNode, FilterTree, LayerId, LayerRecord};
use crate::infrastructure::traits::DocumentStore;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid document {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("cannot serialize document: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DocumentDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    layers: Vec<LayerDto>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    filters: Vec<FilterDto>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LayerDto {
    handle: u64,
    name: String,
    #[serde(default = "default_color")]
    color: i16,
    #[serde(default = "default_linetype")]
    linetype: String,
    #[serde(default)]
    frozen: bool,
    #[serde(default)]
    locked: bool,
}

fn default_color() -> i16 {
    7
}

fn default_linetype() -> String {
    "Continuous".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct FilterDto {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    layers: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    filters: Vec<FilterDto>,
}

/// Real document store reading and writing TOML files.
#[derive(Debug, Default)]
pub struct TomlDocumentStore;

impl DocumentStore for TomlDocumentStore {
    fn load(&self, path: &Path) -> Result<Document, DocumentError> {
        debug!("load document: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| DocumentError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let dto: DocumentDto = toml::from_str(&content).map_err(|e| DocumentError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        to_domain(dto, path)
    }

    fn save(&self, path: &Path, document: &Document) -> Result<(), DocumentError> {
        debug!("save document: {}", path.display());
        let dto = from_domain(document);
        let content = toml::to_string_pretty(&dto)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| DocumentError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| DocumentError::Write {
                path: path.to_path_buf(),
                source: e,
            })?;
        tmp.persist(path).map_err(|e| DocumentError::Write {
            path: path.to_path_buf(),
            source: e.error,
        })?;
        Ok(())
    }
}

fn to_domain(dto: DocumentDto, path: &Path) -> Result<Document, DocumentError> {
    let mut document = Document::new(dto.name);

    for layer in dto.layers {
        let record = LayerRecord {
            name: layer.name,
            color: layer.color,
            linetype: layer.linetype,
            frozen: layer.frozen,
            locked: layer.locked,
        };
        document
            .layers
            .insert_with_handle(LayerId(layer.handle), record)
            .map_err(|e| DocumentError::Invalid {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
    }

    let mut nodes = Vec::with_capacity(dto.filters.len());
    for filter in dto.filters {
        nodes.push(filter_to_domain(filter, path)?);
    }
    document.filters = FilterTree::new(nodes);

    Ok(document)
}

fn filter_to_domain(dto: FilterDto, path: &Path) -> Result<FilterNode, DocumentError> {
    let kind = match (dto.expression, dto.layers) {
        (Some(expr), None) => FilterKind::Expression(expr),
        (None, Some(ids)) => FilterKind::Group(ids.into_iter().map(LayerId).collect()),
        (Some(_), Some(_)) => {
            return Err(DocumentError::Invalid {
                path: path.to_path_buf(),
                message: format!(
                    "filter '{}' has both 'expression' and 'layers'",
                    dto.name
                ),
            })
        }
        (None, None) => {
            return Err(DocumentError::Invalid {
                path: path.to_path_buf(),
                message: format!(
                    "filter '{}' needs either 'expression' or 'layers'",
                    dto.name
                ),
            })
        }
    };

    let mut node = FilterNode {
        name: dto.name,
        kind,
        children: Vec::with_capacity(dto.filters.len()),
    };
    for child in dto.filters {
        node.children.push(filter_to_domain(child, path)?);
    }
    Ok(node)
}

fn from_domain(document: &Document) -> DocumentDto {
    DocumentDto {
        name: document.name.clone(),
        layers: document
            .layers
            .iter()
            .map(|(id, rec)| LayerDto {
                handle: id.0,
                name: rec.name.clone(),
                color: rec.color,
                linetype: rec.linetype.clone(),
                frozen: rec.frozen,
                locked: rec.locked,
            })
            .collect(),
        filters: document.filters.nodes.iter().map(filter_from_domain).collect(),
    }
}

fn filter_from_domain(node: &FilterNode) -> FilterDto {
    let (expression, layers) = match &node.kind {
        FilterKind::Expression(expr) => (Some(expr.clone()), None),
        FilterKind::Group(members) => (None, Some(members.iter().map(|id| id.0).collect())),
    };
    FilterDto {
        name: node.name.clone(),
        expression,
        layers,
        filters: node.children.iter().map(filter_from_domain).collect(),
    }
}
