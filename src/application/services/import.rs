//! Filter import service
//!
//! Orchestrates one import: load source and destination documents, merge
//! the source filter tree into the destination (cloning referenced layers),
//! replace the destination tree wholesale, and commit with an atomic save.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{
    merge_trees, Document, DomainError, Expression, FilterKind, FilterNode, IdMap, LayerId,
    LayerTable, MergeError, MergeHost, MergeStats, UnresolvedMembers,
};
use crate::infrastructure::traits::DocumentStore;

/// Outcome of one import, for user-facing reporting.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub stats: MergeStats,
}

/// Service merging filter trees between documents.
pub struct ImportService {
    store: Arc<dyn DocumentStore>,
    policy: UnresolvedMembers,
}

impl ImportService {
    pub fn new(store: Arc<dyn DocumentStore>, policy: UnresolvedMembers) -> Self {
        Self { store, policy }
    }

    /// Merge filters from `source_path` into `dest_path`.
    ///
    /// The whole import is commit-or-nothing: the merge runs against an
    /// in-memory working copy and the destination file is only replaced
    /// (atomically) once everything succeeded.
    pub fn import(&self, dest_path: &Path, source_path: &Path) -> ApplicationResult<ImportReport> {
        debug!(
            "import: source={}, dest={}",
            source_path.display(),
            dest_path.display()
        );
        let source = self.load(source_path)?;
        let mut dest = self.load(dest_path)?;

        let mut filters = dest.filters.clone();
        let mut host = DocumentHost {
            source: &source,
            dest_layers: &mut dest.layers,
        };
        let stats = merge_trees(&source.filters, &mut filters, &mut host, self.policy)
            .map_err(|e| match e {
                MergeError::Host(domain) => ApplicationError::Domain(domain),
                MergeError::UnresolvedMember { group, id } => {
                    ApplicationError::UnresolvedMember { group, id }
                }
            })?;

        // Wholesale replacement: the stored tree is swapped once, after all
        // mutations, mirroring how the merged tree is handed back to the
        // document in one assignment.
        dest.filters = filters;
        self.store
            .save(dest_path, &dest)
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("save {}", dest_path.display()),
                source: Box::new(e),
            })?;

        Ok(ImportReport {
            source: source_path.to_path_buf(),
            dest: dest_path.to_path_buf(),
            stats,
        })
    }

    /// Merge filters from the configured default template into `dest_path`.
    ///
    /// An unset or missing template is a user-facing condition, reported
    /// before any document is touched.
    pub fn import_default_template(
        &self,
        dest_path: &Path,
        settings: &Settings,
    ) -> ApplicationResult<ImportReport> {
        let template = settings
            .default_template
            .as_ref()
            .ok_or(ApplicationError::TemplateNotConfigured)?;
        if !template.exists() {
            return Err(ApplicationError::TemplateMissing(template.clone()));
        }
        self.import(dest_path, template)
    }

    fn load(&self, path: &Path) -> ApplicationResult<Document> {
        self.store
            .load(path)
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("load {}", path.display()),
                source: Box::new(e),
            })
    }
}

/// Merge host backed by the two documents' layer tables.
///
/// Member discovery runs against the source table; cloning copies records
/// into the destination table with the replace-by-name policy.
struct DocumentHost<'a> {
    source: &'a Document,
    dest_layers: &'a mut LayerTable,
}

impl MergeHost for DocumentHost<'_> {
    type Error = DomainError;

    fn select_members(&mut self, node: &FilterNode) -> Result<BTreeSet<LayerId>, DomainError> {
        match &node.kind {
            FilterKind::Group(ids) => Ok(ids
                .iter()
                .copied()
                .filter(|id| self.source.layers.contains(*id))
                .collect()),
            FilterKind::Expression(text) => {
                // Container nodes may carry an empty expression; they select
                // nothing.
                if text.trim().is_empty() {
                    return Ok(BTreeSet::new());
                }
                let expr = Expression::parse(text).map_err(|e| DomainError::InvalidExpression {
                    filter: node.name.clone(),
                    source: e,
                })?;
                Ok(self
                    .source
                    .layers
                    .iter()
                    .filter(|(_, record)| expr.matches(record))
                    .map(|(id, _)| id)
                    .collect())
            }
        }
    }

    fn clone_members(&mut self, ids: &BTreeSet<LayerId>) -> Result<IdMap, DomainError> {
        Ok(self.dest_layers.import_from(&self.source.layers, ids))
    }
}
