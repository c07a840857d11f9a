//! A drawing document: its layer table and filter tree.

use crate::domain::filter::FilterTree;
use crate::domain::layer::LayerTable;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Optional display name, shown in tree output.
    pub name: Option<String>,
    pub layers: LayerTable,
    pub filters: FilterTree,
}

impl Document {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            layers: LayerTable::new(),
            filters: FilterTree::default(),
        }
    }
}
