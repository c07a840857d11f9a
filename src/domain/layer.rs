//! Layer records and the handle-keyed layer table.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::domain::error::DomainError;

/// Handle of a layer record, meaningful only within its owning document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single layer definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRecord {
    pub name: String,
    pub color: i16,
    pub linetype: String,
    pub frozen: bool,
    pub locked: bool,
}

impl LayerRecord {
    /// New record with default drawing properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: 7,
            linetype: "Continuous".to_string(),
            frozen: false,
            locked: false,
        }
    }
}

/// Source-to-destination id mapping produced by cloning layer records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap(BTreeMap<LayerId, LayerId>);

impl IdMap {
    pub fn get(&self, source: LayerId) -> Option<LayerId> {
        self.0.get(&source).copied()
    }

    pub fn insert(&mut self, source: LayerId, dest: LayerId) {
        self.0.insert(source, dest);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerId, LayerId)> + '_ {
        self.0.iter().map(|(s, d)| (*s, *d))
    }
}

/// Handle-keyed store of layer records for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerTable {
    records: BTreeMap<LayerId, LayerRecord>,
    next_handle: u64,
}

impl LayerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under a freshly allocated handle.
    pub fn insert(&mut self, record: LayerRecord) -> LayerId {
        let id = LayerId(self.next_handle);
        self.next_handle += 1;
        self.records.insert(id, record);
        id
    }

    /// Insert a record under an explicit handle (document loading).
    pub fn insert_with_handle(
        &mut self,
        id: LayerId,
        record: LayerRecord,
    ) -> Result<(), DomainError> {
        if self.records.contains_key(&id) {
            return Err(DomainError::DuplicateHandle(id));
        }
        self.next_handle = self.next_handle.max(id.0 + 1);
        self.records.insert(id, record);
        Ok(())
    }

    pub fn get(&self, id: LayerId) -> Option<&LayerRecord> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.records.contains_key(&id)
    }

    /// First handle whose record carries the given name (exact match).
    pub fn find_by_name(&self, name: &str) -> Option<LayerId> {
        self.records
            .iter()
            .find(|(_, rec)| rec.name == name)
            .map(|(id, _)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &LayerRecord)> + '_ {
        self.records.iter().map(|(id, rec)| (*id, rec))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clone the given records from a source table into this one.
    ///
    /// Replace policy: a source record whose name already exists here keeps
    /// the existing destination handle and its content is overwritten with
    /// the source record. Ids absent from the source table are skipped and
    /// get no mapping.
    pub fn import_from(&mut self, source: &LayerTable, ids: &BTreeSet<LayerId>) -> IdMap {
        let mut map = IdMap::default();
        for &id in ids {
            let Some(record) = source.get(id) else {
                continue;
            };
            let dest_id = match self.find_by_name(&record.name) {
                Some(existing) => {
                    self.records.insert(existing, record.clone());
                    existing
                }
                None => self.insert(record.clone()),
            };
            map.insert(id, dest_id);
        }
        map
    }
}
