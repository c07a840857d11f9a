//! Recursive merge of filter trees across documents.
//!
//! The merge walks the source tree depth-first and folds every source node
//! into the destination: existing destination nodes are matched by name and
//! left untouched, missing ones are created with their member ids remapped
//! into the destination's namespace. The destination is only ever appended
//! to; the result is a name-superset of what was there before.
//!
//! Record lookup and cloning stay outside this module, behind [`MergeHost`].
//! Host failures propagate unmodified.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::filter::{FilterKind, FilterNode, FilterTree};
use crate::domain::layer::{IdMap, LayerId};

/// Collaborator contract for the owning documents.
pub trait MergeHost {
    type Error: std::error::Error;

    /// Ids of the source-document layers referenced by this node: the
    /// group's members, or the records matching an expression filter.
    fn select_members(&mut self, node: &FilterNode) -> Result<BTreeSet<LayerId>, Self::Error>;

    /// Clone the given source layers into the destination document and
    /// return the source-to-destination id mapping. Called before the node
    /// is matched or created, and only for non-empty member sets.
    fn clone_members(&mut self, ids: &BTreeSet<LayerId>) -> Result<IdMap, Self::Error>;
}

/// What to do with a group member id the cloner produced no mapping for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedMembers {
    /// Omit the member from the created group (counted in [`MergeStats`]).
    #[default]
    Drop,
    /// Abort the merge before anything is committed.
    Fail,
}

impl FromStr for UnresolvedMembers {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop" => Ok(UnresolvedMembers::Drop),
            "fail" => Ok(UnresolvedMembers::Fail),
            other => Err(format!(
                "invalid unresolved-member policy '{other}' (expected 'drop' or 'fail')"
            )),
        }
    }
}

/// Counters reported back to the caller after a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub filters_created: usize,
    pub groups_created: usize,
    pub members_mapped: usize,
    pub members_dropped: usize,
}

#[derive(Error, Debug)]
pub enum MergeError<E: std::error::Error> {
    #[error(transparent)]
    Host(#[from] E),

    #[error("no destination mapping for layer {id} in group '{group}'")]
    UnresolvedMember { group: String, id: LayerId },
}

/// Merge `source`'s nodes into `dest`, appending what is missing.
///
/// The implicit roots are never matched; merging starts with the top-level
/// siblings. `dest` is mutated in place, `source` is read-only. On error the
/// destination tree may hold nodes appended so far; callers wanting
/// commit-or-nothing behavior merge into a working copy (see
/// `ImportService`).
pub fn merge_trees<H: MergeHost>(
    source: &FilterTree,
    dest: &mut FilterTree,
    host: &mut H,
    policy: UnresolvedMembers,
) -> Result<MergeStats, MergeError<H::Error>> {
    let mut stats = MergeStats::default();
    merge_children(&source.nodes, &mut dest.nodes, host, policy, &mut stats)?;
    debug!(
        filters = stats.filters_created,
        groups = stats.groups_created,
        mapped = stats.members_mapped,
        dropped = stats.members_dropped,
        "merge complete"
    );
    Ok(stats)
}

fn merge_children<H: MergeHost>(
    source: &[FilterNode],
    dest: &mut Vec<FilterNode>,
    host: &mut H,
    policy: UnresolvedMembers,
    stats: &mut MergeStats,
) -> Result<(), MergeError<H::Error>> {
    for src in source {
        // Referenced layers are cloned up front, whether or not a
        // same-named destination node already exists.
        let members = host.select_members(src)?;
        let idmap = if members.is_empty() {
            IdMap::default()
        } else {
            host.clone_members(&members)?
        };

        // First match wins on duplicate sibling names.
        let pos = match dest.iter().position(|d| d.name == src.name) {
            Some(existing) => existing,
            None => {
                dest.push(create_node(src, &idmap, policy, stats)?);
                dest.len() - 1
            }
        };

        merge_children(&src.children, &mut dest[pos].children, host, policy, stats)?;
    }
    Ok(())
}

fn create_node<E: std::error::Error>(
    src: &FilterNode,
    idmap: &IdMap,
    policy: UnresolvedMembers,
    stats: &mut MergeStats,
) -> Result<FilterNode, MergeError<E>> {
    match &src.kind {
        FilterKind::Group(members) => {
            let mut mapped = BTreeSet::new();
            for &id in members {
                match idmap.get(id) {
                    Some(dest_id) => {
                        mapped.insert(dest_id);
                        stats.members_mapped += 1;
                    }
                    None => match policy {
                        UnresolvedMembers::Drop => {
                            debug!(group = %src.name, %id, "dropping unresolved member");
                            stats.members_dropped += 1;
                        }
                        UnresolvedMembers::Fail => {
                            return Err(MergeError::UnresolvedMember {
                                group: src.name.clone(),
                                id,
                            })
                        }
                    },
                }
            }
            stats.groups_created += 1;
            Ok(FilterNode::group(&src.name, mapped))
        }
        // Expression text is self-contained predicate text, copied verbatim.
        FilterKind::Expression(text) => {
            stats.filters_created += 1;
            Ok(FilterNode::expression(&src.name, text.clone()))
        }
    }
}
