//! The consistency sweep.
//!
//! Sibling edges are supposed to connect people of the same generation.
//! Earlier data imports and manual edits sometimes produced edges
//! between a person and their own ancestor, which made classification
//! report a sibling where an ancestor label was expected. The sweep
//! finds and removes such cross-generational edges.

use serde::Serialize;

use kinship_core::PersonId;
use kinship_store::FamilyTree;

/// One removed cross-generational sibling edge.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RemovedEdge {
    pub a: PersonId,
    pub b: PersonId,
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Serialize, Default)]
pub struct AuditReport {
    /// Sibling pairs examined.
    pub examined: usize,
    /// Edges removed because one endpoint is an ancestor of the other.
    pub removed: Vec<RemovedEdge>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Remove every sibling edge whose endpoints sit in each other's parent
/// chains, walking at most `max_depth` generations per endpoint.
///
/// Idempotent: a second sweep over the same tree removes nothing.
/// Cyclic parent data is logged inside the ancestor walk and treated as
/// not-an-ancestor past the cycle, so the sweep always terminates.
pub fn clean_cross_generational_siblings(tree: &mut FamilyTree, max_depth: usize) -> AuditReport {
    let pairs = tree.sibling_pairs();
    let mut report = AuditReport {
        examined: pairs.len(),
        removed: Vec::new(),
    };

    for (a, b) in pairs {
        let cross = tree.is_ancestor_of(a, b, max_depth) || tree.is_ancestor_of(b, a, max_depth);
        if cross && tree.remove_sibling_edge(a, b) {
            tracing::warn!(%a, %b, "removed cross-generational sibling edge");
            report.removed.push(RemovedEdge { a, b });
        }
    }
    report
}
