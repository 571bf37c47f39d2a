//! Sibling edge synthesis.
//!
//! Stored sibling edges are derived data: two people with identical,
//! non-empty parent sets get an edge automatically, and an edge whose
//! justifying parentage disappears is dissolved again. Manually recorded
//! half-sibling edges survive as long as their `shared_parent_id` is
//! still one of the pair's shared parents.

use std::collections::BTreeSet;

use kinship_core::PersonId;

use crate::store::FamilyTree;

/// What one synchronization pass changed, counted in edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub added: usize,
    pub removed: usize,
}

impl SyncOutcome {
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Resynchronize every sibling edge touching `person`.
///
/// Idempotent: a second pass over unchanged parentage is a no-op.
pub fn update_for(tree: &mut FamilyTree, person: PersonId) -> SyncOutcome {
    let my_parents: BTreeSet<PersonId> = tree.parents_of(person).into_iter().collect();

    // Everyone who shares a parent now, plus everyone an edge still
    // points at (whose justification may have vanished).
    let mut others: BTreeSet<PersonId> = tree.sibling_partners(person).into_iter().collect();
    for &parent in &my_parents {
        for child in tree.children_of(parent) {
            if child != person {
                others.insert(child);
            }
        }
    }

    let mut outcome = SyncOutcome::default();
    for other in others {
        let their_parents: BTreeSet<PersonId> = tree.parents_of(other).into_iter().collect();
        if !my_parents.is_empty() && my_parents == their_parents {
            if !tree.has_sibling_edge(person, other) {
                tree.push_sibling_rows(person, other, None);
                outcome.added += 1;
            }
        } else {
            let shared: Vec<PersonId> = my_parents.intersection(&their_parents).copied().collect();
            if tree.drop_unjustified_sibling_edge(person, other, &shared) {
                outcome.removed += 1;
            }
        }
    }

    if !outcome.is_noop() {
        tree.bump_version();
        tracing::debug!(
            person = %person,
            added = outcome.added,
            removed = outcome.removed,
            "sibling edges resynchronized"
        );
    }
    outcome
}
