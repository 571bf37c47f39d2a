//! Blood-relatedness detection.
//!
//! Decides whether two people are blood-related within first-cousin range,
//! used to gate marriage creation. Deliberately bounded: second cousins
//! and deeper relations are not detected.

use kinship_core::PersonId;

use crate::graph::KinshipGraph;

/// Whether two people are blood-related within first-cousin range.
///
/// Symmetric, and `false` for self. Malformed data (unknown ids, missing
/// parent rows) degrades to `false`.
pub fn blood_related(graph: &KinshipGraph, a: PersonId, b: PersonId) -> bool {
    relationship_description(graph, a, b).is_some()
}

/// The marriage gate: blood relatives cannot marry.
pub fn can_marry(graph: &KinshipGraph, a: PersonId, b: PersonId) -> bool {
    !blood_related(graph, a, b)
}

/// Diagnostic naming of the blood-relation rule that fired, if any.
///
/// Checked in order, first match wins: direct parent/child, shared-parent
/// siblings, grandparent/grandchild, uncle/aunt and nephew/niece, first
/// cousins.
pub fn relationship_description(
    graph: &KinshipGraph,
    a: PersonId,
    b: PersonId,
) -> Option<&'static str> {
    if a == b {
        return None;
    }
    let (i, j) = (graph.index_of(a)?, graph.index_of(b)?);

    if graph.parents(i).contains(&j) || graph.parents(j).contains(&i) {
        return Some("direct parent/child");
    }
    if !graph.shared_parents(i, j).is_empty() || graph.blood_siblings(i).contains(&j) {
        return Some("siblings sharing a parent");
    }
    if grandparents(graph, i).contains(&j) || grandparents(graph, j).contains(&i) {
        return Some("grandparent/grandchild");
    }
    if parent_siblings(graph, i).contains(&j) || parent_siblings(graph, j).contains(&i) {
        return Some("uncle/aunt and nephew/niece");
    }
    if first_cousins(graph, i, j) {
        return Some("first cousins");
    }
    None
}

/// Parents of parents, excluding the person itself (cycle guard).
fn grandparents(graph: &KinshipGraph, person: usize) -> Vec<usize> {
    let mut out = Vec::new();
    for &p in graph.parents(person) {
        for &gp in graph.parents(p) {
            if gp != person && !out.contains(&gp) {
                out.push(gp);
            }
        }
    }
    out
}

/// Blood siblings of a person's parents.
fn parent_siblings(graph: &KinshipGraph, person: usize) -> Vec<usize> {
    let mut out = Vec::new();
    for &p in graph.parents(person) {
        for s in graph.blood_siblings(p) {
            if s != person && !out.contains(&s) {
                out.push(s);
            }
        }
    }
    out
}

/// First cousins: distinct parents who are blood siblings of each other.
fn first_cousins(graph: &KinshipGraph, i: usize, j: usize) -> bool {
    for &pi in graph.parents(i) {
        for &pj in graph.parents(j) {
            if pi != pj && graph.blood_siblings(pi).contains(&pj) {
                return true;
            }
        }
    }
    false
}
