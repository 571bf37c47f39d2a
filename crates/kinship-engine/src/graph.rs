//! In-memory family graph for relationship classification.
//!
//! Converts a `TreeSnapshot` into a compact dense-index adjacency view so
//! the classifier and blood detector traverse plain `usize` indices instead
//! of chasing ids. Mirrored relation rows collapse into one link per
//! direction; rows referencing unknown people are dropped.

use std::collections::HashMap;

use chrono::NaiveDate;

use kinship_core::{Gender, PersonId, RelationKind, TreeSnapshot};

/// Compact person metadata stored in the in-memory graph.
#[derive(Debug, Clone)]
pub struct PersonNode {
    /// Dense index (0..N-1) for O(1) lookup.
    pub index: usize,
    /// Original person ID.
    pub id: PersonId,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub deceased: bool,
}

impl PersonNode {
    pub fn is_deceased(&self) -> bool {
        self.deceased || self.date_of_death.is_some()
    }

    pub fn died_before(&self, date: NaiveDate) -> bool {
        matches!(self.date_of_death, Some(d) if d < date)
    }
}

/// A spouse link with its marriage status flags.
#[derive(Debug, Clone, Copy)]
pub struct SpouseLink {
    pub target: usize,
    pub is_ex: bool,
    pub is_deceased: bool,
}

/// A stored sibling edge, optionally anchored to a specific shared parent.
#[derive(Debug, Clone, Copy)]
pub struct SiblingLink {
    pub target: usize,
    pub shared_parent: Option<usize>,
}

/// Which spouse links a query should see.
///
/// `Current` means not dissolved (`is_ex == false`); a marriage ended by a
/// spouse's death is still current for in-law and step derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpouseFilter {
    Current,
    Ex,
    All,
}

/// The read-only adjacency view over one family tree snapshot.
pub struct KinshipGraph {
    /// All people, indexed by dense index.
    pub nodes: Vec<PersonNode>,
    parents: Vec<Vec<usize>>,
    children: Vec<Vec<usize>>,
    spouses: Vec<Vec<SpouseLink>>,
    siblings: Vec<Vec<SiblingLink>>,
    /// Map from person ID to dense index.
    pub node_index: HashMap<PersonId, usize>,
}

impl KinshipGraph {
    /// Build the adjacency view from a snapshot.
    pub fn from_snapshot(snapshot: &TreeSnapshot) -> Self {
        let mut node_index = HashMap::with_capacity(snapshot.persons.len());
        let mut nodes = Vec::with_capacity(snapshot.persons.len());

        for (i, person) in snapshot.persons.iter().enumerate() {
            node_index.insert(person.id, i);
            nodes.push(PersonNode {
                index: i,
                id: person.id,
                gender: person.gender,
                date_of_birth: person.date_of_birth,
                date_of_death: person.date_of_death,
                deceased: person.deceased,
            });
        }

        let n = nodes.len();
        let mut parents = vec![Vec::new(); n];
        let mut children = vec![Vec::new(); n];
        let mut spouses: Vec<Vec<SpouseLink>> = vec![Vec::new(); n];
        let mut siblings: Vec<Vec<SiblingLink>> = vec![Vec::new(); n];

        for row in &snapshot.relations {
            let (Some(&person), Some(&relative)) = (
                node_index.get(&row.person_id),
                node_index.get(&row.relative_id),
            ) else {
                tracing::warn!(
                    person_id = %row.person_id,
                    relative_id = %row.relative_id,
                    "Dropping relation row with unknown endpoint"
                );
                continue;
            };
            if person == relative {
                continue;
            }

            match row.kind {
                RelationKind::Parent => {
                    // The relative is the person's parent.
                    push_unique(&mut parents[person], relative);
                    push_unique(&mut children[relative], person);
                }
                RelationKind::Child => {
                    push_unique(&mut children[person], relative);
                    push_unique(&mut parents[relative], person);
                }
                RelationKind::Spouse => {
                    if !spouses[person].iter().any(|l| l.target == relative) {
                        spouses[person].push(SpouseLink {
                            target: relative,
                            is_ex: row.is_ex,
                            is_deceased: row.is_deceased,
                        });
                    }
                }
                RelationKind::Sibling => {
                    if !siblings[person].iter().any(|l| l.target == relative) {
                        let shared_parent =
                            row.shared_parent_id.and_then(|id| node_index.get(&id).copied());
                        siblings[person].push(SiblingLink {
                            target: relative,
                            shared_parent,
                        });
                    }
                }
            }
        }

        Self {
            nodes,
            parents,
            children,
            spouses,
            siblings,
            node_index,
        }
    }

    pub fn index_of(&self, id: PersonId) -> Option<usize> {
        self.node_index.get(&id).copied()
    }

    pub fn person(&self, index: usize) -> &PersonNode {
        &self.nodes[index]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Parent indices of a person (at most 2 in valid data).
    pub fn parents(&self, index: usize) -> &[usize] {
        &self.parents[index]
    }

    pub fn children(&self, index: usize) -> &[usize] {
        &self.children[index]
    }

    /// Spouse indices matching the filter.
    pub fn spouses(&self, index: usize, filter: SpouseFilter) -> Vec<usize> {
        self.spouses[index]
            .iter()
            .filter(|l| match filter {
                SpouseFilter::Current => !l.is_ex,
                SpouseFilter::Ex => l.is_ex,
                SpouseFilter::All => true,
            })
            .map(|l| l.target)
            .collect()
    }

    /// The raw spouse link from `from` to `to`, if one is stored.
    pub fn spouse_link(&self, from: usize, to: usize) -> Option<SpouseLink> {
        self.spouses[from].iter().copied().find(|l| l.target == to)
    }

    /// Stored sibling edges of a person.
    pub fn sibling_links(&self, index: usize) -> &[SiblingLink] {
        &self.siblings[index]
    }

    pub fn has_sibling_edge(&self, a: usize, b: usize) -> bool {
        self.siblings[a].iter().any(|l| l.target == b)
            || self.siblings[b].iter().any(|l| l.target == a)
    }

    /// Parents both people share.
    pub fn shared_parents(&self, a: usize, b: usize) -> Vec<usize> {
        self.parents[a]
            .iter()
            .copied()
            .filter(|p| self.parents[b].contains(p))
            .collect()
    }

    /// Blood siblings of a person: everyone sharing at least one parent,
    /// plus stored sibling edges where parentage data is missing on either
    /// side (a stored edge with no recorded parents is trusted; an edge
    /// between two fully-parented people with zero shared parents is a
    /// step pair and excluded).
    pub fn blood_siblings(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        for &p in &self.parents[index] {
            for &c in &self.children[p] {
                if c != index {
                    push_unique(&mut out, c);
                }
            }
        }
        for link in &self.siblings[index] {
            let other = link.target;
            if self.parents[index].is_empty() || self.parents[other].is_empty() {
                push_unique(&mut out, other);
            }
        }
        out
    }
}

fn push_unique(list: &mut Vec<usize>, value: usize) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinship_core::{Person, RelationRecord};

    fn person(first: &str) -> Person {
        Person {
            id: PersonId::new(),
            first_name: first.to_string(),
            last_name: "Test".to_string(),
            gender: None,
            date_of_birth: None,
            date_of_death: None,
            deceased: false,
        }
    }

    fn parent_rows(child: PersonId, parent: PersonId) -> Vec<RelationRecord> {
        vec![
            RelationRecord::new(child, parent, RelationKind::Parent),
            RelationRecord::new(parent, child, RelationKind::Child),
        ]
    }

    #[test]
    fn builds_parent_and_child_adjacency_from_mirrored_rows() {
        let dad = person("John");
        let kid = person("Alice");
        let mut relations = parent_rows(kid.id, dad.id);
        // Duplicate rows must not duplicate links.
        relations.extend(parent_rows(kid.id, dad.id));

        let snapshot = TreeSnapshot {
            version: 1,
            persons: vec![dad.clone(), kid.clone()],
            relations,
        };
        let graph = KinshipGraph::from_snapshot(&snapshot);

        let kid_idx = graph.index_of(kid.id).unwrap();
        let dad_idx = graph.index_of(dad.id).unwrap();
        assert_eq!(graph.parents(kid_idx), &[dad_idx]);
        assert_eq!(graph.children(dad_idx), &[kid_idx]);
        assert!(graph.parents(dad_idx).is_empty());
    }

    #[test]
    fn drops_rows_with_unknown_endpoints() {
        let a = person("A");
        let ghost = PersonId::new();
        let snapshot = TreeSnapshot {
            version: 1,
            relations: vec![RelationRecord::new(a.id, ghost, RelationKind::Parent)],
            persons: vec![a.clone()],
        };
        let graph = KinshipGraph::from_snapshot(&snapshot);
        assert!(graph.parents(graph.index_of(a.id).unwrap()).is_empty());
    }

    #[test]
    fn spouse_filter_distinguishes_current_and_ex() {
        let a = person("A");
        let b = person("B");
        let c = person("C");
        let mut ex_row = RelationRecord::new(a.id, b.id, RelationKind::Spouse);
        ex_row.is_ex = true;
        let cur_row = RelationRecord::new(a.id, c.id, RelationKind::Spouse);

        let snapshot = TreeSnapshot {
            version: 1,
            persons: vec![a.clone(), b.clone(), c.clone()],
            relations: vec![ex_row, cur_row],
        };
        let graph = KinshipGraph::from_snapshot(&snapshot);
        let ai = graph.index_of(a.id).unwrap();
        let bi = graph.index_of(b.id).unwrap();
        let ci = graph.index_of(c.id).unwrap();

        assert_eq!(graph.spouses(ai, SpouseFilter::Current), vec![ci]);
        assert_eq!(graph.spouses(ai, SpouseFilter::Ex), vec![bi]);
        assert_eq!(graph.spouses(ai, SpouseFilter::All).len(), 2);
    }

    #[test]
    fn deceased_marriage_is_still_current() {
        let a = person("A");
        let b = person("B");
        let mut row = RelationRecord::new(a.id, b.id, RelationKind::Spouse);
        row.is_deceased = true;

        let snapshot = TreeSnapshot {
            version: 1,
            persons: vec![a.clone(), b.clone()],
            relations: vec![row],
        };
        let graph = KinshipGraph::from_snapshot(&snapshot);
        let ai = graph.index_of(a.id).unwrap();
        assert_eq!(graph.spouses(ai, SpouseFilter::Current).len(), 1);
    }

    #[test]
    fn shared_parents_and_blood_siblings() {
        let dad = person("John");
        let mom = person("Jane");
        let alice = person("Alice");
        let charlie = person("Charlie");
        let michael = person("Michael"); // shares only dad with alice

        let mut relations = Vec::new();
        relations.extend(parent_rows(alice.id, dad.id));
        relations.extend(parent_rows(alice.id, mom.id));
        relations.extend(parent_rows(charlie.id, dad.id));
        relations.extend(parent_rows(charlie.id, mom.id));
        relations.extend(parent_rows(michael.id, dad.id));

        let snapshot = TreeSnapshot {
            version: 1,
            persons: vec![
                dad.clone(),
                mom.clone(),
                alice.clone(),
                charlie.clone(),
                michael.clone(),
            ],
            relations,
        };
        let graph = KinshipGraph::from_snapshot(&snapshot);
        let ai = graph.index_of(alice.id).unwrap();
        let ci = graph.index_of(charlie.id).unwrap();
        let mi = graph.index_of(michael.id).unwrap();

        assert_eq!(graph.shared_parents(ai, ci).len(), 2);
        assert_eq!(graph.shared_parents(ai, mi).len(), 1);
        assert_eq!(graph.shared_parents(ci, mi).len(), 1);

        let mut sibs = graph.blood_siblings(ai);
        sibs.sort_unstable();
        let mut expected = vec![ci, mi];
        expected.sort_unstable();
        assert_eq!(sibs, expected);
    }

    #[test]
    fn sibling_edge_between_parented_people_without_shared_parent_is_not_blood() {
        let pa = person("ParentA");
        let pb = person("ParentB");
        let a = person("A");
        let b = person("B");

        let mut relations = Vec::new();
        relations.extend(parent_rows(a.id, pa.id));
        relations.extend(parent_rows(b.id, pb.id));
        relations.push(RelationRecord::new(a.id, b.id, RelationKind::Sibling));
        relations.push(RelationRecord::new(b.id, a.id, RelationKind::Sibling));

        let snapshot = TreeSnapshot {
            version: 1,
            persons: vec![pa.clone(), pb.clone(), a.clone(), b.clone()],
            relations,
        };
        let graph = KinshipGraph::from_snapshot(&snapshot);
        let ai = graph.index_of(a.id).unwrap();
        let bi = graph.index_of(b.id).unwrap();

        assert!(graph.has_sibling_edge(ai, bi));
        assert!(graph.blood_siblings(ai).is_empty());
    }
}
