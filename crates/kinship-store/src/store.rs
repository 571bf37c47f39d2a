//! The mutable family tree store.
//!
//! Holds Person rows plus mirrored RelationRecord rows and validates
//! every mutation up front: parent caps, ancestor cycles, the
//! single-current-spouse rule, the blood-relative marriage gate, and
//! sibling-edge justification. Once a mutation is accepted the sibling
//! synthesizer runs for every person whose parentage changed, so stored
//! sibling edges always track the parent rows.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use kinship_core::{Person, PersonId, RelationKind, RelationRecord, TreeSnapshot};
use kinship_engine::blood;
use kinship_engine::graph::KinshipGraph;

use crate::error::{Result, StoreError};
use crate::synthesizer::{self, SyncOutcome};

/// One family tree with all of its people and relationship rows.
#[derive(Debug, Clone, Default)]
pub struct FamilyTree {
    persons: HashMap<PersonId, Person>,
    relations: Vec<RelationRecord>,
    version: u64,
}

impl FamilyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tree from a snapshot, trusting its contents.
    ///
    /// Used by the offline auditor, which sweeps previously persisted
    /// data rather than data this store validated.
    pub fn from_snapshot(snapshot: TreeSnapshot) -> Self {
        Self {
            persons: snapshot.persons.into_iter().map(|p| (p.id, p)).collect(),
            relations: snapshot.relations,
            version: snapshot.version,
        }
    }

    /// Export the current state for the read side.
    pub fn snapshot(&self) -> TreeSnapshot {
        let mut persons: Vec<Person> = self.persons.values().cloned().collect();
        persons.sort_by_key(|p| p.id);
        TreeSnapshot {
            version: self.version,
            persons,
            relations: self.relations.clone(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.persons.get(&id)
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    // ── Accessors over relation rows ──────────────────────────────

    pub fn parents_of(&self, id: PersonId) -> Vec<PersonId> {
        self.relatives_of(id, RelationKind::Parent)
    }

    pub fn children_of(&self, id: PersonId) -> Vec<PersonId> {
        self.relatives_of(id, RelationKind::Child)
    }

    /// The at-most-one spouse whose marriage is neither dissolved nor
    /// ended by death.
    pub fn current_spouse_of(&self, id: PersonId) -> Option<PersonId> {
        self.relations
            .iter()
            .find(|r| r.person_id == id && r.is_current_spouse())
            .map(|r| r.relative_id)
    }

    /// Every stored sibling edge, one entry per unordered pair.
    pub fn sibling_pairs(&self) -> Vec<(PersonId, PersonId)> {
        let mut pairs = BTreeSet::new();
        for r in &self.relations {
            if r.kind == RelationKind::Sibling {
                let (a, b) = if r.person_id < r.relative_id {
                    (r.person_id, r.relative_id)
                } else {
                    (r.relative_id, r.person_id)
                };
                pairs.insert((a, b));
            }
        }
        pairs.into_iter().collect()
    }

    fn relatives_of(&self, id: PersonId, kind: RelationKind) -> Vec<PersonId> {
        self.relations
            .iter()
            .filter(|r| r.person_id == id && r.kind == kind)
            .map(|r| r.relative_id)
            .collect()
    }

    fn shared_parents(&self, a: PersonId, b: PersonId) -> Vec<PersonId> {
        let pb: BTreeSet<_> = self.parents_of(b).into_iter().collect();
        self.parents_of(a)
            .into_iter()
            .filter(|p| pb.contains(p))
            .collect()
    }

    /// Whether `ancestor` appears anywhere in `descendant`'s parent
    /// chains, walking at most `max_depth` generations. Cyclic parent
    /// data is logged and treated as not-an-ancestor past the point of
    /// the cycle.
    pub fn is_ancestor_of(
        &self,
        ancestor: PersonId,
        descendant: PersonId,
        max_depth: usize,
    ) -> bool {
        let mut visited: HashSet<PersonId> = HashSet::from([descendant]);
        let mut frontier = vec![descendant];
        for _ in 0..max_depth {
            if frontier.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for node in frontier {
                for parent in self.parents_of(node) {
                    if parent == ancestor {
                        return true;
                    }
                    if visited.insert(parent) {
                        next.push(parent);
                    } else if parent == descendant {
                        tracing::warn!(person = %descendant, "cycle in parent chain");
                    }
                }
            }
            frontier = next;
        }
        false
    }

    // ── Mutations ─────────────────────────────────────────────────

    pub fn add_person(&mut self, person: Person) -> Result<()> {
        if self.persons.contains_key(&person.id) {
            return Err(StoreError::DuplicatePerson(person.id));
        }
        self.persons.insert(person.id, person);
        self.version += 1;
        Ok(())
    }

    /// Record `parent` as a parent of `child` and resynchronize the
    /// child's sibling edges.
    pub fn add_parent(&mut self, child: PersonId, parent: PersonId) -> Result<SyncOutcome> {
        self.require(child)?;
        self.require(parent)?;
        if child == parent {
            return Err(StoreError::SelfRelation);
        }
        let existing = self.parents_of(child);
        if existing.contains(&parent) {
            return Ok(SyncOutcome::default());
        }
        if existing.len() >= 2 {
            return Err(StoreError::ParentCapExceeded { child });
        }
        // A person's parent can never be their own descendant.
        if self.is_ancestor_of(child, parent, self.persons.len()) {
            return Err(StoreError::AncestorCycle { parent, child });
        }

        self.relations
            .push(RelationRecord::new(child, parent, RelationKind::Parent));
        self.relations
            .push(RelationRecord::new(parent, child, RelationKind::Child));
        self.version += 1;
        Ok(synthesizer::update_for(self, child))
    }

    /// Remove a recorded parent edge and resynchronize sibling edges,
    /// which may dissolve edges this parent justified.
    pub fn remove_parent(&mut self, child: PersonId, parent: PersonId) -> Result<SyncOutcome> {
        self.require(child)?;
        self.require(parent)?;
        let before = self.relations.len();
        self.relations.retain(|r| {
            !(r.kind == RelationKind::Parent && r.person_id == child && r.relative_id == parent)
                && !(r.kind == RelationKind::Child
                    && r.person_id == parent
                    && r.relative_id == child)
        });
        if self.relations.len() == before {
            return Ok(SyncOutcome::default());
        }
        self.version += 1;
        Ok(synthesizer::update_for(self, child))
    }

    /// Record a marriage. Enforces the single-current-spouse rule and
    /// the blood-relative gate.
    pub fn add_spouse(&mut self, a: PersonId, b: PersonId) -> Result<()> {
        self.require(a)?;
        self.require(b)?;
        if a == b {
            return Err(StoreError::SelfRelation);
        }
        if self.current_spouse_of(a).is_some() {
            return Err(StoreError::SpouseConflict(a));
        }
        if self.current_spouse_of(b).is_some() {
            return Err(StoreError::SpouseConflict(b));
        }
        let graph = KinshipGraph::from_snapshot(&self.snapshot());
        if let Some(rule) = blood::relationship_description(&graph, a, b) {
            return Err(StoreError::BloodRelatives {
                rule: rule.to_string(),
            });
        }

        self.relations
            .push(RelationRecord::new(a, b, RelationKind::Spouse));
        self.relations
            .push(RelationRecord::new(b, a, RelationKind::Spouse));
        self.version += 1;
        Ok(())
    }

    /// Dissolve a current marriage: both mirrored rows become ex-spouse
    /// rows. Marriages already ended (by divorce or death) cannot be
    /// divorced again.
    pub fn divorce(&mut self, a: PersonId, b: PersonId) -> Result<()> {
        self.require(a)?;
        self.require(b)?;
        let mut touched = false;
        for r in &mut self.relations {
            if r.is_current_spouse() && Self::joins(r, a, b) {
                r.is_ex = true;
                touched = true;
            }
        }
        if !touched {
            return Err(StoreError::NoSuchMarriage { a, b });
        }
        self.version += 1;
        Ok(())
    }

    /// Record a death. Current marriages become widowed (`is_deceased`),
    /// never ex: the survivor keeps the "Late" spouse relation and may
    /// remarry.
    pub fn record_death(&mut self, id: PersonId, date: Option<NaiveDate>) -> Result<()> {
        let person = self
            .persons
            .get_mut(&id)
            .ok_or(StoreError::UnknownPerson(id))?;
        person.deceased = true;
        if date.is_some() {
            person.date_of_death = date;
        }
        for r in &mut self.relations {
            if r.is_current_spouse() && (r.person_id == id || r.relative_id == id) {
                r.is_deceased = true;
            }
        }
        self.version += 1;
        Ok(())
    }

    /// Manually record a sibling edge, normally only needed for
    /// half-siblings (the synthesizer covers full siblings).
    ///
    /// The pair must share at least one recorded parent. When either
    /// endpoint belongs to more than one half-sibling group the edge is
    /// ambiguous and must carry a `shared_parent_id`.
    pub fn add_sibling_edge(
        &mut self,
        a: PersonId,
        b: PersonId,
        shared_parent_id: Option<PersonId>,
    ) -> Result<()> {
        self.require(a)?;
        self.require(b)?;
        if a == b {
            return Err(StoreError::SelfRelation);
        }
        let shared = self.shared_parents(a, b);
        if shared.is_empty() {
            return Err(StoreError::NotSiblings { a, b });
        }
        if let Some(parent) = shared_parent_id {
            if !shared.contains(&parent) {
                return Err(StoreError::InvalidSharedParent { a, b, parent });
            }
        } else if shared.len() == 1
            && (self.half_sibling_anchors(a).len() > 1 || self.half_sibling_anchors(b).len() > 1)
        {
            return Err(StoreError::AmbiguousSiblingEdge { a, b });
        }

        // Half-sibling edges are always anchored so the synthesizer can
        // tell them apart from edges it created itself.
        let shared_parent_id = match shared_parent_id {
            Some(p) => Some(p),
            None if shared.len() == 1 => Some(shared[0]),
            None => None,
        };

        if self.has_sibling_edge(a, b) {
            for r in &mut self.relations {
                if r.kind == RelationKind::Sibling && Self::joins(r, a, b) {
                    r.shared_parent_id = shared_parent_id;
                }
            }
        } else {
            self.push_sibling_rows(a, b, shared_parent_id);
        }
        self.version += 1;
        Ok(())
    }

    /// Drop a stored sibling edge (both mirrored rows). Returns whether
    /// anything was removed.
    pub fn remove_sibling_edge(&mut self, a: PersonId, b: PersonId) -> bool {
        let before = self.relations.len();
        self.relations
            .retain(|r| !(r.kind == RelationKind::Sibling && Self::joins(r, a, b)));
        let removed = self.relations.len() != before;
        if removed {
            self.version += 1;
        }
        removed
    }

    // ── Helpers for the synthesizer ───────────────────────────────

    pub fn has_sibling_edge(&self, a: PersonId, b: PersonId) -> bool {
        self.relations
            .iter()
            .any(|r| r.kind == RelationKind::Sibling && Self::joins(r, a, b))
    }

    pub(crate) fn sibling_partners(&self, id: PersonId) -> Vec<PersonId> {
        self.relatives_of(id, RelationKind::Sibling)
    }

    pub(crate) fn push_sibling_rows(
        &mut self,
        a: PersonId,
        b: PersonId,
        shared_parent_id: Option<PersonId>,
    ) {
        for (x, y) in [(a, b), (b, a)] {
            let mut row = RelationRecord::new(x, y, RelationKind::Sibling);
            row.shared_parent_id = shared_parent_id;
            self.relations.push(row);
        }
    }

    /// Remove the sibling edge between the pair unless it carries a
    /// `shared_parent_id` that is still one of the pair's shared parents.
    /// Returns whether rows were dropped.
    pub(crate) fn drop_unjustified_sibling_edge(
        &mut self,
        a: PersonId,
        b: PersonId,
        shared: &[PersonId],
    ) -> bool {
        let keep = self.relations.iter().any(|r| {
            r.kind == RelationKind::Sibling
                && Self::joins(r, a, b)
                && matches!(r.shared_parent_id, Some(p) if shared.contains(&p))
        });
        if keep {
            return false;
        }
        let before = self.relations.len();
        self.relations
            .retain(|r| !(r.kind == RelationKind::Sibling && Self::joins(r, a, b)));
        self.relations.len() != before
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    // ── Internal ──────────────────────────────────────────────────

    fn require(&self, id: PersonId) -> Result<()> {
        if self.persons.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::UnknownPerson(id))
        }
    }

    fn joins(r: &RelationRecord, a: PersonId, b: PersonId) -> bool {
        (r.person_id == a && r.relative_id == b) || (r.person_id == b && r.relative_id == a)
    }

    /// The distinct parents anchoring this person's half-sibling
    /// relationships. More than one anchor means a bare sibling edge to
    /// a half-sibling would be ambiguous.
    fn half_sibling_anchors(&self, id: PersonId) -> Vec<PersonId> {
        let mine: BTreeSet<_> = self.parents_of(id).into_iter().collect();
        let mut anchors = BTreeSet::new();
        for &parent in &mine {
            for child in self.children_of(parent) {
                if child == id {
                    continue;
                }
                let theirs: BTreeSet<_> = self.parents_of(child).into_iter().collect();
                let shared: Vec<_> = mine.intersection(&theirs).copied().collect();
                if shared.len() == 1 && (mine != theirs) {
                    anchors.insert(shared[0]);
                }
            }
        }
        anchors.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinship_core::{Gender, Relation, SiblingKind};
    use kinship_engine::RelationshipClassifier;

    fn person(first: &str) -> Person {
        Person {
            id: PersonId::new(),
            first_name: first.to_string(),
            last_name: "Test".to_string(),
            gender: Some(Gender::Male),
            date_of_birth: None,
            date_of_death: None,
            deceased: false,
        }
    }

    fn add(tree: &mut FamilyTree, first: &str) -> PersonId {
        let p = person(first);
        let id = p.id;
        tree.add_person(p).unwrap();
        id
    }

    #[test]
    fn duplicate_person_rejected() {
        let mut tree = FamilyTree::new();
        let p = person("John");
        let dup = p.clone();
        tree.add_person(p).unwrap();
        assert!(matches!(
            tree.add_person(dup),
            Err(StoreError::DuplicatePerson(_))
        ));
    }

    #[test]
    fn parent_cap_is_two() {
        let mut tree = FamilyTree::new();
        let child = add(&mut tree, "Child");
        let p1 = add(&mut tree, "P1");
        let p2 = add(&mut tree, "P2");
        let p3 = add(&mut tree, "P3");

        tree.add_parent(child, p1).unwrap();
        tree.add_parent(child, p2).unwrap();
        assert!(matches!(
            tree.add_parent(child, p3),
            Err(StoreError::ParentCapExceeded { .. })
        ));

        // Re-adding an existing parent is a no-op, not a cap violation.
        let outcome = tree.add_parent(child, p1).unwrap();
        assert_eq!(outcome.added, 0);
        assert_eq!(tree.parents_of(child).len(), 2);
    }

    #[test]
    fn ancestor_cycle_rejected() {
        let mut tree = FamilyTree::new();
        let grandpa = add(&mut tree, "Grandpa");
        let dad = add(&mut tree, "Dad");
        let me = add(&mut tree, "Me");

        tree.add_parent(dad, grandpa).unwrap();
        tree.add_parent(me, dad).unwrap();

        assert!(matches!(
            tree.add_parent(grandpa, me),
            Err(StoreError::AncestorCycle { .. })
        ));
        assert!(matches!(
            tree.add_parent(me, me),
            Err(StoreError::SelfRelation)
        ));
    }

    #[test]
    fn full_siblings_synthesized_from_matching_parents() {
        let mut tree = FamilyTree::new();
        let john = add(&mut tree, "John");
        let jane = add(&mut tree, "Jane");
        let alice = add(&mut tree, "Alice");
        let bob = add(&mut tree, "Bob");

        tree.add_parent(alice, john).unwrap();
        tree.add_parent(alice, jane).unwrap();
        tree.add_parent(bob, john).unwrap();
        assert!(!tree.has_sibling_edge(alice, bob));

        let outcome = tree.add_parent(bob, jane).unwrap();
        assert_eq!(outcome.added, 1);
        assert!(tree.has_sibling_edge(alice, bob));
    }

    #[test]
    fn half_siblings_get_no_synthesized_edge() {
        let mut tree = FamilyTree::new();
        let john = add(&mut tree, "John");
        let mary = add(&mut tree, "Mary");
        let lisa = add(&mut tree, "Lisa");
        let a = add(&mut tree, "A");
        let b = add(&mut tree, "B");

        tree.add_parent(a, john).unwrap();
        tree.add_parent(a, mary).unwrap();
        tree.add_parent(b, john).unwrap();
        tree.add_parent(b, lisa).unwrap();

        assert!(!tree.has_sibling_edge(a, b));
        // The classifier still derives Half from the shared parent.
        let snapshot = tree.snapshot();
        let graph = KinshipGraph::from_snapshot(&snapshot);
        let classifier = RelationshipClassifier::new(&graph);
        assert_eq!(
            classifier.classify(b, a),
            Relation::Sibling {
                kind: SiblingKind::Half
            }
        );
    }

    #[test]
    fn removing_a_parent_dissolves_the_synthesized_edge() {
        let mut tree = FamilyTree::new();
        let john = add(&mut tree, "John");
        let jane = add(&mut tree, "Jane");
        let alice = add(&mut tree, "Alice");
        let bob = add(&mut tree, "Bob");

        for child in [alice, bob] {
            tree.add_parent(child, john).unwrap();
            tree.add_parent(child, jane).unwrap();
        }
        assert!(tree.has_sibling_edge(alice, bob));

        let outcome = tree.remove_parent(bob, jane).unwrap();
        assert_eq!(outcome.removed, 1);
        assert!(!tree.has_sibling_edge(alice, bob));
    }

    #[test]
    fn second_current_marriage_rejected() {
        let mut tree = FamilyTree::new();
        let john = add(&mut tree, "John");
        let jane = add(&mut tree, "Jane");
        let lisa = add(&mut tree, "Lisa");

        tree.add_spouse(john, jane).unwrap();
        assert!(matches!(
            tree.add_spouse(john, lisa),
            Err(StoreError::SpouseConflict(p)) if p == john
        ));
        assert!(matches!(
            tree.add_spouse(lisa, jane),
            Err(StoreError::SpouseConflict(p)) if p == jane
        ));
    }

    #[test]
    fn divorce_frees_both_for_remarriage() {
        let mut tree = FamilyTree::new();
        let john = add(&mut tree, "John");
        let jane = add(&mut tree, "Jane");
        let lisa = add(&mut tree, "Lisa");

        tree.add_spouse(john, jane).unwrap();
        tree.divorce(john, jane).unwrap();
        assert_eq!(tree.current_spouse_of(john), None);
        assert_eq!(tree.current_spouse_of(jane), None);

        tree.add_spouse(john, lisa).unwrap();
        assert_eq!(tree.current_spouse_of(john), Some(lisa));

        // Already dissolved: nothing left to divorce.
        assert!(matches!(
            tree.divorce(john, jane),
            Err(StoreError::NoSuchMarriage { .. })
        ));
    }

    #[test]
    fn death_widows_the_marriage_without_making_it_ex() {
        let mut tree = FamilyTree::new();
        let john = add(&mut tree, "John");
        let jane = add(&mut tree, "Jane");
        let lisa = add(&mut tree, "Lisa");

        tree.add_spouse(john, jane).unwrap();
        tree.record_death(jane, NaiveDate::from_ymd_opt(2020, 5, 1))
            .unwrap();

        assert!(tree.person(jane).unwrap().is_deceased());
        assert_eq!(tree.current_spouse_of(john), None);
        let widowed = tree
            .snapshot()
            .relations
            .iter()
            .filter(|r| r.kind == RelationKind::Spouse)
            .all(|r| r.is_deceased && !r.is_ex);
        assert!(widowed);

        // The survivor may remarry.
        tree.add_spouse(john, lisa).unwrap();
    }

    #[test]
    fn blood_relatives_cannot_marry() {
        let mut tree = FamilyTree::new();
        let john = add(&mut tree, "John");
        let jane = add(&mut tree, "Jane");
        let alice = add(&mut tree, "Alice");
        let bob = add(&mut tree, "Bob");
        for child in [alice, bob] {
            tree.add_parent(child, john).unwrap();
            tree.add_parent(child, jane).unwrap();
        }

        let err = tree.add_spouse(alice, bob).unwrap_err();
        match err {
            StoreError::BloodRelatives { rule } => {
                assert_eq!(rule, "siblings sharing a parent")
            }
            other => panic!("expected blood gate, got {other}"),
        }
    }

    #[test]
    fn sibling_edge_requires_a_shared_parent() {
        let mut tree = FamilyTree::new();
        let a = add(&mut tree, "A");
        let b = add(&mut tree, "B");
        let p = add(&mut tree, "P");
        tree.add_parent(a, p).unwrap();

        assert!(matches!(
            tree.add_sibling_edge(a, b, None),
            Err(StoreError::NotSiblings { .. })
        ));
    }

    #[test]
    fn ambiguous_half_sibling_edge_needs_an_anchor() {
        // C shares mom with A and dad with B: two half-sibling groups.
        let mut tree = FamilyTree::new();
        let mom = add(&mut tree, "Mom");
        let dad = add(&mut tree, "Dad");
        let other_dad = add(&mut tree, "OtherDad");
        let other_mom = add(&mut tree, "OtherMom");
        let a = add(&mut tree, "A");
        let b = add(&mut tree, "B");
        let c = add(&mut tree, "C");

        tree.add_parent(c, mom).unwrap();
        tree.add_parent(c, dad).unwrap();
        tree.add_parent(a, mom).unwrap();
        tree.add_parent(a, other_dad).unwrap();
        tree.add_parent(b, dad).unwrap();
        tree.add_parent(b, other_mom).unwrap();

        assert!(matches!(
            tree.add_sibling_edge(c, a, None),
            Err(StoreError::AmbiguousSiblingEdge { .. })
        ));
        assert!(matches!(
            tree.add_sibling_edge(c, a, Some(dad)),
            Err(StoreError::InvalidSharedParent { .. })
        ));

        tree.add_sibling_edge(c, a, Some(mom)).unwrap();
        assert!(tree.has_sibling_edge(c, a));
    }

    #[test]
    fn snapshot_version_increases_with_mutations() {
        let mut tree = FamilyTree::new();
        let v0 = tree.version();
        let a = add(&mut tree, "A");
        let b = add(&mut tree, "B");
        assert!(tree.version() > v0);

        let v1 = tree.version();
        tree.add_spouse(a, b).unwrap();
        assert!(tree.version() > v1);
    }

    #[test]
    fn from_snapshot_roundtrip() {
        let mut tree = FamilyTree::new();
        let john = add(&mut tree, "John");
        let alice = add(&mut tree, "Alice");
        tree.add_parent(alice, john).unwrap();

        let restored = FamilyTree::from_snapshot(tree.snapshot());
        assert_eq!(restored.version(), tree.version());
        assert_eq!(restored.parents_of(alice), vec![john]);
        assert_eq!(restored.children_of(john), vec![alice]);
    }
}
