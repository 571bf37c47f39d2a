//! Core domain types for the Kinship family graph.
//!
//! These types mirror the records supplied by the persistence collaborator:
//! Person rows and mirrored Relationship rows. Everything downstream (the
//! classifier, the blood detector, the auditor) works off a `TreeSnapshot`
//! built from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Person ────────────────────────────────────────────────────────

/// Unique identifier for a person in a family tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(pub Uuid);

impl PersonId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PersonId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Recorded gender of a person.
///
/// The field is optional on `Person` and the value set is open: anything
/// other than `male`/`female` deserializes to `Unspecified` and renders
/// with the gender-neutral label variants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[serde(other)]
    Unspecified,
}

/// A person node in the family tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    /// Deceased can be recorded without a precise death date.
    #[serde(default)]
    pub deceased: bool,
}

impl Person {
    /// A death date implies deceased status; the reverse need not hold.
    pub fn is_deceased(&self) -> bool {
        self.deceased || self.date_of_death.is_some()
    }

    /// Whether this person had already died before `date`.
    ///
    /// Only a recorded death date can answer this; a bare deceased flag
    /// carries no ordering information and returns `false`.
    pub fn died_before(&self, date: NaiveDate) -> bool {
        matches!(self.date_of_death, Some(d) if d < date)
    }
}

// ── Relationship rows ─────────────────────────────────────────────

/// The closed set of stored relationship kinds.
///
/// `is_ex` / `is_deceased` apply only to `Spouse` rows; `shared_parent_id`
/// only to `Sibling` rows. Derived labels (grandparent, cousin, in-law,
/// step) are never stored — they are computed by the classifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    Parent,
    Child,
    Spouse,
    Sibling,
}

/// One stored relationship row.
///
/// `kind` describes who the relative is to the person: a `Parent` row
/// means `relative_id` is a parent of `person_id`. Rows are mirrored — a
/// `Parent` row on one side is matched by a `Child` row on the other, and
/// `Spouse`/`Sibling` rows appear once per direction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationRecord {
    pub person_id: PersonId,
    pub relative_id: PersonId,
    pub kind: RelationKind,
    /// Dissolved marriage. Spouse rows only.
    #[serde(default)]
    pub is_ex: bool,
    /// Marriage ended by a spouse's death. Spouse rows only; mutually
    /// exclusive with `is_ex` in valid data.
    #[serde(default)]
    pub is_deceased: bool,
    /// The specific parent anchoring a half-sibling edge, when a person
    /// belongs to more than one half-sibling group. Sibling rows only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_parent_id: Option<PersonId>,
}

impl RelationRecord {
    pub fn new(person_id: PersonId, relative_id: PersonId, kind: RelationKind) -> Self {
        Self {
            person_id,
            relative_id,
            kind,
            is_ex: false,
            is_deceased: false,
            shared_parent_id: None,
        }
    }

    /// A current spouse row: not dissolved, not ended by death.
    pub fn is_current_spouse(&self) -> bool {
        self.kind == RelationKind::Spouse && !self.is_ex && !self.is_deceased
    }
}

// ── Snapshot ──────────────────────────────────────────────────────

/// A read-only snapshot of one family tree.
///
/// This is the interchange format between the persistence collaborator and
/// the read side. `version` increases with every mutation, so
/// `(root_id, version)` is a safe memoization key for classification
/// results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeSnapshot {
    #[serde(default)]
    pub version: u64,
    pub persons: Vec<Person>,
    pub relations: Vec<RelationRecord>,
}
