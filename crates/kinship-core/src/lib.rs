//! kinship-core: Shared domain types for the Kinship relationship engine.
//!
//! This crate provides the types used across all Kinship components:
//! - Person records and their identifiers
//! - Relationship rows (Parent, Child, Spouse, Sibling) as stored and
//!   exchanged with the persistence collaborator
//! - The `TreeSnapshot` interchange format consumed by the read side
//! - The `Relation` label vocabulary with gender-aware rendering

pub mod relation;
pub mod types;

pub use relation::{Relation, SiblingKind, SpouseStatus};
pub use types::{Gender, Person, PersonId, RelationKind, RelationRecord, TreeSnapshot};
