//! kinship-engine: Relationship inference over a family tree snapshot.
//!
//! Builds an in-memory adjacency view from a `TreeSnapshot`, classifies
//! the relationship of any person to a chosen root (including derived
//! relations: grandparents, cousins, in-laws, step and half relations),
//! and detects blood relatedness within first-cousin range to gate
//! marriage creation.
//!
//! The whole crate is read-only and synchronous: every answer is a pure
//! function of the snapshot, so callers may memoize by
//! `(root_id, snapshot_version)`.

pub mod blood;
pub mod classifier;
pub mod graph;
pub mod types;

pub use classifier::{ClassifierConfig, RelationshipClassifier};
pub use graph::{KinshipGraph, SpouseFilter};
pub use types::{ClassifyResult, MarriageCheck, RelationshipEntry, RelationshipListing};
