//! kinship-store: the write side of the Kinship family graph.
//!
//! A `FamilyTree` owns Person rows and mirrored RelationRecord rows and
//! validates every mutation before applying it. The read side
//! (`kinship-engine`) consumes `TreeSnapshot`s exported from here and
//! never mutates.
//!
//! Write-side invariants enforced by this crate:
//! - at most two recorded parents per person
//! - no parent edge that would make someone their own ancestor
//! - at most one current spouse per person, blood relatives cannot marry
//! - stored sibling edges are justified by at least one shared parent,
//!   and are kept synchronized with parent rows automatically

pub mod error;
pub mod store;
pub mod synthesizer;

pub use error::{Result, StoreError};
pub use store::FamilyTree;
pub use synthesizer::SyncOutcome;
