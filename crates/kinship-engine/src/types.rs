//! Response types for engine queries, serialized to the calling tier.

use serde::{Deserialize, Serialize};

use kinship_core::{PersonId, Relation};

/// One classified relationship in a whole-graph listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelationshipEntry {
    pub person_id: PersonId,
    pub relation: Relation,
    /// Rendered label, gendered by the person.
    pub label: String,
}

/// Every person's relationship to one root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipListing {
    pub root_id: PersonId,
    pub snapshot_version: u64,
    pub relationships: Vec<RelationshipEntry>,
}

/// Result of a single classify query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyResult {
    pub root_id: PersonId,
    pub target_id: PersonId,
    pub relation: Relation,
    pub label: String,
}

/// Result of a marriage-gate check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarriageCheck {
    pub person_a: PersonId,
    pub person_b: PersonId,
    pub can_marry: bool,
    /// Which blood-relation rule blocked the marriage, when one did.
    pub blood_relationship: Option<String>,
}
