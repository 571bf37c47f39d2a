//! Error types for write-side validation.

use kinship_core::PersonId;
use thiserror::Error;

/// Rejections produced by the write side. The read side never returns
/// these: queries degrade to `Unrelated`/`false` instead of failing.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown person: {0}")]
    UnknownPerson(PersonId),

    #[error("person already exists: {0}")]
    DuplicatePerson(PersonId),

    #[error("a person cannot be related to themselves")]
    SelfRelation,

    #[error("{child} already has two recorded parents")]
    ParentCapExceeded { child: PersonId },

    #[error("{parent} is a descendant of {child}; adding this parent would create a cycle")]
    AncestorCycle { parent: PersonId, child: PersonId },

    #[error("{0} already has a current spouse")]
    SpouseConflict(PersonId),

    #[error("blood relatives cannot marry ({rule})")]
    BloodRelatives { rule: String },

    #[error("no marriage on record between {a} and {b}")]
    NoSuchMarriage { a: PersonId, b: PersonId },

    #[error("{a} and {b} share no parent; step relations are derived, not stored")]
    NotSiblings { a: PersonId, b: PersonId },

    #[error("sibling edge between {a} and {b} needs a shared_parent_id to disambiguate")]
    AmbiguousSiblingEdge { a: PersonId, b: PersonId },

    #[error("{parent} is not a shared parent of {a} and {b}")]
    InvalidSharedParent {
        a: PersonId,
        b: PersonId,
        parent: PersonId,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
