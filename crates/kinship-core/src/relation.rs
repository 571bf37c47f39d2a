//! The relationship label vocabulary.
//!
//! A `Relation` is the structural outcome of classification: base category
//! plus the half/step/ex/late modifiers. Gendering is a separate rendering
//! pass — `Relation::label` substitutes the gender-neutral variant whenever
//! the relevant person's gender is absent or unspecified.

use serde::{Deserialize, Serialize};

use crate::types::Gender;

/// Status modifier on a spouse relation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpouseStatus {
    Current,
    /// Dissolved marriage.
    Ex,
    /// Marriage ended by the target's death, viewed by a living root.
    Late,
}

/// Share modifier on a sibling relation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SiblingKind {
    /// Two shared parents.
    Full,
    /// Exactly one shared parent.
    Half,
    /// No shared parent; connected via a parent's remarriage.
    Step,
}

/// The classified relationship of a target person to the root.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Relation {
    /// The root person itself.
    Root,
    Parent,
    Child,
    Spouse { status: SpouseStatus },
    Sibling { kind: SiblingKind },
    /// Grandparent and beyond; `generations >= 2` counts parent edges.
    Ancestor { generations: u8 },
    /// Grandchild and beyond; `generations >= 2` counts child edges.
    Descendant { generations: u8 },
    /// Sibling of a parent (uncle/aunt).
    ParentSibling,
    /// Child of a sibling (nephew/niece).
    SiblingChild,
    /// First cousin; always rendered gender-neutral.
    Cousin,
    ParentInLaw,
    SiblingInLaw,
    ChildInLaw,
    StepParent,
    StepChild,
    StepGrandparent,
    Unrelated,
}

impl Relation {
    /// Render the natural-language label, gendered by the target person.
    ///
    /// `gender` is the gender of the person being labelled (the target),
    /// not the root. Absent or unspecified gender selects the neutral
    /// variant; `Cousin` and `Unrelated` have no gendered forms.
    pub fn label(&self, gender: Option<Gender>) -> String {
        match self {
            Relation::Root => "Root".to_string(),
            Relation::Parent => gendered(gender, "Father", "Mother", "Parent"),
            Relation::Child => gendered(gender, "Son", "Daughter", "Child"),
            Relation::Spouse { status } => match status {
                SpouseStatus::Current => gendered(gender, "Husband", "Wife", "Spouse"),
                SpouseStatus::Ex => gendered(gender, "Ex-Husband", "Ex-Wife", "Ex-Spouse"),
                SpouseStatus::Late => gendered(gender, "Late Husband", "Late Wife", "Late Spouse"),
            },
            Relation::Sibling { kind } => match kind {
                SiblingKind::Full => gendered(gender, "Brother", "Sister", "Sibling"),
                SiblingKind::Half => {
                    gendered(gender, "Half-Brother", "Half-Sister", "Half-Sibling")
                }
                SiblingKind::Step => {
                    gendered(gender, "Step-Brother", "Step-Sister", "Step-Sibling")
                }
            },
            Relation::Ancestor { generations } => {
                let base = gendered(gender, "Grandfather", "Grandmother", "Grandparent");
                with_greats(*generations, &base)
            }
            Relation::Descendant { generations } => {
                let base = gendered(gender, "Grandson", "Granddaughter", "Grandchild");
                with_greats(*generations, &base)
            }
            // The neutral fallback is an explicit term, not "Aunt/Uncle".
            Relation::ParentSibling => gendered(gender, "Uncle", "Aunt", "Parent's sibling"),
            Relation::SiblingChild => gendered(gender, "Nephew", "Niece", "Sibling's child"),
            Relation::Cousin => "Cousin".to_string(),
            Relation::ParentInLaw => {
                gendered(gender, "Father-in-law", "Mother-in-law", "Parent-in-law")
            }
            Relation::SiblingInLaw => {
                gendered(gender, "Brother-in-law", "Sister-in-law", "Sibling-in-law")
            }
            Relation::ChildInLaw => gendered(gender, "Son-in-law", "Daughter-in-law", "Child-in-law"),
            Relation::StepParent => gendered(gender, "Step-Father", "Step-Mother", "Step-Parent"),
            Relation::StepChild => gendered(gender, "Step-Son", "Step-Daughter", "Step-Child"),
            Relation::StepGrandparent => gendered(
                gender,
                "Step-Grandfather",
                "Step-Grandmother",
                "Step-Grandparent",
            ),
            Relation::Unrelated => "Unrelated".to_string(),
        }
    }
}

fn gendered(gender: Option<Gender>, male: &str, female: &str, neutral: &str) -> String {
    match gender {
        Some(Gender::Male) => male.to_string(),
        Some(Gender::Female) => female.to_string(),
        Some(Gender::Unspecified) | None => neutral.to_string(),
    }
}

/// Prefix `Great-` for each generation beyond grandparent depth.
fn with_greats(generations: u8, base: &str) -> String {
    let greats = generations.saturating_sub(2) as usize;
    let mut out = "Great-".repeat(greats);
    out.push_str(base);
    out
}
