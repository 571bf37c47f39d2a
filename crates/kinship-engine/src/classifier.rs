//! Relationship classification.
//!
//! `classify(target, root)` resolves the natural-language relationship of
//! any person to a chosen root. Direct edges are matched first, then a
//! declarative `(ascend, sibling_hop, descend)` rule table covers the
//! derived blood relations (grandparents, uncles/aunts, nephews/nieces,
//! cousins), then the spouse-linked passes derive in-law and step
//! relations. Gendering happens at label rendering, not here.
//!
//! Classification is a pure function of `(target, root, snapshot)`:
//! deterministic, never failing, safe to memoize by `(root, version)`.
//! Malformed data (unknown ids, cycles, missing counterparts) degrades to
//! `Unrelated`.

use std::collections::HashSet;

use kinship_core::{PersonId, Relation, SiblingKind, SpouseStatus};

use crate::graph::{KinshipGraph, SpouseFilter};

/// Tuning for the classifier's bounded searches.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Deepest ancestor/descendant chain to resolve, in parent edges.
    /// 2 = grandparent, 3 = great-grandparent.
    pub max_generations: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { max_generations: 3 }
    }
}

/// One row of the derived-relation rule table: walk `ascend` parent edges
/// from the root, optionally hop to a blood sibling, then walk `descend`
/// child edges; if the target is in the final set the relation applies.
struct KinRule {
    ascend: usize,
    sibling_hop: bool,
    descend: usize,
    relation: Relation,
}

/// Collateral relations at fixed distance. Evaluated after the
/// ancestor/descendant chains, in this order.
const COLLATERAL_RULES: &[KinRule] = &[
    KinRule {
        ascend: 1,
        sibling_hop: true,
        descend: 0,
        relation: Relation::ParentSibling,
    },
    KinRule {
        ascend: 0,
        sibling_hop: true,
        descend: 1,
        relation: Relation::SiblingChild,
    },
    KinRule {
        ascend: 1,
        sibling_hop: true,
        descend: 1,
        relation: Relation::Cousin,
    },
];

/// The relationship classifier over one graph snapshot.
pub struct RelationshipClassifier<'a> {
    graph: &'a KinshipGraph,
    config: ClassifierConfig,
}

impl<'a> RelationshipClassifier<'a> {
    pub fn new(graph: &'a KinshipGraph) -> Self {
        Self {
            graph,
            config: ClassifierConfig::default(),
        }
    }

    pub fn with_config(graph: &'a KinshipGraph, config: ClassifierConfig) -> Self {
        Self { graph, config }
    }

    /// Classify the relationship of `target` to `root`.
    pub fn classify(&self, target: PersonId, root: PersonId) -> Relation {
        if target == root {
            return Relation::Root;
        }
        let (Some(t), Some(r)) = (self.graph.index_of(target), self.graph.index_of(root)) else {
            return Relation::Unrelated;
        };
        self.classify_idx(t, r)
    }

    /// Classify and render the label, gendered by the target person.
    pub fn classify_label(&self, target: PersonId, root: PersonId) -> String {
        let relation = self.classify(target, root);
        let gender = self
            .graph
            .index_of(target)
            .and_then(|t| self.graph.person(t).gender);
        relation.label(gender)
    }

    /// Relationship of every person in the graph to `root`, including the
    /// root itself. A finite, restartable list in snapshot order.
    pub fn relationships_to(&self, root: PersonId) -> Vec<(PersonId, Relation)> {
        self.graph
            .nodes
            .iter()
            .map(|n| (n.id, self.classify(n.id, root)))
            .collect()
    }

    fn classify_idx(&self, t: usize, r: usize) -> Relation {
        // Direct parent/child edges.
        if self.graph.parents(r).contains(&t) {
            return Relation::Parent;
        }
        if self.graph.children(r).contains(&t) {
            return Relation::Child;
        }

        // Spouse edge. A living spouse is never "late" from a deceased
        // partner's perspective.
        if let Some(link) = self.graph.spouse_link(r, t) {
            let status = if link.is_ex {
                SpouseStatus::Ex
            } else if self.graph.person(t).is_deceased() && !self.graph.person(r).is_deceased() {
                SpouseStatus::Late
            } else {
                SpouseStatus::Current
            };
            return Relation::Spouse { status };
        }

        // Siblings: full/half from parent-set overlap, step from a stored
        // edge with no shared parent.
        let shared = self.graph.shared_parents(t, r).len();
        if shared >= 2 {
            return Relation::Sibling {
                kind: SiblingKind::Full,
            };
        }
        if shared == 1 {
            return Relation::Sibling {
                kind: SiblingKind::Half,
            };
        }
        if self.graph.has_sibling_edge(t, r) {
            return Relation::Sibling {
                kind: SiblingKind::Step,
            };
        }

        // Ancestor/descendant chains, nearest first.
        for generations in 2..=self.config.max_generations {
            let rule = KinRule {
                ascend: generations,
                sibling_hop: false,
                descend: 0,
                relation: Relation::Ancestor {
                    generations: generations as u8,
                },
            };
            if self.matches_rule(r, t, &rule) {
                return rule.relation;
            }
            let rule = KinRule {
                ascend: 0,
                sibling_hop: false,
                descend: generations,
                relation: Relation::Descendant {
                    generations: generations as u8,
                },
            };
            if self.matches_rule(r, t, &rule) {
                return rule.relation;
            }
        }

        for rule in COLLATERAL_RULES {
            if self.matches_rule(r, t, rule) {
                return rule.relation;
            }
        }

        if let Some(relation) = self.classify_in_law(t, r) {
            return relation;
        }
        if let Some(relation) = self.classify_step(t, r) {
            return relation;
        }

        Relation::Unrelated
    }

    /// Evaluate one rule-table row from `root` toward `target`.
    ///
    /// Every person the walk passes *through* (not the endpoints) is a
    /// connecting relative and must not have died before either endpoint's
    /// birth; a broken link removes the whole chain, so the two ends
    /// classify as `Unrelated` in both directions.
    fn matches_rule(&self, root: usize, target: usize, rule: &KinRule) -> bool {
        let mut frontier: HashSet<usize> = HashSet::from([root]);
        let mut visited: HashSet<usize> = frontier.clone();

        for step in 0..rule.ascend {
            let mut next = HashSet::new();
            for &x in &frontier {
                if x != root && self.chain_broken(x, root, target) {
                    continue;
                }
                for &p in self.graph.parents(x) {
                    if p == root && step > 0 {
                        tracing::warn!(
                            person = %self.graph.person(root).id,
                            "Cycle detected in ancestor walk; treating as not an ancestor"
                        );
                        continue;
                    }
                    if visited.insert(p) {
                        next.insert(p);
                    }
                }
            }
            frontier = next;
            if frontier.is_empty() {
                return false;
            }
        }

        if rule.sibling_hop {
            let mut next = HashSet::new();
            for &x in &frontier {
                if x != root && self.chain_broken(x, root, target) {
                    continue;
                }
                for s in self.graph.blood_siblings(x) {
                    if visited.insert(s) {
                        next.insert(s);
                    }
                }
            }
            frontier = next;
            if frontier.is_empty() {
                return false;
            }
        }

        for _ in 0..rule.descend {
            let mut next = HashSet::new();
            for &x in &frontier {
                if x != root && self.chain_broken(x, root, target) {
                    continue;
                }
                for &c in self.graph.children(x) {
                    if visited.insert(c) {
                        next.insert(c);
                    }
                }
            }
            frontier = next;
            if frontier.is_empty() {
                return false;
            }
        }

        frontier.contains(&target)
    }

    /// Whether a chain passing through `via` between `a` and `b` is
    /// broken: the connecting relative died before one endpoint was born.
    fn chain_broken(&self, via: usize, a: usize, b: usize) -> bool {
        let via = self.graph.person(via);
        [a, b].iter().any(|&end| {
            matches!(self.graph.person(end).date_of_birth, Some(birth) if via.died_before(birth))
        })
    }

    /// In-law relations, derived only through current (non-ex) spouse
    /// links. Divorce severs in-law status entirely: collaterals of an
    /// ex-spouse classify as `Unrelated`, not "Ex-…-in-law".
    fn classify_in_law(&self, t: usize, r: usize) -> Option<Relation> {
        for s in self.graph.spouses(r, SpouseFilter::Current) {
            if self.chain_broken(s, r, t) {
                continue;
            }
            if self.graph.parents(s).contains(&t) {
                return Some(Relation::ParentInLaw);
            }
            if self.graph.blood_siblings(s).contains(&t) {
                return Some(Relation::SiblingInLaw);
            }
        }
        for sib in self.graph.blood_siblings(r) {
            if self.chain_broken(sib, r, t) {
                continue;
            }
            if self.graph.spouses(sib, SpouseFilter::Current).contains(&t) {
                return Some(Relation::SiblingInLaw);
            }
        }
        for c in self.graph.children(r) {
            if self.chain_broken(*c, r, t) {
                continue;
            }
            if self.graph.spouses(*c, SpouseFilter::Current).contains(&t) {
                return Some(Relation::ChildInLaw);
            }
        }
        None
    }

    /// Step relations via a parent's current-or-widowed (never ex) spouse
    /// who is not the biological co-parent.
    fn classify_step(&self, t: usize, r: usize) -> Option<Relation> {
        let step_parents = self.step_parents_of(r);
        if step_parents.contains(&t) {
            return Some(Relation::StepParent);
        }
        for &sp in &step_parents {
            if self.chain_broken(sp, r, t) {
                continue;
            }
            if self.graph.parents(sp).contains(&t) {
                return Some(Relation::StepGrandparent);
            }
            if self.graph.children(sp).contains(&t) && self.graph.shared_parents(t, r).is_empty() {
                return Some(Relation::Sibling {
                    kind: SiblingKind::Step,
                });
            }
        }
        for s in self.graph.spouses(r, SpouseFilter::Current) {
            if self.chain_broken(s, r, t) {
                continue;
            }
            if self.graph.children(s).contains(&t) && !self.graph.children(r).contains(&t) {
                return Some(Relation::StepChild);
            }
        }
        None
    }

    /// Current (non-ex) spouses of a person's parents, excluding the
    /// person's own parents.
    fn step_parents_of(&self, r: usize) -> Vec<usize> {
        let mut out = Vec::new();
        for &p in self.graph.parents(r) {
            if self.chain_broken(p, r, r) {
                continue;
            }
            for s in self.graph.spouses(p, SpouseFilter::Current) {
                if !self.graph.parents(r).contains(&s) && !out.contains(&s) {
                    out.push(s);
                }
            }
        }
        out
    }
}
