//! Sweep scheduling.
//!
//! Daemon mode runs the consistency sweep on a fixed interval over a
//! shared in-memory tree; one-shot mode audits a snapshot file and
//! optionally writes the cleaned snapshot back.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::{interval, Duration};

use kinship_core::TreeSnapshot;
use kinship_store::FamilyTree;

use crate::auditor::{clean_cross_generational_siblings, AuditReport};
use crate::config::AuditConfig;
use crate::error::Result;

/// Runs periodic sweeps over a tree shared with other components.
pub struct AuditScheduler {
    config: AuditConfig,
    tree: Arc<RwLock<FamilyTree>>,
    snapshot_path: Option<PathBuf>,
}

impl AuditScheduler {
    pub fn new(config: AuditConfig, tree: Arc<RwLock<FamilyTree>>) -> Self {
        Self {
            config,
            tree,
            snapshot_path: None,
        }
    }

    /// Persist the tree to this path after any sweep that removed edges.
    pub fn with_write_back(mut self, path: PathBuf) -> Self {
        self.snapshot_path = Some(path);
        self
    }

    /// Run sweeps forever at the configured interval.
    ///
    /// The write lock is held only for the sweep itself, so concurrent
    /// readers see either the pre-sweep or post-sweep tree.
    pub async fn run(&self) -> Result<()> {
        let mut ticker = interval(Duration::from_secs(self.config.interval_secs.max(1)));
        loop {
            ticker.tick().await;

            let report = {
                let mut tree = self.tree.write().await;
                clean_cross_generational_siblings(&mut tree, self.config.max_chain_depth)
            };
            tracing::info!(
                examined = report.examined,
                removed = report.removed.len(),
                "audit sweep complete"
            );

            if !report.is_clean() {
                if let Some(path) = &self.snapshot_path {
                    let snapshot = self.tree.read().await.snapshot();
                    save_snapshot(path, &snapshot)?;
                    tracing::info!(path = %path.display(), "cleaned snapshot persisted");
                }
            }
        }
    }
}

/// One-shot sweep of a snapshot file.
pub fn sweep_snapshot_file(
    path: &Path,
    config: &AuditConfig,
    write_back: bool,
) -> Result<AuditReport> {
    let mut tree = FamilyTree::from_snapshot(load_snapshot(path)?);
    let report = clean_cross_generational_siblings(&mut tree, config.max_chain_depth);
    if write_back && !report.is_clean() {
        save_snapshot(path, &tree.snapshot())?;
    }
    Ok(report)
}

pub fn load_snapshot(path: &Path) -> Result<TreeSnapshot> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn save_snapshot(path: &Path, snapshot: &TreeSnapshot) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(snapshot)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinship_core::{Person, PersonId, RelationKind, RelationRecord};

    fn snapshot_with_bad_edge() -> (TreeSnapshot, PersonId, PersonId) {
        let dad = Person {
            id: PersonId::new(),
            first_name: "Dad".to_string(),
            last_name: "Test".to_string(),
            gender: None,
            date_of_birth: None,
            date_of_death: None,
            deceased: false,
        };
        let me = Person {
            id: PersonId::new(),
            first_name: "Me".to_string(),
            ..dad.clone()
        };
        let (d, m) = (dad.id, me.id);
        let snapshot = TreeSnapshot {
            version: 3,
            persons: vec![dad, me],
            relations: vec![
                RelationRecord::new(m, d, RelationKind::Parent),
                RelationRecord::new(d, m, RelationKind::Child),
                RelationRecord::new(d, m, RelationKind::Sibling),
                RelationRecord::new(m, d, RelationKind::Sibling),
            ],
        };
        (snapshot, d, m)
    }

    #[test]
    fn file_sweep_writes_back_the_cleaned_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        let (snapshot, ..) = snapshot_with_bad_edge();
        save_snapshot(&path, &snapshot).unwrap();

        let report = sweep_snapshot_file(&path, &AuditConfig::default(), true).unwrap();
        assert_eq!(report.removed.len(), 1);

        let cleaned = load_snapshot(&path).unwrap();
        assert!(cleaned
            .relations
            .iter()
            .all(|r| r.kind != RelationKind::Sibling));

        // The file is clean now.
        let report = sweep_snapshot_file(&path, &AuditConfig::default(), true).unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn file_sweep_without_write_back_leaves_the_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        let (snapshot, ..) = snapshot_with_bad_edge();
        save_snapshot(&path, &snapshot).unwrap();

        let report = sweep_snapshot_file(&path, &AuditConfig::default(), false).unwrap();
        assert_eq!(report.removed.len(), 1);

        let untouched = load_snapshot(&path).unwrap();
        assert!(untouched
            .relations
            .iter()
            .any(|r| r.kind == RelationKind::Sibling));
    }
}
