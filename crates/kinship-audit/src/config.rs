//! Configuration for the kinship-audit daemon.

use serde::Deserialize;

/// Top-level audit configuration.
///
/// Loaded from `kinship.toml` `[audit]` section or `KINSHIP_AUDIT__`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Seconds between sweeps in daemon mode.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// How many generations of parent chains to walk when deciding
    /// whether one endpoint of a sibling edge is an ancestor of the
    /// other. Chains longer than this are treated as unrelated.
    #[serde(default = "default_chain_depth")]
    pub max_chain_depth: usize,

    /// Snapshot file to audit when none is given on the command line.
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

fn default_interval() -> u64 {
    3600
}

fn default_chain_depth() -> usize {
    10
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            max_chain_depth: default_chain_depth(),
            snapshot_path: None,
        }
    }
}
