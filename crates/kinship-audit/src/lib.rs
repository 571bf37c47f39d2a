//! kinship-audit: Background consistency auditor for the Kinship graph.
//!
//! Sweeps the family tree for sibling edges that connect a person to
//! their own ancestor and removes them, either once over a snapshot
//! file or periodically over a shared in-memory tree.

pub mod auditor;
pub mod config;
pub mod error;
pub mod scheduler;

pub use auditor::{clean_cross_generational_siblings, AuditReport, RemovedEdge};
pub use config::AuditConfig;
pub use error::{AuditError, Result};
pub use scheduler::AuditScheduler;
