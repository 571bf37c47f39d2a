//! Error types for the kinship-audit crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Snapshot serialization error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;
