//! Error types for tracegram

use thiserror::Error;

/// Errors that can abort a dataset run.
///
/// Only fatal conditions live here. Data insufficiency (fewer valid frames
/// than requested, a split emptied by guard arithmetic) and skipped sources
/// are warnings recorded in metadata, not errors.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("duplicate label_id {label_id} shared by workloads '{first}' and '{second}'")]
    DuplicateLabel {
        label_id: i64,
        first: String,
        second: String,
    },

    #[error("frame width mismatch in workload '{workload}' split {split}: expected {expected}, found {found}")]
    WidthMismatch {
        workload: String,
        split: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}
