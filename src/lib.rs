//! Tracegram - leakage-safe framing engine for syscall event traces
//!
//! Tracegram turns raw per-event traces (small integer codes, optionally
//! tagged with an execution-context segment and a timestamp) into
//! fixed-width train/val/test datasets through a deterministic pipeline:
//! load → trim → window → select → guarded split → merge.
//!
//! ## Modules
//!
//! - **record / loader**: field extraction rules and NDJSON source loading
//! - **trim / window / select / split**: the windowing-and-splitting core
//! - **dataset / merge**: label attachment, metadata, and the merged dataset
//! - **pipeline**: per-workload orchestration and the concurrent run driver
//!
//! The core has no randomness: identical inputs and parameters produce
//! byte-identical frame/label arrays and metadata.

pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod merge;
pub mod pipeline;
pub mod record;
pub mod select;
pub mod split;
pub mod trim;
pub mod types;
pub mod window;

pub use config::{FramingConfig, RunConfig};
pub use dataset::SplitMatrix;
pub use error::DatasetError;
pub use pipeline::{build_run, process_workload, RunOutput};
pub use record::SEGMENT_HASH_VERSION;
pub use types::{
    Event, EventSequence, Frame, MergedDataset, Split, SplitSet, WorkloadDataset, WorkloadSpec,
};

/// Tracegram version embedded in CLI output
pub const TRACEGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");
