//! Core types for the tracegram pipeline
//!
//! This module defines the data structures that flow through each stage of
//! the pipeline: raw events, framed windows, per-workload split sets, and the
//! merged terminal dataset handed to downstream classifiers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single trace event.
///
/// `order_key` is the source timestamp when one was present, otherwise the
/// event's global ordinal as a float. It exists only to establish a stable
/// ordering; it is never compared across runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Event code (e.g. syscall number)
    pub code: u32,
    /// Coarse execution-context key (hashed pod/job identity; 0 = unsegmented)
    pub segment: u32,
    /// Sort key: timestamp in seconds, or original ordinal
    pub order_key: f64,
}

/// The ordered event stream of one workload, stored as parallel columns.
///
/// Built once per workload per run by the loader, consumed by the windower,
/// then discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSequence {
    pub codes: Vec<u32>,
    pub segments: Vec<u32>,
    pub order: Vec<f64>,
}

impl EventSequence {
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Build from individual events, sorting stably by `order_key`.
    pub fn from_events(mut events: Vec<Event>) -> Self {
        events.sort_by(|a, b| a.order_key.total_cmp(&b.order_key));
        let mut seq = EventSequence {
            codes: Vec::with_capacity(events.len()),
            segments: Vec::with_capacity(events.len()),
            order: Vec::with_capacity(events.len()),
        };
        for e in events {
            seq.codes.push(e.code);
            seq.segments.push(e.segment);
            seq.order.push(e.order_key);
        }
        seq
    }
}

/// A fixed-width window of event codes.
///
/// `start` is the offset of the first covered event within the trimmed
/// sequence the frame was cut from. Invariant: all covered events share one
/// segment key. Frames are immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub codes: Vec<u32>,
    pub start: usize,
}

impl Frame {
    pub fn width(&self) -> usize {
        self.codes.len()
    }
}

/// One of the three dataset partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

/// Parallel frame/label arrays for one split.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitSet {
    pub frames: Vec<Frame>,
    pub labels: Vec<i64>,
}

impl SplitSet {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// A value per split; used for frame buckets and counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerSplit<T> {
    pub train: T,
    pub val: T,
    pub test: T,
}

impl<T> PerSplit<T> {
    pub fn get(&self, split: Split) -> &T {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    pub fn get_mut(&mut self, split: Split) -> &mut T {
        match split {
            Split::Train => &mut self.train,
            Split::Val => &mut self.val,
            Split::Test => &mut self.test,
        }
    }
}

/// Declaration of one labeled workload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadSpec {
    /// Stable workload identifier (directory-safe)
    pub workload: String,
    /// Optional display name; defaults to the identifier
    #[serde(default)]
    pub name: Option<String>,
    /// Class label; must be unique across the run
    pub label_id: i64,
    /// Frames to keep per workload (head of the valid-frame stream)
    pub target_frames: usize,
    /// NDJSON source files, in priority order
    pub paths: Vec<String>,
}

impl WorkloadSpec {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.workload)
    }
}

/// Head/tail trim fractions applied before windowing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimFractions {
    pub head: f64,
    pub tail: f64,
}

impl Default for TrimFractions {
    fn default() -> Self {
        Self { head: 0.10, tail: 0.10 }
    }
}

/// Per-workload metadata.
///
/// Byte-stable across identical runs: no wall-clock fields, no random ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadMeta {
    pub workload: String,
    pub name: String,
    pub label_id: i64,
    pub n: usize,
    pub trim_pct: TrimFractions,
    pub guard_frames: usize,
    pub target_frames: usize,
    /// Events loaded across all usable sources
    pub events_total: usize,
    /// Events surviving the head/tail trim
    pub events_after_trim: usize,
    /// Candidate window positions (max(0, L - n + 1))
    pub candidate_frames: usize,
    /// Candidates passing the segment-uniformity check
    pub valid_frames: usize,
    /// Frames kept after head selection
    pub selected_frames: usize,
    /// How far short of `target_frames` the workload fell (0 = met target)
    pub shortfall: usize,
    /// Source files skipped as unreadable
    pub skipped_sources: Vec<String>,
    pub splits: PerSplit<SplitCount>,
}

/// Frame count for one split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitCount {
    pub count: usize,
}

/// The three split sets produced for one workload, plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadDataset {
    pub splits: PerSplit<SplitSet>,
    pub meta: WorkloadMeta,
}

/// Metadata of the merged dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedMeta {
    pub n: usize,
    pub splits: PerSplit<SplitCount>,
    /// workload_id -> label_id
    pub label_map: BTreeMap<String, i64>,
    /// Workloads in declaration order (the merge concatenation order)
    pub workloads: Vec<String>,
}

/// Terminal artifact of a run: per-split concatenation of every workload's
/// frame/label arrays, in workload declaration order. Immutable after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedDataset {
    pub splits: PerSplit<SplitSet>,
    pub meta: MergedMeta,
}
