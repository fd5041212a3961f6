//! Per-workload assembly: label attachment, counts, and matrix handoff
//!
//! The assembler attaches the workload's constant class label to every frame
//! of every split and records per-split counts. It performs no reordering
//! and no randomness. The typed handoff for downstream classifiers is a
//! `[count, n]` i64 matrix plus a `[count]` label vector per split, built
//! with width validation.

use ndarray::{Array1, Array2};

use crate::error::DatasetError;
use crate::types::{Frame, PerSplit, Split, SplitCount, SplitSet};

/// Attach `label_id` to every frame of every split.
pub fn assemble_splits(frames: PerSplit<Vec<Frame>>, label_id: i64) -> PerSplit<SplitSet> {
    let label = |frames: Vec<Frame>| {
        let labels = vec![label_id; frames.len()];
        SplitSet { frames, labels }
    };
    PerSplit {
        train: label(frames.train),
        val: label(frames.val),
        test: label(frames.test),
    }
}

/// Per-split frame counts.
pub fn split_counts(splits: &PerSplit<SplitSet>) -> PerSplit<SplitCount> {
    PerSplit {
        train: SplitCount { count: splits.train.len() },
        val: SplitCount { count: splits.val.len() },
        test: SplitCount { count: splits.test.len() },
    }
}

/// Frame matrix and label vector for one split, shaped for classifier input.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitMatrix {
    /// Shape `[count, n]`
    pub x: Array2<i64>,
    /// Shape `[count]`
    pub y: Array1<i64>,
}

impl SplitMatrix {
    /// Build the `[count, n]` matrix for a split, validating that every
    /// frame has exactly width `n`. A width violation is fatal.
    pub fn from_split_set(
        set: &SplitSet,
        n: usize,
        workload: &str,
        split: Split,
    ) -> Result<Self, DatasetError> {
        let mut x = Array2::<i64>::zeros((set.len(), n));
        for (row, frame) in set.frames.iter().enumerate() {
            if frame.width() != n {
                return Err(DatasetError::WidthMismatch {
                    workload: workload.to_string(),
                    split: split.as_str(),
                    expected: n,
                    found: frame.width(),
                });
            }
            for (col, &code) in frame.codes.iter().enumerate() {
                x[[row, col]] = i64::from(code);
            }
        }
        Ok(SplitMatrix {
            x,
            y: Array1::from_vec(set.labels.clone()),
        })
    }
}
