//! Guarded three-way temporal split
//!
//! Two sequential binary cuts over the original temporal order: 70/30 into
//! trainval/test, then 80/20 of the retained trainval into train/val. At each
//! cut, `guard` frames are discarded on both sides. With stride-1 windowing a
//! frame overlaps its neighbor in all but one position, so a guard equal to
//! the frame width removes the whole zone of near-duplicate overlap between
//! adjacent splits. Net nominal proportions: train 56%, val 14%, test 30%,
//! each reduced by guard losses.

use crate::types::{Frame, PerSplit};
use tracing::warn;

/// Partition `frames` into train/val/test with `guard` frames discarded on
/// each side of each cut point.
///
/// The second cut is computed against the retained trainval prefix, not the
/// full array, so guard losses compound rather than overlap. When the input
/// is shorter than `2 * guard`, one or more splits may legitimately come out
/// empty; that is reported by the caller, never treated as fatal.
pub fn split_with_guard(frames: Vec<Frame>, guard: usize) -> PerSplit<Vec<Frame>> {
    let total = frames.len();
    if total == 0 {
        return PerSplit::default();
    }

    let cut70 = (total as f64 * 0.70).floor() as usize;
    let test_start = (cut70 + guard).min(total);
    let mut trainval = frames;
    let test = trainval.split_off(test_start);
    trainval.truncate(cut70.saturating_sub(guard));

    let retained = trainval.len();
    let cut80 = (retained as f64 * 0.80).floor() as usize;
    let val_start = (cut80 + guard).min(retained);
    let mut train = trainval;
    let val = train.split_off(val_start);
    train.truncate(cut80.saturating_sub(guard));

    PerSplit { train, val, test }
}

/// Log a warning for every split the guard arithmetic left empty.
pub fn warn_empty_splits(workload: &str, splits: &PerSplit<Vec<Frame>>) {
    for split in crate::types::Split::ALL {
        if splits.get(split).is_empty() {
            warn!(workload, split = split.as_str(), "split is empty after guarded cut");
        }
    }
}
