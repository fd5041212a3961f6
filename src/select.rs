//! Frame selection: keep the earliest frames up to a per-workload target

use crate::types::Frame;

/// Outcome of head selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub frames: Vec<Frame>,
    /// `target - available` when the workload fell short, else 0
    pub shortfall: usize,
}

/// Keep the first `min(len, target)` frames, preserving order.
///
/// Selection never pads or synthesizes frames; a shortfall is reported in
/// the returned value and surfaced as a warning by the caller.
pub fn select_head(mut frames: Vec<Frame>, target: usize) -> Selection {
    let shortfall = target.saturating_sub(frames.len());
    frames.truncate(target);
    Selection { frames, shortfall }
}
