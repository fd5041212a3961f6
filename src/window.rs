//! Stride-1 windowing with segment-uniformity filtering
//!
//! Every start offset yields one candidate window; a candidate survives only
//! if all `n` covered events share one segment key, so a frame never mixes
//! events from two execution contexts. Stride 1 maximizes sample count from
//! short traces, which is exactly why the guarded splitter downstream has to
//! discard overlap at its cut points.

use crate::types::Frame;

/// Slide a width-`n` window across `codes`, keeping only segment-uniform
/// windows, in ascending start order.
///
/// `codes` and `segments` are parallel and equally long. A sequence shorter
/// than `n` yields no frames; partial frames are never produced.
///
/// # Panics
/// Debug-asserts that the inputs are parallel and `n >= 1`; both are
/// guaranteed by the loader and config validation.
pub fn slide_windows(codes: &[u32], segments: &[u32], n: usize) -> Vec<Frame> {
    debug_assert_eq!(codes.len(), segments.len());
    debug_assert!(n >= 1);

    let len = codes.len();
    if len < n {
        return Vec::new();
    }

    let mut frames = Vec::new();
    // End (exclusive) of the uniform segment run containing offset i.
    let mut run_end = 0usize;
    for start in 0..=len - n {
        if run_end <= start {
            run_end = start + 1;
            while run_end < len && segments[run_end] == segments[start] {
                run_end += 1;
            }
        }
        if run_end - start >= n {
            frames.push(Frame {
                codes: codes[start..start + n].to_vec(),
                start,
            });
        }
    }
    frames
}

/// Number of candidate window positions for a sequence of `len` events.
pub fn candidate_count(len: usize, n: usize) -> usize {
    (len + 1).saturating_sub(n)
}
