//! Head/tail trimming of event sequences
//!
//! Traces begin and end with startup/teardown noise (container boot, runtime
//! warmup, shutdown). A fixed fraction is dropped from each end before any
//! windowing.

use std::ops::Range;

/// Compute the retained half-open index range for a sequence of `len`
/// events with `head`/`tail` trim fractions.
///
/// The range is `[floor(len * head), max(start, len - floor(len * tail)))`.
/// When `head + tail` would leave nothing, the end clamps to the start and
/// the range is empty — never negative. Pure; the caller slices.
pub fn trim_range(len: usize, head: f64, tail: f64) -> Range<usize> {
    let head_n = (len as f64 * head).floor() as usize;
    let tail_n = (len as f64 * tail).floor() as usize;
    let start = head_n.min(len);
    let end = len.saturating_sub(tail_n).max(start);
    start..end
}
