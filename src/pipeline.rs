//! Pipeline orchestration
//!
//! This module provides the public API for tracegram. One workload flows
//! through Loader → Trimmer → Windower → Selector → Guarded Splitter →
//! Assembler; a run fans out one worker per workload, fans back in
//! preserving declaration order, merges, and runs the final shape
//! validation. A fatal error yields no partial merged output.

use std::thread;

use tracing::{info, warn};

use crate::config::{FramingConfig, RunConfig};
use crate::dataset::{assemble_splits, split_counts};
use crate::error::DatasetError;
use crate::loader::{load_sources, LoadOutcome};
use crate::merge::{merge_datasets, validate_widths};
use crate::select::select_head;
use crate::split::{split_with_guard, warn_empty_splits};
use crate::trim::trim_range;
use crate::types::{MergedDataset, WorkloadDataset, WorkloadMeta, WorkloadSpec};
use crate::window::{candidate_count, slide_windows};

/// Everything a successful run produces: per-workload datasets in
/// declaration order, plus the merged terminal dataset.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub workloads: Vec<WorkloadDataset>,
    pub merged: MergedDataset,
}

/// Execute a full run: validate, process every workload concurrently,
/// merge in declaration order, validate shapes.
pub fn build_run(config: &RunConfig) -> Result<RunOutput, DatasetError> {
    config.validate()?;
    let n = config.framing.n;
    info!(
        n,
        guard = config.framing.guard_frames(),
        workloads = config.workloads.len(),
        "run start: trim {:.0}%/{:.0}%, stride 1, split 56/14/30",
        config.framing.head_trim * 100.0,
        config.framing.tail_trim * 100.0,
    );

    // Fan out one worker per workload; workloads share no mutable state.
    // Joining the handles in spawn order restores declaration order no
    // matter which worker finishes first.
    let workloads = thread::scope(|scope| {
        let handles: Vec<_> = config
            .workloads
            .iter()
            .map(|spec| scope.spawn(move || process_workload(&config.framing, spec)))
            .collect();
        handles
            .into_iter()
            .map(|h| {
                h.join()
                    .map_err(|_| DatasetError::Internal("workload worker panicked".into()))
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    let merged = merge_datasets(&workloads, n);
    validate_widths(&workloads, &merged, n)?;
    info!("run complete: widths and label ids validated");

    Ok(RunOutput { workloads, merged })
}

/// Process one workload end to end: load its sources, then frame and split.
pub fn process_workload(framing: &FramingConfig, spec: &WorkloadSpec) -> WorkloadDataset {
    info!(
        workload = %spec.workload,
        target_frames = spec.target_frames,
        sources = spec.paths.len(),
        "input"
    );
    let outcome = load_sources(&spec.paths);
    frame_workload(framing, spec, outcome)
}

/// Frame and split an already-loaded event sequence.
///
/// Split out from [`process_workload`] so the windowing/splitting chain can
/// be exercised without touching the filesystem.
pub fn frame_workload(
    framing: &FramingConfig,
    spec: &WorkloadSpec,
    outcome: LoadOutcome,
) -> WorkloadDataset {
    let n = framing.n;
    let sequence = outcome.sequence;
    let events_total = sequence.len();

    let range = trim_range(events_total, framing.head_trim, framing.tail_trim);
    let events_after_trim = range.len();
    info!(
        workload = %spec.workload,
        events_total,
        trim_start = range.start,
        trim_end = range.end,
        "trim"
    );

    let codes = &sequence.codes[range.clone()];
    let segments = &sequence.segments[range];
    let frames = slide_windows(codes, segments, n);
    let candidate_frames = candidate_count(events_after_trim, n);
    let valid_frames = frames.len();
    info!(workload = %spec.workload, n, candidate_frames, valid_frames, "frame");

    let selection = select_head(frames, spec.target_frames);
    if selection.shortfall > 0 {
        warn!(
            workload = %spec.workload,
            valid = valid_frames,
            target = spec.target_frames,
            shortfall = selection.shortfall,
            "fewer valid frames than target, keeping all available"
        );
    }
    let selected_frames = selection.frames.len();

    let split_frames = split_with_guard(selection.frames, framing.guard_frames());
    warn_empty_splits(&spec.workload, &split_frames);

    let splits = assemble_splits(split_frames, spec.label_id);
    let counts = split_counts(&splits);
    info!(
        workload = %spec.workload,
        train = counts.train.count,
        val = counts.val.count,
        test = counts.test.count,
        "split"
    );

    WorkloadDataset {
        splits,
        meta: WorkloadMeta {
            workload: spec.workload.clone(),
            name: spec.display_name().to_string(),
            label_id: spec.label_id,
            n,
            trim_pct: framing.trim(),
            guard_frames: framing.guard_frames(),
            target_frames: spec.target_frames,
            events_total,
            events_after_trim,
            candidate_frames,
            valid_frames,
            selected_frames,
            shortfall: selection.shortfall,
            skipped_sources: outcome.skipped_sources,
            splits: counts,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Event, EventSequence, Split};
    use pretty_assertions::assert_eq;

    fn framing(n: usize) -> FramingConfig {
        FramingConfig {
            n,
            head_trim: 0.10,
            tail_trim: 0.10,
            guard: None,
        }
    }

    fn spec(target: usize) -> WorkloadSpec {
        WorkloadSpec {
            workload: "wl".into(),
            name: None,
            label_id: 1,
            target_frames: target,
            paths: Vec::new(),
        }
    }

    fn uniform_sequence(len: usize) -> LoadOutcome {
        let events = (0..len)
            .map(|i| Event {
                code: (i % 7) as u32,
                segment: 0,
                order_key: i as f64,
            })
            .collect();
        LoadOutcome {
            sequence: EventSequence::from_events(events),
            skipped_sources: Vec::new(),
        }
    }

    #[test]
    fn worked_scenario_end_to_end() {
        // 100 events, n=5, 10%/10% trim -> [10,90), 80 events, 76 valid
        // frames, guard 5 -> train 33, val 5, test 18.
        let ds = frame_workload(&framing(5), &spec(76), uniform_sequence(100));
        assert_eq!(ds.meta.events_after_trim, 80);
        assert_eq!(ds.meta.candidate_frames, 76);
        assert_eq!(ds.meta.valid_frames, 76);
        assert_eq!(ds.meta.shortfall, 0);
        assert_eq!(ds.meta.splits.train.count, 33);
        assert_eq!(ds.meta.splits.val.count, 5);
        assert_eq!(ds.meta.splits.test.count, 18);
        assert_eq!(ds.splits.val.frames[0].start, 43);
        assert_eq!(ds.splits.test.frames[0].start, 58);
        // Every frame carries the workload label.
        for split in Split::ALL {
            assert!(ds.splits.get(split).labels.iter().all(|&l| l == 1));
        }
    }

    #[test]
    fn oversized_target_records_shortfall_and_keeps_all() {
        let ds = frame_workload(&framing(5), &spec(1000), uniform_sequence(100));
        assert_eq!(ds.meta.valid_frames, 76);
        assert_eq!(ds.meta.selected_frames, 76);
        assert_eq!(ds.meta.shortfall, 924);
    }

    #[test]
    fn empty_sequence_produces_empty_dataset_not_error() {
        let ds = frame_workload(&framing(5), &spec(10), LoadOutcome::default());
        assert_eq!(ds.meta.events_total, 0);
        assert_eq!(ds.meta.valid_frames, 0);
        assert!(ds.splits.train.is_empty());
        assert!(ds.splits.test.is_empty());
    }

    #[test]
    fn no_events_shared_across_splits() {
        let n = 5;
        let ds = frame_workload(&framing(n), &spec(76), uniform_sequence(100));
        let max_train = ds.splits.train.frames.iter().map(|f| f.start).max();
        let min_val = ds.splits.val.frames.iter().map(|f| f.start).min();
        let max_val = ds.splits.val.frames.iter().map(|f| f.start).max();
        let min_test = ds.splits.test.frames.iter().map(|f| f.start).min();
        // Frames overlap iff their starts differ by less than n.
        assert!(min_val.expect("val") - max_train.expect("train") >= n);
        assert!(min_test.expect("test") - max_val.expect("val") >= n);
    }

    #[test]
    fn determinism_byte_identical_across_runs() {
        let run = || {
            let ds = frame_workload(&framing(5), &spec(76), uniform_sequence(100));
            serde_json::to_string(&ds).expect("serializes")
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn build_run_rejects_duplicate_labels_before_processing() {
        let config = RunConfig {
            framing: framing(5),
            workloads: vec![
                WorkloadSpec {
                    workload: "a".into(),
                    name: None,
                    label_id: 1,
                    target_frames: 1,
                    paths: vec!["/nope".into()],
                },
                WorkloadSpec {
                    workload: "b".into(),
                    name: None,
                    label_id: 1,
                    target_frames: 1,
                    paths: vec!["/nope".into()],
                },
            ],
        };
        assert!(matches!(
            build_run(&config),
            Err(DatasetError::DuplicateLabel { label_id: 1, .. })
        ));
    }

    #[test]
    fn build_run_merges_in_declaration_order() {
        use std::io::Write;
        let mut a = tempfile::NamedTempFile::new().expect("tempfile");
        let mut b = tempfile::NamedTempFile::new().expect("tempfile");
        for i in 0..20 {
            writeln!(a, "{}", i % 3).expect("write");
            writeln!(b, "{}", i % 5).expect("write");
        }

        let config = RunConfig {
            framing: FramingConfig {
                n: 2,
                head_trim: 0.0,
                tail_trim: 0.0,
                guard: Some(1),
            },
            workloads: vec![
                WorkloadSpec {
                    workload: "first".into(),
                    name: None,
                    label_id: 0,
                    target_frames: 100,
                    paths: vec![a.path().to_string_lossy().into_owned()],
                },
                WorkloadSpec {
                    workload: "second".into(),
                    name: None,
                    label_id: 1,
                    target_frames: 100,
                    paths: vec![b.path().to_string_lossy().into_owned()],
                },
            ],
        };

        let out = build_run(&config).expect("run succeeds");
        assert_eq!(out.merged.meta.workloads, vec!["first", "second"]);
        // All label-0 rows precede all label-1 rows in every split.
        for split in Split::ALL {
            let labels = &out.merged.splits.get(split).labels;
            let first_one = labels.iter().position(|&l| l == 1);
            if let Some(pos) = first_one {
                assert!(labels[pos..].iter().all(|&l| l == 1), "{labels:?}");
            }
        }
    }
}
