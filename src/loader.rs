//! Event loading: NDJSON trace sources → one ordered [`EventSequence`]
//!
//! Each workload names one or more newline-delimited JSON sources. Sources
//! are read in declared order, events from all sources are merged, and the
//! merged stream is stably sorted by timestamp (events without a timestamp
//! keep their arrival position). An unreadable source is skipped with a
//! warning; a workload whose sources all fail degrades to an empty sequence.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::record::{extract_code, extract_segment, extract_timestamp};
use crate::types::{Event, EventSequence};

/// Result of loading one workload's sources.
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub sequence: EventSequence,
    /// Sources that could not be opened or read
    pub skipped_sources: Vec<String>,
}

/// Load and merge all sources of one workload.
pub fn load_sources(paths: &[String]) -> LoadOutcome {
    let mut events = Vec::new();
    let mut skipped = Vec::new();

    for path in paths {
        match read_source(Path::new(path), &mut events) {
            Ok(counts) => {
                debug!(
                    path = %path,
                    parsed = counts.parsed,
                    skipped_lines = counts.skipped_lines,
                    "source read"
                );
                if counts.skipped_lines > 0 {
                    warn!(path = %path, skipped_lines = counts.skipped_lines, "malformed lines skipped");
                }
            }
            Err(err) => {
                warn!(path = %path, error = %err, "source unreadable, skipping");
                skipped.push(path.clone());
            }
        }
    }

    if events.is_empty() && !paths.is_empty() {
        warn!(sources = paths.len(), "no events loaded from any source");
    }

    LoadOutcome {
        sequence: EventSequence::from_events(events),
        skipped_sources: skipped,
    }
}

struct SourceCounts {
    parsed: usize,
    skipped_lines: usize,
}

/// Read one NDJSON source, appending parsed events.
///
/// Lines that are bare digit runs are accepted as event codes even when they
/// are not valid JSON records; anything else unparseable is counted and
/// dropped.
fn read_source(path: &Path, events: &mut Vec<Event>) -> std::io::Result<SourceCounts> {
    let reader = BufReader::new(File::open(path)?);
    let mut counts = SourceCounts { parsed: 0, skipped_lines: 0 };

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event = match serde_json::from_str::<Value>(line) {
            Ok(record) => match extract_code(&record) {
                Some(code) => {
                    let ordinal = events.len() as f64;
                    Some(Event {
                        code,
                        segment: extract_segment(&record),
                        order_key: extract_timestamp(&record).unwrap_or(ordinal),
                    })
                }
                None => None,
            },
            // A raw decimal line is a legitimate minimal trace format.
            Err(_) if line.bytes().all(|b| b.is_ascii_digit()) => {
                line.parse().ok().map(|code| Event {
                    code,
                    segment: 0,
                    order_key: events.len() as f64,
                })
            }
            Err(_) => None,
        };

        match event {
            Some(e) => {
                events.push(e);
                counts.parsed += 1;
            }
            None => counts.skipped_lines += 1,
        }
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_source(lines: &[&str]) -> NamedTempFile {
        let mut f = NamedTempFile::new().expect("tempfile");
        for line in lines {
            writeln!(f, "{line}").expect("write");
        }
        f
    }

    fn path_of(f: &NamedTempFile) -> String {
        f.path().to_string_lossy().into_owned()
    }

    #[test]
    fn loads_json_records_and_bare_digit_lines() {
        let src = write_source(&[
            r#"{"syscall": 1, "pod": "a"}"#,
            "",
            "42",
            "not an event",
            r#"{"no_code_here": true}"#,
            r#"{"nr": "7"}"#,
        ]);
        let out = load_sources(&[path_of(&src)]);
        assert_eq!(out.sequence.codes, vec![1, 42, 7]);
        assert_eq!(out.sequence.segments[1], 0);
        assert!(out.skipped_sources.is_empty());
    }

    #[test]
    fn sorts_by_timestamp_across_sources() {
        let a = write_source(&[r#"{"syscall": 10, "ts": 5.0}"#, r#"{"syscall": 11, "ts": 7.0}"#]);
        let b = write_source(&[r#"{"syscall": 20, "ts": 6.0}"#]);
        let out = load_sources(&[path_of(&a), path_of(&b)]);
        assert_eq!(out.sequence.codes, vec![10, 20, 11]);
    }

    #[test]
    fn events_without_timestamp_keep_arrival_order() {
        let src = write_source(&[
            r#"{"syscall": 1}"#,
            r#"{"syscall": 2}"#,
            r#"{"syscall": 3}"#,
        ]);
        let out = load_sources(&[path_of(&src)]);
        assert_eq!(out.sequence.codes, vec![1, 2, 3]);
    }

    #[test]
    fn unreadable_source_is_skipped_not_fatal() {
        let good = write_source(&["5"]);
        let missing = "/nonexistent/trace.ndjson".to_string();
        let out = load_sources(&[missing.clone(), path_of(&good)]);
        assert_eq!(out.sequence.codes, vec![5]);
        assert_eq!(out.skipped_sources, vec![missing]);
    }

    #[test]
    fn all_sources_failing_degrades_to_empty_sequence() {
        let out = load_sources(&["/nope/a".to_string(), "/nope/b".to_string()]);
        assert!(out.sequence.is_empty());
        assert_eq!(out.skipped_sources.len(), 2);
    }
}
