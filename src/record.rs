//! Field extraction rules for heterogeneous trace records
//!
//! Trace sources disagree on where the event code, segment identity, and
//! timestamp live inside a record. Each concern is expressed as a prioritized
//! list of key paths tried in order; the first match wins. The lists are
//! fixed at compile time — adding a source shape means adding a path here.

use chrono::DateTime;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Version tag of the segment hashing scheme.
///
/// The hash must be stable across runs and across implementations, so the
/// scheme is pinned: SHA-256 of the joined identity string, first 4 bytes
/// big-endian, reduced modulo 2^31 - 1.
pub const SEGMENT_HASH_VERSION: &str = "seg-sha256-trunc31.v1";

/// Key paths tried, in priority order, to find the event code.
const CODE_PATHS: &[&[&str]] = &[
    &["syscall"],
    &["syscall_id"],
    &["nr"],
    &["sc"],
    &["id"],
    &["event", "syscall", "id"],
    &["event", "id"],
    &["syscallNumber"],
];

/// Key paths whose string values, joined in order, form the segment identity.
const SEGMENT_PATHS: &[&[&str]] = &[
    &["pod"],
    &["job"],
    &["container_id"],
    &["k8s", "pod"],
    &["k8s", "job"],
    &["k8s", "container_id"],
];

/// Key paths tried, in priority order, to find the timestamp.
const TIMESTAMP_PATHS: &[&[&str]] = &[
    &["ts"],
    &["time"],
    &["timestamp"],
    &["@timestamp"],
    &["event", "time"],
    &["event", "ts"],
];

fn get_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = value;
    for key in path {
        cur = cur.as_object()?.get(*key)?;
    }
    Some(cur)
}

fn value_as_code(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().ok()
        }
        _ => None,
    }
}

/// Extract the event code from a record.
///
/// A bare JSON integer or digit string is accepted directly; objects are
/// probed through [`CODE_PATHS`]. Returns `None` when no rule matches —
/// such records are skipped by the loader, not errors.
pub fn extract_code(record: &Value) -> Option<u32> {
    if !record.is_object() {
        return value_as_code(record);
    }
    CODE_PATHS
        .iter()
        .filter_map(|path| get_path(record, path))
        .find_map(value_as_code)
}

/// Extract the segment key from a record.
///
/// All non-empty strings found under [`SEGMENT_PATHS`] are joined with `|`
/// and hashed; a record with none of the keys maps to segment 0 (treated as
/// a single unsegmented context).
pub fn extract_segment(record: &Value) -> u32 {
    let parts: Vec<&str> = SEGMENT_PATHS
        .iter()
        .filter_map(|path| get_path(record, path))
        .filter_map(Value::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        return 0;
    }
    hash_segment(&parts.join("|"))
}

/// Hash a segment identity string into `[0, 2^31 - 1)`.
pub fn hash_segment(identity: &str) -> u32 {
    let digest = Sha256::digest(identity.as_bytes());
    let word = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    word % (u32::MAX / 2) // 2^31 - 1
}

fn value_as_timestamp(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().map(normalize_epoch),
        Value::String(s) => {
            if let Ok(v) = s.parse::<f64>() {
                return Some(normalize_epoch(v));
            }
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.timestamp_nanos_opt().unwrap_or(0) as f64 / 1e9)
        }
        _ => None,
    }
}

/// Values above 1e12 are assumed to be nanoseconds and scaled to seconds.
/// The scale only has to be monotone within one workload, so the
/// nanosecond/millisecond ambiguity is acceptable.
fn normalize_epoch(v: f64) -> f64 {
    if v > 1e12 {
        v / 1e9
    } else {
        v
    }
}

/// Extract the timestamp from a record, in seconds.
///
/// Returns `None` when no rule matches; the loader then falls back to the
/// event's ordinal so ordering stays stable.
pub fn extract_timestamp(record: &Value) -> Option<f64> {
    if !record.is_object() {
        return None;
    }
    TIMESTAMP_PATHS
        .iter()
        .filter_map(|path| get_path(record, path))
        .find_map(value_as_timestamp)
}
