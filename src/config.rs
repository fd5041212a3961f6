//! Run configuration: framing parameters and the workload list
//!
//! Deserialized from JSON. All validation failures here are fatal
//! configuration errors, reported with the offending value before any output
//! is produced.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::DatasetError;
use crate::types::{TrimFractions, WorkloadSpec};

fn default_trim() -> f64 {
    0.10
}

/// Global framing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramingConfig {
    /// Frame width (events per frame). Required, >= 1.
    pub n: usize,
    /// Leading fraction of events dropped before windowing
    #[serde(default = "default_trim")]
    pub head_trim: f64,
    /// Trailing fraction of events dropped before windowing
    #[serde(default = "default_trim")]
    pub tail_trim: f64,
    /// Frames discarded on each side of each split cut. Defaults to `n`.
    /// A smaller guard still avoids exact-duplicate windows but admits
    /// partial overlap; treat deviations as a deliberate experiment setting.
    #[serde(default)]
    pub guard: Option<usize>,
}

impl FramingConfig {
    pub fn guard_frames(&self) -> usize {
        self.guard.unwrap_or(self.n)
    }

    pub fn trim(&self) -> TrimFractions {
        TrimFractions {
            head: self.head_trim,
            tail: self.tail_trim,
        }
    }
}

/// A complete dataset run: framing parameters plus labeled workloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub framing: FramingConfig,
    pub workloads: Vec<WorkloadSpec>,
}

impl RunConfig {
    /// Parse from a JSON string. Does not validate; call [`validate`].
    ///
    /// [`validate`]: RunConfig::validate
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Check all fatal configuration invariants.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.framing.n == 0 {
            return Err(DatasetError::Config("framing.n must be >= 1 (got 0)".into()));
        }
        for (field, value) in [
            ("framing.head_trim", self.framing.head_trim),
            ("framing.tail_trim", self.framing.tail_trim),
        ] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(DatasetError::Config(format!(
                    "{field} must be within [0, 1] (got {value})"
                )));
            }
        }
        if self.workloads.is_empty() {
            return Err(DatasetError::Config("workloads list is empty".into()));
        }

        let mut seen: HashMap<i64, &str> = HashMap::new();
        for spec in &self.workloads {
            if let Some(first) = seen.insert(spec.label_id, &spec.workload) {
                return Err(DatasetError::DuplicateLabel {
                    label_id: spec.label_id,
                    first: first.to_string(),
                    second: spec.workload.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config_json(workloads: &str) -> String {
        format!(r#"{{"framing": {{"n": 5}}, "workloads": {workloads}}}"#)
    }

    fn one_workload(id: &str, label: i64) -> String {
        format!(
            r#"{{"workload": "{id}", "label_id": {label}, "target_frames": 10, "paths": ["a.ndjson"]}}"#
        )
    }

    #[test]
    fn defaults_fill_in_trims_and_guard() {
        let cfg = RunConfig::from_json(&config_json(&format!("[{}]", one_workload("w", 0))))
            .expect("parses");
        assert_eq!(cfg.framing.head_trim, 0.10);
        assert_eq!(cfg.framing.tail_trim, 0.10);
        assert_eq!(cfg.framing.guard_frames(), 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn explicit_guard_overrides_default() {
        let cfg = RunConfig::from_json(
            r#"{"framing": {"n": 5, "guard": 2}, "workloads":
                [{"workload": "w", "label_id": 0, "target_frames": 1, "paths": []}]}"#,
        )
        .expect("parses");
        assert_eq!(cfg.framing.guard_frames(), 2);
    }

    #[test]
    fn zero_n_is_a_config_error() {
        let cfg = RunConfig::from_json(
            &config_json(&format!("[{}]", one_workload("w", 0))).replace("\"n\": 5", "\"n\": 0"),
        )
        .expect("parses");
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("framing.n"));
    }

    #[test]
    fn empty_workload_list_is_a_config_error() {
        let cfg = RunConfig::from_json(&config_json("[]")).expect("parses");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn duplicate_label_ids_name_both_workloads() {
        let cfg = RunConfig::from_json(&config_json(&format!(
            "[{}, {}]",
            one_workload("noise", 1),
            one_workload("miner", 1)
        )))
        .expect("parses");
        let err = cfg.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("noise") && msg.contains("miner") && msg.contains('1'), "{msg}");
    }

    #[test]
    fn out_of_range_trim_is_rejected() {
        let cfg = RunConfig::from_json(
            &config_json(&format!("[{}]", one_workload("w", 0)))
                .replace(r#"{"n": 5}"#, r#"{"n": 5, "head_trim": 1.5}"#),
        )
        .expect("parses");
        assert!(cfg.validate().is_err());
    }
}
