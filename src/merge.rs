//! Merging per-workload datasets into the terminal combined dataset
//!
//! For each split independently, every workload's frame and label arrays are
//! concatenated in WorkloadSpec declaration order. The order is a contract:
//! it determines the row positions of the merged arrays and therefore the
//! reproducibility of anything downstream that is row-position dependent.

use std::collections::BTreeMap;

use tracing::info;

use crate::dataset::SplitMatrix;
use crate::error::DatasetError;
use crate::types::{
    MergedDataset, MergedMeta, PerSplit, Split, SplitCount, SplitSet, WorkloadDataset,
};

/// Concatenate all workload datasets, in the given (declaration) order.
///
/// Zero workloads yields a merged dataset with all-empty splits, not an
/// error. Label-id uniqueness is enforced earlier, at configuration
/// validation; this function assumes it.
pub fn merge_datasets(datasets: &[WorkloadDataset], n: usize) -> MergedDataset {
    let mut splits: PerSplit<SplitSet> = PerSplit::default();
    for split in Split::ALL {
        let bucket = splits.get_mut(split);
        for ds in datasets {
            let part = ds.splits.get(split);
            bucket.frames.extend(part.frames.iter().cloned());
            bucket.labels.extend(part.labels.iter().copied());
        }
        info!(
            split = split.as_str(),
            rows = bucket.len(),
            classes = datasets.len(),
            "merged split"
        );
    }

    let label_map: BTreeMap<String, i64> = datasets
        .iter()
        .map(|d| (d.meta.workload.clone(), d.meta.label_id))
        .collect();
    let workloads = datasets.iter().map(|d| d.meta.workload.clone()).collect();

    let meta = MergedMeta {
        n,
        splits: PerSplit {
            train: SplitCount { count: splits.train.len() },
            val: SplitCount { count: splits.val.len() },
            test: SplitCount { count: splits.test.len() },
        },
        label_map,
        workloads,
    };

    MergedDataset { splits, meta }
}

/// Final shape validation before a run may signal success.
///
/// Every frame array's second dimension must equal `n`, in every workload
/// split and in the merged splits. Violations are fatal.
pub fn validate_widths(
    datasets: &[WorkloadDataset],
    merged: &MergedDataset,
    n: usize,
) -> Result<(), DatasetError> {
    for ds in datasets {
        for split in Split::ALL {
            SplitMatrix::from_split_set(ds.splits.get(split), n, &ds.meta.workload, split)?;
        }
    }
    for split in Split::ALL {
        SplitMatrix::from_split_set(merged.splits.get(split), n, "merged", split)?;
    }
    Ok(())
}
