//! Tracegram CLI - build leakage-safe trace datasets from a run config
//!
//! Commands:
//! - make: run the full pipeline and write per-workload and merged outputs
//! - validate: check a run config for fatal errors without processing

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracegram::config::RunConfig;
use tracegram::error::DatasetError;
use tracegram::pipeline::{build_run, RunOutput};
use tracegram::types::{Split, SplitSet};
use tracegram::TRACEGRAM_VERSION;

/// Tracegram - leakage-safe framing engine for syscall event traces
#[derive(Parser)]
#[command(name = "tracegram")]
#[command(version = TRACEGRAM_VERSION)]
#[command(about = "Build fixed-width, leakage-safe trace datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and write datasets
    Make {
        /// Run config (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Output root directory
        #[arg(short, long, default_value = "dataset")]
        out: PathBuf,

        /// Replace an existing merged output directory
        #[arg(long)]
        overwrite: bool,
    },

    /// Validate a run config without processing
    Validate {
        /// Run config (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Make { config, out, overwrite } => cmd_make(&config, &out, overwrite),
        Commands::Validate { config, json } => cmd_validate(&config, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn cmd_make(config_path: &Path, out: &Path, overwrite: bool) -> Result<(), DatasetError> {
    let config = RunConfig::load(config_path)?;
    config.validate()?;

    let dataset_name = sanitize_basename(
        config_path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    let merged_dir = out.join("merged").join(&dataset_name);
    if merged_dir.exists() {
        if overwrite {
            fs::remove_dir_all(&merged_dir)?;
        } else {
            return Err(DatasetError::Config(format!(
                "output already exists: {} (pass --overwrite to replace it)",
                merged_dir.display()
            )));
        }
    }

    let output = build_run(&config)?;
    let mut written = Vec::new();

    for ds in &output.workloads {
        let root = out
            .join("workloads")
            .join(&ds.meta.workload)
            .join(format!("n{}-gram", ds.meta.n));
        for split in Split::ALL {
            write_split(&root, split, ds.splits.get(split), ds.meta.n, &mut written)?;
        }
        write_json(&root.join("meta.json"), &ds.meta, &mut written)?;
    }

    for split in Split::ALL {
        write_split(
            &merged_dir,
            split,
            output.merged.splits.get(split),
            output.merged.meta.n,
            &mut written,
        )?;
    }
    write_json(&merged_dir.join("meta.json"), &output.merged.meta, &mut written)?;

    print_summary(&output, &written);
    Ok(())
}

fn cmd_validate(config_path: &Path, json: bool) -> Result<(), DatasetError> {
    let config = RunConfig::load(config_path)?;
    match config.validate() {
        Ok(()) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": true,
                        "n": config.framing.n,
                        "guard": config.framing.guard_frames(),
                        "workloads": config.workloads.len(),
                    })
                );
            } else {
                println!(
                    "config ok: n={}, guard={}, {} workload(s)",
                    config.framing.n,
                    config.framing.guard_frames(),
                    config.workloads.len()
                );
            }
            Ok(())
        }
        Err(err) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "valid": false, "error": err.to_string() })
                );
            }
            Err(err)
        }
    }
}

/// Write one split as X.json (frame rows) and y.json (labels).
fn write_split(
    root: &Path,
    split: Split,
    set: &SplitSet,
    n: usize,
    written: &mut Vec<(PathBuf, Vec<usize>)>,
) -> Result<(), DatasetError> {
    let dir = root.join(split.as_str());
    fs::create_dir_all(&dir)?;

    let rows: Vec<&[u32]> = set.frames.iter().map(|f| f.codes.as_slice()).collect();

    let x_path = dir.join("X.json");
    fs::write(&x_path, serde_json::to_vec(&rows)?)?;
    written.push((x_path, vec![rows.len(), n]));

    let y_path = dir.join("y.json");
    fs::write(&y_path, serde_json::to_vec(&set.labels)?)?;
    written.push((y_path, vec![set.labels.len()]));
    Ok(())
}

fn write_json<T: serde::Serialize>(
    path: &Path,
    value: &T,
    written: &mut Vec<(PathBuf, Vec<usize>)>,
) -> Result<(), DatasetError> {
    fs::write(path, serde_json::to_vec_pretty(value)?)?;
    written.push((path.to_path_buf(), Vec::new()));
    Ok(())
}

fn print_summary(output: &RunOutput, written: &[(PathBuf, Vec<usize>)]) {
    let fancy = atty::is(atty::Stream::Stdout);
    if fancy {
        println!("===== OUTPUT SUMMARY =====");
    }
    for (path, shape) in written {
        if shape.is_empty() {
            println!("{}", path.display());
        } else {
            let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
            println!("{} shape=[{}]", path.display(), dims.join(", "));
        }
    }
    let m = &output.merged.meta;
    println!(
        "merged: n={} train={} val={} test={} classes={}",
        m.n, m.splits.train.count, m.splits.val.count, m.splits.test.count, m.workloads.len()
    );
    for ds in &output.workloads {
        if ds.meta.shortfall > 0 {
            println!(
                "warning: workload '{}' fell {} frames short of target {}",
                ds.meta.workload, ds.meta.shortfall, ds.meta.target_frames
            );
        }
    }
    if fancy {
        println!("==========================");
    }
}

/// Strip the extension and any filesystem-hostile characters from the config
/// file name; the result names the merged output directory.
fn sanitize_basename(name: String) -> String {
    let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(&name);
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(120)
        .collect();
    if cleaned.is_empty() {
        "dataset".to_string()
    } else {
        cleaned.trim_start_matches('.').to_string()
    }
}
