//! The `equalize` subcommand: run the pipeline over a directory tree.

use radioprep_core::batch::{self, BatchSummary, FailedFile};
use radioprep_core::config::{self, EqualizeConfig};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

pub fn cmd_equalize(
    root: PathBuf,
    suffix: Option<String>,
    config_path: Option<PathBuf>,
    threads: usize,
    report: Option<PathBuf>,
    verbose: bool,
) -> Result<(), String> {
    config::set_verbose(verbose);

    let mut cfg = match config_path {
        Some(path) => config::load_config(path)?,
        None => EqualizeConfig::default(),
    };

    // Command-line arguments override the config file
    cfg.root_dir = root;
    if let Some(suffix) = suffix {
        cfg.file_suffix = suffix;
    }

    let summary = if threads > 1 {
        run_parallel(&cfg, threads)?
    } else {
        batch::run(&cfg)?
    };

    if let Some(report_path) = report {
        write_failure_report(&report_path, &summary.failed)?;
    }

    if summary.failed.is_empty() {
        Ok(())
    } else {
        Err(format!("{} files failed to process", summary.failed.len()))
    }
}

/// Parallel variant of the batch driver. Output ordering differs from the
/// sequential run (completion order, with a running counter) but the set
/// of files processed is identical.
fn run_parallel(cfg: &EqualizeConfig, threads: usize) -> Result<BatchSummary, String> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| format!("Failed to configure thread pool: {}", e))?;

    let batch_start = Instant::now();
    let targets = batch::collect_targets(&cfg.root_dir, &cfg.file_suffix)?;
    let total = targets.len();
    println!("Found {} image files to process on {} threads", total, threads);

    let done = AtomicUsize::new(0);

    let results: Vec<Result<(), String>> = targets
        .par_iter()
        .map(|path| {
            let start = Instant::now();
            let result = batch::process_file(path, cfg);
            if result.is_ok() {
                let count = done.fetch_add(1, Ordering::SeqCst) + 1;
                println!(
                    "[{}/{}] Processed {} ({})",
                    count,
                    total,
                    path.display(),
                    batch::format_ms(start.elapsed())
                );
            }
            result
        })
        .collect();

    let mut summary = BatchSummary::default();
    for (path, result) in targets.iter().zip(results) {
        match result {
            Ok(()) => summary.processed += 1,
            Err(e) => {
                eprintln!("Failed to process {}: {}", path.display(), e);
                summary.failed.push(FailedFile {
                    path: path.clone(),
                    error: e,
                });
            }
        }
    }

    println!();
    println!("Total time elapsed: {}", batch::format_hms(batch_start.elapsed()));
    println!("{} images processed", summary.processed);
    if !summary.failed.is_empty() {
        println!("{} images failed", summary.failed.len());
    }

    Ok(summary)
}

/// Write the list of failed files as JSON, so a later run can retry just
/// those paths.
fn write_failure_report(path: &PathBuf, failed: &[FailedFile]) -> Result<(), String> {
    let json = serde_json::to_string_pretty(failed)
        .map_err(|e| format!("Failed to serialize failure report: {}", e))?;
    std::fs::write(path, json)
        .map_err(|e| format!("Failed to write failure report {}: {}", path.display(), e))?;
    println!("Failure report written to {}", path.display());
    Ok(())
}
