//! In-place resave of TIFF files via an external image tool.
//!
//! Useful for repairing damaged TIFF files written by other programs.
//! Each file is handed to the tool as an explicit argument vector; no
//! shell command line is ever constructed, so paths with special
//! characters need no quoting.

use std::path::Path;
use std::process::Command;
use walkdir::WalkDir;

use crate::batch::FailedFile;
use crate::verbose_println;

/// Default external tool. Requires that it be available in the PATH.
pub const DEFAULT_TOOL: &str = "mogrify";

/// Outcome of one resave run.
#[derive(Debug, Default)]
pub struct ResaveSummary {
    /// Files successfully rewritten
    pub resaved: usize,

    /// Files the tool failed on, with the reason
    pub failed: Vec<FailedFile>,
}

/// Rewrite every `*.tif` file under `root` in place by invoking
/// `<tool> -format tif <path>` once per file. Per-file failures (tool
/// missing, non-zero exit) are recorded and the run continues.
pub fn run(root: &Path, tool: &str) -> Result<ResaveSummary, String> {
    if !root.is_dir() {
        return Err(format!("Not a directory: {}", root.display()));
    }

    let mut summary = ResaveSummary::default();

    let files: Vec<_> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|n| n.ends_with(".tif"))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();

    for path in files {
        println!("Resaving: {}", path.display());
        match resave_one(&path, tool) {
            Ok(()) => {
                verbose_println!("Resaved {}", path.display());
                summary.resaved += 1;
            }
            Err(e) => {
                eprintln!("Failed to resave {}: {}", path.display(), e);
                summary.failed.push(FailedFile { path, error: e });
            }
        }
    }

    println!("{} files resaved, {} failed", summary.resaved, summary.failed.len());
    Ok(summary)
}

fn resave_one(path: &Path, tool: &str) -> Result<(), String> {
    let status = Command::new(tool)
        .args(["-format", "tif"])
        .arg(path)
        .status()
        .map_err(|e| format!("Failed to run {}: {}", tool, e))?;

    if !status.success() {
        return Err(format!("{} exited with status {}", tool, status));
    }
    Ok(())
}
