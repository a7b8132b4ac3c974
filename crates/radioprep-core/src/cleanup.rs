//! Cleanup of generated pipeline output.
//!
//! Removes every diagnostic report file and every generated output
//! directory under a root, deepest entries first so removals never
//! invalidate pending traversal state. Directory matching is by exact
//! name: the original workflow matched substrings, which made `Eq` also
//! match `Ad_Eq` (and would have matched unrelated directories like
//! `Equipment`).
//!
//! Failure policy: a path that cannot be removed is logged and skipped;
//! the run continues and the summary counts the failures.

use std::path::Path;
use walkdir::WalkDir;

use crate::verbose_println;

/// Report files end with this suffix.
pub const DIAG_SUFFIX: &str = "diag.pdf";

/// Exact names of the generated output directories.
pub const GENERATED_DIRS: &[&str] = &["Ad_Eq", "Contrast", "Eq"];

/// Outcome of one cleanup run.
#[derive(Debug, Default)]
pub struct CleanupSummary {
    /// Diagnostic files removed
    pub files_removed: usize,

    /// Generated directories removed (with their contents)
    pub dirs_removed: usize,

    /// Paths that could not be removed
    pub failures: usize,
}

/// Remove every `*diag.pdf` file and every generated output directory
/// under `root`. Non-matching files and directories are untouched.
pub fn run(root: &Path) -> Result<CleanupSummary, String> {
    if !root.is_dir() {
        return Err(format!("Not a directory: {}", root.display()));
    }

    let mut summary = CleanupSummary::default();

    // Pass 1: diagnostic files, deepest first
    for entry in WalkDir::new(root)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .map(|n| n.ends_with(DIAG_SUFFIX))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => {
                verbose_println!("Removed file: {}", entry.path().display());
                summary.files_removed += 1;
            }
            Err(e) => {
                eprintln!("Failed to remove {}: {}", entry.path().display(), e);
                summary.failures += 1;
            }
        }
    }

    // Pass 2: generated directories, deepest first
    for entry in WalkDir::new(root)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .map(|n| GENERATED_DIRS.contains(&n))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        match std::fs::remove_dir_all(entry.path()) {
            Ok(()) => {
                verbose_println!("Removed directory: {}", entry.path().display());
                summary.dirs_removed += 1;
            }
            // A parent may already have taken this directory with it
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                eprintln!("Failed to remove {}: {}", entry.path().display(), e);
                summary.failures += 1;
            }
        }
    }

    Ok(summary)
}
