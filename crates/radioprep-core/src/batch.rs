//! Batch driver for the equalize pipeline.
//!
//! Walks a directory tree, and for every matching source file creates the
//! three output subdirectories beside it (idempotently), runs the pipeline,
//! and writes the derivative JPEGs plus the diagnostic report. A failing
//! file is logged and recorded, and the batch continues; the summary lists
//! failures with enough context to retry just those files.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

use crate::config::EqualizeConfig;
use crate::decoders;
use crate::exporters;
use crate::pipeline;
use crate::report;

/// A file the batch failed to process, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of one batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Count of files fully processed
    pub processed: usize,

    /// Files that failed, in encounter order
    pub failed: Vec<FailedFile>,
}

/// Collect every file under `root` whose name ends with `suffix`.
///
/// Entries are sorted by file name, so runs are deterministic regardless
/// of filesystem enumeration order.
pub fn collect_targets(root: &Path, suffix: &str) -> Result<Vec<PathBuf>, String> {
    if !root.is_dir() {
        return Err(format!("Not a directory: {}", root.display()));
    }

    let files: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(suffix))
                .unwrap_or(false)
        })
        .collect();

    Ok(files)
}

/// Create the three output subdirectories inside `dir` if absent.
/// Idempotent: succeeds when they already exist.
pub fn ensure_output_dirs(dir: &Path, config: &EqualizeConfig) -> Result<(), String> {
    for name in [
        &config.dirs.equalize,
        &config.dirs.adaptive_equalize,
        &config.dirs.contrast_stretch,
    ] {
        let path = dir.join(name);
        std::fs::create_dir_all(&path)
            .map_err(|e| format!("Failed to create output directory {}: {}", path.display(), e))?;
    }
    Ok(())
}

/// Process a single source file: decode, transform, write the three JPEGs
/// into their subdirectories and the report beside the source.
pub fn process_file(path: &Path, config: &EqualizeConfig) -> Result<(), String> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| format!("Invalid source filename: {}", path.display()))?;

    ensure_output_dirs(parent, config)?;

    let img = decoders::decode_radiograph(path)?;
    let set = pipeline::equalize_image(&img)?;

    let out_name = |suffix: &str| format!("{}{}{}", stem, suffix, config.output_ext);

    exporters::export_jpeg(
        &set.equalized,
        set.width,
        set.height,
        parent
            .join(&config.dirs.equalize)
            .join(out_name(&config.suffixes.equalize)),
    )?;
    exporters::export_jpeg(
        &set.adaptive,
        set.width,
        set.height,
        parent
            .join(&config.dirs.adaptive_equalize)
            .join(out_name(&config.suffixes.adaptive_equalize)),
    )?;
    exporters::export_jpeg(
        &set.stretched,
        set.width,
        set.height,
        parent
            .join(&config.dirs.contrast_stretch)
            .join(out_name(&config.suffixes.contrast_stretch)),
    )?;

    report::write_report(&set.report_pdf, path)?;

    Ok(())
}

/// Run the batch sequentially over every matching file under the
/// configured root. Per-file failures are logged and recorded; the batch
/// continues.
pub fn run(config: &EqualizeConfig) -> Result<BatchSummary, String> {
    let batch_start = Instant::now();
    let targets = collect_targets(&config.root_dir, &config.file_suffix)?;

    let mut summary = BatchSummary::default();
    let mut last_dir: Option<PathBuf> = None;

    for path in &targets {
        let dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        if last_dir.as_deref() != Some(dir.as_path()) {
            println!("Found directory: {}", dir.display());
            last_dir = Some(dir);
        }

        println!();
        println!("Processing image: {}", path.display());
        let start = Instant::now();

        match process_file(path, config) {
            Ok(()) => {
                println!("Time elapsed: {}", format_ms(start.elapsed()));
                summary.processed += 1;
            }
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
    println!("Total time elapsed: {}", format_hms(batch_start.elapsed()));
    println!("{} images processed", summary.processed);
    if !summary.failed.is_empty() {
        println!("{} images failed", summary.failed.len());
    }

    Ok(summary)
}

/// Format a duration as `MM:SS`.
pub fn format_ms(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Format a duration as `HH:MM:SS`.
pub fn format_hms(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::BufWriter;
    use tempfile::tempdir;

    fn write_sample_tiff(path: &Path, width: u32, height: u32) {
        // 16-bit diagonal gradient
        let data: Vec<u16> = (0..height)
            .flat_map(|y| {
                (0..width).map(move |x| {
                    ((x + y) as u64 * 65535 / (width + height - 2) as u64) as u16
                })
            })
            .collect();
        let file = File::create(path).unwrap();
        let mut encoder = tiff::encoder::TiffEncoder::new(BufWriter::new(file)).unwrap();
        encoder
            .write_image::<tiff::encoder::colortype::Gray16>(width, height, &data)
            .unwrap();
    }

    #[test]
    fn test_collect_targets_filters_and_sorts() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        write_sample_tiff(&dir.path().join("b.tif"), 8, 8);
        write_sample_tiff(&dir.path().join("a.tif"), 8, 8);
        write_sample_tiff(&dir.path().join("sub").join("c.tif"), 8, 8);
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let targets = collect_targets(dir.path(), ".tif").unwrap();

        let names: Vec<String> = targets
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.tif", "b.tif", "c.tif"]);
    }

    #[test]
    fn test_collect_targets_missing_root() {
        let result = collect_targets(Path::new("/nonexistent/root"), ".tif");
        assert!(result.is_err());
    }

    #[test]
    fn test_ensure_output_dirs_is_idempotent() {
        let dir = tempdir().unwrap();
        let config = EqualizeConfig::default();

        ensure_output_dirs(dir.path(), &config).unwrap();
        // Second call must not fail
        ensure_output_dirs(dir.path(), &config).unwrap();

        assert!(dir.path().join("Eq").is_dir());
        assert!(dir.path().join("Ad_Eq").is_dir());
        assert!(dir.path().join("Contrast").is_dir());
    }

    #[test]
    fn test_end_to_end_single_sample() {
        let dir = tempdir().unwrap();
        let sample = dir.path().join("sample.tif");
        write_sample_tiff(&sample, 100, 100);

        let config = EqualizeConfig {
            root_dir: dir.path().to_path_buf(),
            ..EqualizeConfig::default()
        };
        let summary = run(&config).unwrap();

        assert_eq!(summary.processed, 1);
        assert!(summary.failed.is_empty());

        let eq = dir.path().join("Eq").join("sample_Equalization.jpg");
        let ad = dir
            .path()
            .join("Ad_Eq")
            .join("sample_Adaptive_Equalization.jpg");
        let ct = dir
            .path()
            .join("Contrast")
            .join("sample_Contrast_Stretching.jpg");
        let diag = dir.path().join("sample_diag.pdf");

        for path in [&eq, &ad, &ct] {
            assert!(path.exists(), "missing output {}", path.display());
            let img = image::open(path).unwrap();
            assert_eq!(img.width(), 100);
            assert_eq!(img.height(), 100);
        }
        assert!(diag.exists());
    }

    #[test]
    fn test_batch_isolates_per_file_failures() {
        let dir = tempdir().unwrap();
        write_sample_tiff(&dir.path().join("good.tif"), 16, 16);
        // Not a TIFF at all
        std::fs::write(dir.path().join("corrupt.tif"), b"not a tiff").unwrap();

        let config = EqualizeConfig {
            root_dir: dir.path().to_path_buf(),
            ..EqualizeConfig::default()
        };
        let summary = run(&config).unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.failed[0].path.ends_with("corrupt.tif"));
        assert!(!summary.failed[0].error.is_empty());

        // The good file still produced its outputs
        assert!(dir
            .path()
            .join("Eq")
            .join("good_Equalization.jpg")
            .exists());
    }

    #[test]
    fn test_cleanup_restores_tree_after_batch() {
        let dir = tempdir().unwrap();
        write_sample_tiff(&dir.path().join("sample.tif"), 32, 32);

        let config = EqualizeConfig {
            root_dir: dir.path().to_path_buf(),
            ..EqualizeConfig::default()
        };
        run(&config).unwrap();
        assert!(dir.path().join("sample_diag.pdf").exists());

        let summary = crate::cleanup::run(dir.path()).unwrap();

        assert_eq!(summary.files_removed, 1);
        assert_eq!(summary.dirs_removed, 3);

        // Only the source file remains
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["sample.tif"]);
    }

    #[test]
    fn test_time_formatting() {
        assert_eq!(format_ms(Duration::from_secs(75)), "01:15");
        assert_eq!(format_hms(Duration::from_secs(3725)), "01:02:05");
        assert_eq!(format_hms(Duration::from_secs(0)), "00:00:00");
    }
}
