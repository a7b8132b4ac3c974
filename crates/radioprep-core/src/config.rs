//! Runtime configuration for the batch utilities.
//!
//! Everything the original workflow hard-coded (root directory, source
//! suffix, output directory names, output filename suffixes) lives in an
//! explicit configuration structure that can be loaded from a JSON file
//! and overridden from the command line.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

// Global verbose flag for controlling debug output
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set the global verbose flag. When true, debug messages will be printed.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
}

/// Check if verbose mode is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Print a message to stderr only if verbose mode is enabled.
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if $crate::config::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Names of the per-directory output subdirectories created next to each
/// source file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputDirs {
    pub equalize: String,
    pub adaptive_equalize: String,
    pub contrast_stretch: String,
}

impl Default for OutputDirs {
    fn default() -> Self {
        Self {
            equalize: "Eq".to_string(),
            adaptive_equalize: "Ad_Eq".to_string(),
            contrast_stretch: "Contrast".to_string(),
        }
    }
}

/// Suffixes appended to the source file stem when naming output files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSuffixes {
    pub equalize: String,
    pub adaptive_equalize: String,
    pub contrast_stretch: String,
}

impl Default for OutputSuffixes {
    fn default() -> Self {
        Self {
            equalize: "_Equalization".to_string(),
            adaptive_equalize: "_Adaptive_Equalization".to_string(),
            contrast_stretch: "_Contrast_Stretching".to_string(),
        }
    }
}

/// Configuration for the equalize batch driver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EqualizeConfig {
    /// Root directory to walk for source files.
    pub root_dir: PathBuf,

    /// Source file suffix to match (case-sensitive).
    pub file_suffix: String,

    /// Extension for the derivative images.
    pub output_ext: String,

    /// Output subdirectory names.
    pub dirs: OutputDirs,

    /// Output filename suffixes.
    pub suffixes: OutputSuffixes,
}

impl Default for EqualizeConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            file_suffix: ".tif".to_string(),
            output_ext: ".jpg".to_string(),
            dirs: OutputDirs::default(),
            suffixes: OutputSuffixes::default(),
        }
    }
}

/// Load an [`EqualizeConfig`] from a JSON file.
///
/// Missing fields fall back to their defaults, so a config file only needs
/// to name the values it wants to change.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EqualizeConfig, String> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
    serde_json::from_str(&json)
        .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_original_layout() {
        let config = EqualizeConfig::default();

        assert_eq!(config.file_suffix, ".tif");
        assert_eq!(config.output_ext, ".jpg");
        assert_eq!(config.dirs.equalize, "Eq");
        assert_eq!(config.dirs.adaptive_equalize, "Ad_Eq");
        assert_eq!(config.dirs.contrast_stretch, "Contrast");
        assert_eq!(config.suffixes.equalize, "_Equalization");
        assert_eq!(config.suffixes.adaptive_equalize, "_Adaptive_Equalization");
        assert_eq!(config.suffixes.contrast_stretch, "_Contrast_Stretching");
    }

    #[test]
    fn test_load_partial_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "file_suffix": ".tiff" }"#).unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(config.file_suffix, ".tiff");
        // Unspecified fields keep their defaults
        assert_eq!(config.dirs.equalize, "Eq");
    }

    #[test]
    fn test_load_missing_config_fails() {
        let result = load_config("/nonexistent/config.json");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to read config file"));
    }
}
