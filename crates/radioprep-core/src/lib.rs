//! Radioprep Core Library
//!
//! Batch utilities for processing radiograph TIFF files: contrast
//! enhancement (global equalization, adaptive equalization, contrast
//! stretching), diagnostic report generation, cleanup of generated
//! output, and in-place resaving via an external image tool.

pub mod batch;
pub mod cleanup;
pub mod config;
pub mod decoders;
pub mod exporters;
pub mod pipeline;
pub mod report;
pub mod resave;
pub mod stats;
pub mod transforms;

// Re-export commonly used types
pub use batch::{BatchSummary, FailedFile};
pub use config::EqualizeConfig;
pub use decoders::Radiograph;
pub use pipeline::{equalize_image, EqualizedSet};
