//! The equalize-and-report pipeline.
//!
//! One radiograph in, four products out: the three contrast-enhanced
//! variants plus the rendered diagnostic report. Each call is independent;
//! no state survives between invocations and all buffers are released when
//! the returned set is dropped.

use crate::decoders::Radiograph;
use crate::report;
use crate::transforms::{self, CLIP_LIMIT, REPORT_BINS};

/// The products of one pipeline invocation.
#[derive(Debug, Clone)]
pub struct EqualizedSet {
    /// Globally equalized variant, normalized intensities
    pub equalized: Vec<f32>,

    /// Adaptively equalized variant, normalized intensities
    pub adaptive: Vec<f32>,

    /// Contrast-stretched variant, normalized intensities
    pub stretched: Vec<f32>,

    /// Rendered diagnostic report (PDF bytes)
    pub report_pdf: Vec<u8>,

    pub width: u32,
    pub height: u32,
}

/// Run the three transforms over a decoded radiograph and render the
/// diagnostic report.
pub fn equalize_image(img: &Radiograph) -> Result<EqualizedSet, String> {
    let stretched = transforms::stretch_contrast(&img.data);
    let equalized = transforms::equalize_hist(&img.data, REPORT_BINS);
    let adaptive =
        transforms::equalize_adapthist(&img.data, img.width, img.height, CLIP_LIMIT, REPORT_BINS);

    let report_pdf = report::render_report(
        &img.data,
        &stretched,
        &equalized,
        &adaptive,
        img.width,
        img.height,
    )?;

    Ok(EqualizedSet {
        equalized,
        adaptive,
        stretched,
        report_pdf,
        width: img.width,
        height: img.height,
    })
}
