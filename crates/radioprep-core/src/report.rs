//! Diagnostic report rendering.
//!
//! Renders the eight-panel diagnostic figure for one source image: four
//! thumbnails (original, contrast-stretched, equalized, adaptively
//! equalized) across the top row at a shared scale, and below each one its
//! step-style intensity histogram with the cumulative distribution curve
//! overlaid. The figure is embedded in a one-page PDF saved beside the
//! source file as `<stem>_diag.pdf`.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use std::path::{Path, PathBuf};

use crate::exporters::to_rgb8;
use crate::stats;
use crate::transforms::REPORT_BINS;

/// Suffix appended to the source stem for the report file.
pub const REPORT_SUFFIX: &str = "_diag.pdf";

const PANEL_W: u32 = 256;
const IMG_H: u32 = 200;
const HIST_H: u32 = 160;
const PAD: u32 = 12;

const HIST_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const CDF_COLOR: Rgb<u8> = Rgb([200, 0, 0]);
const FRAME_COLOR: Rgb<u8> = Rgb([120, 120, 120]);
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Render the diagnostic figure for the four image variants and return it
/// as PDF bytes. All four rasters share the source dimensions.
pub fn render_report(
    original: &[f32],
    stretched: &[f32],
    equalized: &[f32],
    adaptive: &[f32],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, String> {
    let canvas = render_figure(
        &[original, stretched, equalized, adaptive],
        width,
        height,
    )?;
    figure_to_pdf(&canvas)
}

/// Report path for a source file: extension replaced by the diagnostic
/// suffix (`X.tif` -> `X_diag.pdf`).
pub fn report_path(source: &Path) -> Result<PathBuf, String> {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| format!("Invalid source filename: {}", source.display()))?;
    let parent = source.parent().unwrap_or(Path::new("."));
    Ok(parent.join(format!("{}{}", stem, REPORT_SUFFIX)))
}

/// Render the report and write it beside the source file.
pub fn write_report(pdf_bytes: &[u8], source: &Path) -> Result<PathBuf, String> {
    let path = report_path(source)?;
    std::fs::write(&path, pdf_bytes)
        .map_err(|e| format!("Failed to write report {}: {}", path.display(), e))?;
    Ok(path)
}

/// Draw the 2x4 panel grid onto a white canvas.
fn render_figure(variants: &[&[f32]; 4], width: u32, height: u32) -> Result<RgbImage, String> {
    let canvas_w = PAD + 4 * (PANEL_W + PAD);
    let canvas_h = PAD + IMG_H + PAD + HIST_H + PAD;
    let mut canvas = RgbImage::from_pixel(canvas_w, canvas_h, BACKGROUND);

    for (i, data) in variants.iter().enumerate() {
        let panel_x = PAD + i as u32 * (PANEL_W + PAD);

        draw_thumbnail(&mut canvas, data, width, height, panel_x, PAD)?;
        draw_histogram_panel(&mut canvas, data, panel_x, PAD + IMG_H + PAD);
    }

    Ok(canvas)
}

/// Resize one variant to fit its panel (shared scale across all panels
/// since all variants share the source dimensions) and blit it centered.
fn draw_thumbnail(
    canvas: &mut RgbImage,
    data: &[f32],
    width: u32,
    height: u32,
    panel_x: u32,
    panel_y: u32,
) -> Result<(), String> {
    let img = to_rgb8(data, width, height)?;

    let scale = (PANEL_W as f32 / width as f32).min(IMG_H as f32 / height as f32);
    let thumb_w = ((width as f32 * scale) as u32).max(1);
    let thumb_h = ((height as f32 * scale) as u32).max(1);
    let thumb = imageops::resize(&img, thumb_w, thumb_h, FilterType::Triangle);

    let x = panel_x + (PANEL_W - thumb_w) / 2;
    let y = panel_y + (IMG_H - thumb_h) / 2;
    imageops::overlay(canvas, &thumb, x as i64, y as i64);
    Ok(())
}

/// Draw the step-style histogram (black) with the CDF curve (red) overlaid,
/// framed, for one variant.
fn draw_histogram_panel(canvas: &mut RgbImage, data: &[f32], panel_x: u32, panel_y: u32) {
    let hist = stats::histogram(data, REPORT_BINS);

    // Aggregate the full-resolution histogram into one count per pixel
    // column so the step outline is drawable at panel width
    let cols = PANEL_W as usize;
    let mut col_counts = vec![0u64; cols];
    for (bin, &count) in hist.bins.iter().enumerate() {
        col_counts[bin * cols / REPORT_BINS] += count as u64;
    }

    let max_count = col_counts.iter().copied().max().unwrap_or(0).max(1);
    let total: u64 = col_counts.iter().sum();

    let base_y = (panel_y + HIST_H) as f32 - 1.0;
    let col_height =
        |count: u64| base_y - (count as f32 / max_count as f32) * (HIST_H as f32 - 2.0);

    // Step outline: horizontal run per column, vertical riser between columns
    let mut prev_y = col_height(col_counts[0]);
    for (i, &count) in col_counts.iter().enumerate() {
        let x0 = (panel_x + i as u32) as f32;
        let y = col_height(count);
        if i > 0 && (y - prev_y).abs() >= 0.5 {
            draw_line_segment_mut(canvas, (x0, prev_y), (x0, y), HIST_COLOR);
        }
        draw_line_segment_mut(canvas, (x0, y), (x0 + 1.0, y), HIST_COLOR);
        prev_y = y;
    }

    // Cumulative distribution on the same panel, scaled to full height
    if total > 0 {
        let mut running = 0u64;
        let mut prev = (panel_x as f32, base_y);
        for (i, &count) in col_counts.iter().enumerate() {
            running += count;
            let x = (panel_x + i as u32) as f32;
            let y = base_y - (running as f32 / total as f32) * (HIST_H as f32 - 2.0);
            draw_line_segment_mut(canvas, prev, (x, y), CDF_COLOR);
            prev = (x, y);
        }
    }

    draw_hollow_rect_mut(
        canvas,
        Rect::at(panel_x as i32, panel_y as i32).of_size(PANEL_W, HIST_H),
        FRAME_COLOR,
    );
}

/// Embed the rendered figure in a one-page landscape A4 PDF.
fn figure_to_pdf(canvas: &RgbImage) -> Result<Vec<u8>, String> {
    let (page_w, page_h) = (Mm(297.0), Mm(210.0));

    let img_width = canvas.width() as usize;
    let img_height = canvas.height() as usize;
    let raw = RawImage {
        pixels: RawImageData::U8(canvas.as_raw().clone()),
        width: img_width,
        height: img_height,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };

    let mut doc = PdfDocument::new("Radiograph equalization diagnostics");
    let xobject_id = doc.add_image(&raw);

    // Scale to fit within the page margins, preserving aspect ratio
    let margin_mm: f32 = 10.0;
    let usable_w_pt = Mm(page_w.0 - 2.0 * margin_mm).into_pt().0;
    let usable_h_pt = Mm(page_h.0 - 2.0 * margin_mm).into_pt().0;

    let dpi: f32 = 96.0;
    let img_w_pt = img_width as f32 / dpi * 72.0;
    let img_h_pt = img_height as f32 / dpi * 72.0;

    let scale = (usable_w_pt / img_w_pt).min(usable_h_pt / img_h_pt);
    let rendered_w_pt = img_w_pt * scale;
    let rendered_h_pt = img_h_pt * scale;

    let margin_pt = Mm(margin_mm).into_pt().0;
    let x_offset = margin_pt + (usable_w_pt - rendered_w_pt) / 2.0;
    let y_offset = margin_pt + (usable_h_pt - rendered_h_pt) / 2.0;

    let ops = vec![Op::UseXobject {
        id: xobject_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(x_offset)),
            translate_y: Some(Pt(y_offset)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(dpi),
            rotate: None,
        },
    }];

    doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ramp(width: u32, height: u32) -> Vec<f32> {
        (0..width * height)
            .map(|i| (i % width) as f32 / (width - 1) as f32)
            .collect()
    }

    #[test]
    fn test_render_report_produces_pdf_bytes() {
        let data = ramp(40, 30);
        let bytes = render_report(&data, &data, &data, &data, 40, 30).unwrap();

        assert!(!bytes.is_empty());
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn test_report_path_replaces_extension() {
        let path = report_path(Path::new("/data/scans/sample.tif")).unwrap();
        assert_eq!(path, PathBuf::from("/data/scans/sample_diag.pdf"));
    }

    #[test]
    fn test_write_report_creates_sibling_file() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("scan.tif");

        let data = ramp(20, 20);
        let bytes = render_report(&data, &data, &data, &data, 20, 20).unwrap();
        let written = write_report(&bytes, &source).unwrap();

        assert_eq!(written, dir.path().join("scan_diag.pdf"));
        assert!(written.exists());
    }

    #[test]
    fn test_render_report_constant_image() {
        // A zero-variance image still renders (its histogram is one spike)
        let data = vec![0.5f32; 25 * 25];
        let bytes = render_report(&data, &data, &data, &data, 25, 25).unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }
}
