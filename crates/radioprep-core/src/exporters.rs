//! Derivative image export.
//!
//! Converts normalized single-channel rasters to 8-bit with the gray
//! channel replicated into three identical channels, for downstream
//! viewers that expect color images, and writes them as JPEG.

use image::RgbImage;
use std::path::Path;

/// Convert a normalized raster to an 8-bit, 3-channel image with all three
/// channels identical (grayscale stored as RGB).
pub fn to_rgb8(data: &[f32], width: u32, height: u32) -> Result<RgbImage, String> {
    let expected = (width * height) as usize;
    if data.len() != expected {
        return Err(format!(
            "Raster size mismatch: expected {} samples, got {}",
            expected,
            data.len()
        ));
    }

    let mut raw = Vec::with_capacity(expected * 3);
    for &v in data {
        let byte = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        raw.push(byte);
        raw.push(byte);
        raw.push(byte);
    }

    RgbImage::from_raw(width, height, raw)
        .ok_or_else(|| "Failed to build RGB buffer from raster".to_string())
}

/// Export a normalized raster as an 8-bit grayscale-as-RGB JPEG.
pub fn export_jpeg<P: AsRef<Path>>(
    data: &[f32],
    width: u32,
    height: u32,
    path: P,
) -> Result<(), String> {
    let img = to_rgb8(data, width, height)?;
    img.save_with_format(path.as_ref(), image::ImageFormat::Jpeg)
        .map_err(|e| format!("Failed to write JPEG {}: {}", path.as_ref().display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_to_rgb8_channels_identical() {
        let data: Vec<f32> = (0..64).map(|i| i as f32 / 63.0).collect();
        let img = to_rgb8(&data, 8, 8).unwrap();

        for pixel in img.pixels() {
            assert_eq!(pixel.0[0], pixel.0[1]);
            assert_eq!(pixel.0[1], pixel.0[2]);
        }
    }

    #[test]
    fn test_to_rgb8_scaling_and_clamping() {
        let data = vec![-0.5, 0.0, 0.5, 1.0, 1.5, 0.25];
        let img = to_rgb8(&data, 3, 2).unwrap();

        let bytes: Vec<u8> = img.pixels().map(|p| p.0[0]).collect();
        assert_eq!(bytes, vec![0, 0, 128, 255, 255, 64]);
    }

    #[test]
    fn test_to_rgb8_size_mismatch() {
        let data = vec![0.5; 10];
        let result = to_rgb8(&data, 4, 4);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("size mismatch"));
    }

    #[test]
    fn test_export_jpeg_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.jpg");

        let data: Vec<f32> = (0..100 * 100)
            .map(|i| (i % 100) as f32 / 99.0)
            .collect();
        export_jpeg(&data, 100, 100, &path).unwrap();

        assert!(path.exists());
        let reloaded = image::open(&path).unwrap();
        assert_eq!(reloaded.width(), 100);
        assert_eq!(reloaded.height(), 100);
    }

    #[test]
    fn test_export_jpeg_invalid_path() {
        let data = vec![0.5; 16];
        let result = export_jpeg(&data, 4, 4, "/nonexistent/directory/out.jpg");
        assert!(result.is_err());
    }
}
