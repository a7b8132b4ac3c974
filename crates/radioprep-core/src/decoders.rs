//! Radiograph decoding.
//!
//! Reads TIFF source files into a single-channel normalized raster. Color
//! sources are reduced to luma; the transforms downstream only operate on
//! grayscale intensities.

use std::path::Path;

/// A decoded radiograph.
#[derive(Debug, Clone)]
pub struct Radiograph {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Single-channel intensity data (f32, 0.0-1.0 range), row-major
    pub data: Vec<f32>,

    /// Bit depth of the source samples (8, 16, 32, ...)
    pub source_bit_depth: u8,
}

/// Decode a radiograph from a file path.
pub fn decode_radiograph<P: AsRef<Path>>(path: P) -> Result<Radiograph, String> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| "No file extension found".to_string())?;

    match extension.as_str() {
        "tif" | "tiff" => decode_tiff(path),
        _ => Err(format!("Unsupported file format: {}", extension)),
    }
}

/// Decode a TIFF file.
fn decode_tiff<P: AsRef<Path>>(path: P) -> Result<Radiograph, String> {
    use std::fs::File;
    use std::io::BufReader;
    use tiff::decoder::Limits;

    let file = File::open(path.as_ref()).map_err(|e| format!("Failed to open TIFF file: {}", e))?;

    // Raise limits for large radiograph scans (up to 1GB uncompressed)
    let mut limits = Limits::default();
    limits.decoding_buffer_size = 1024 * 1024 * 1024;
    limits.ifd_value_size = 1024 * 1024 * 1024;
    limits.intermediate_buffer_size = 1024 * 1024 * 1024;

    let mut decoder = tiff::decoder::Decoder::new(BufReader::new(file))
        .map_err(|e| format!("Failed to create TIFF decoder: {}", e))?
        .with_limits(limits);

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| format!("Failed to get TIFF dimensions: {}", e))?;

    let color_type = decoder
        .colortype()
        .map_err(|e| format!("Failed to get TIFF color type: {}", e))?;

    let image_data = decoder
        .read_image()
        .map_err(|e| format!("Failed to read TIFF image data: {}", e))?;

    let source_bit_depth = sample_bit_depth(color_type)?;

    let data = match image_data {
        tiff::decoder::DecodingResult::U8(buf) => collapse_samples(&buf, width, height, color_type)?,
        tiff::decoder::DecodingResult::U16(buf) => {
            collapse_samples(&buf, width, height, color_type)?
        }
        tiff::decoder::DecodingResult::U32(buf) => {
            collapse_samples(&buf, width, height, color_type)?
        }
        tiff::decoder::DecodingResult::U64(buf) => {
            collapse_samples(&buf, width, height, color_type)?
        }
        tiff::decoder::DecodingResult::F32(buf) => {
            collapse_samples(&buf, width, height, color_type)?
        }
        tiff::decoder::DecodingResult::F64(buf) => {
            collapse_samples(&buf, width, height, color_type)?
        }
        _ => return Err("Signed integer TIFF formats not supported".to_string()),
    };

    Ok(Radiograph {
        width,
        height,
        data,
        source_bit_depth,
    })
}

/// Bit depth of a single sample for the given color type.
fn sample_bit_depth(color_type: tiff::ColorType) -> Result<u8, String> {
    match color_type {
        tiff::ColorType::Gray(bits)
        | tiff::ColorType::RGB(bits)
        | tiff::ColorType::RGBA(bits) => Ok(bits),
        other => Err(format!("Unsupported TIFF color type: {:?}", other)),
    }
}

// =============================================================================
// Generic sample trait and decoder to eliminate per-type duplication
// =============================================================================

/// Trait for TIFF sample types that can be normalized to f32.
trait Sample: Copy {
    /// Normalize this value to f32 in range [0.0, 1.0]
    fn to_normalized_f32(self) -> f32;
}

impl Sample for u8 {
    #[inline]
    fn to_normalized_f32(self) -> f32 {
        self as f32 / 255.0
    }
}

impl Sample for u16 {
    #[inline]
    fn to_normalized_f32(self) -> f32 {
        self as f32 / 65535.0
    }
}

impl Sample for u32 {
    #[inline]
    fn to_normalized_f32(self) -> f32 {
        self as f32 / u32::MAX as f32
    }
}

impl Sample for u64 {
    #[inline]
    fn to_normalized_f32(self) -> f32 {
        self as f32 / u64::MAX as f32
    }
}

impl Sample for f32 {
    #[inline]
    fn to_normalized_f32(self) -> f32 {
        self
    }
}

impl Sample for f64 {
    #[inline]
    fn to_normalized_f32(self) -> f32 {
        self as f32
    }
}

/// Collapse a decoded sample buffer to a single normalized channel.
///
/// Grayscale sources map directly; RGB and RGBA sources are reduced to luma
/// with Rec.709 weights (alpha ignored).
fn collapse_samples<T: Sample>(
    buf: &[T],
    width: u32,
    height: u32,
    color_type: tiff::ColorType,
) -> Result<Vec<f32>, String> {
    let channels: u32 = match color_type {
        tiff::ColorType::Gray(_) => 1,
        tiff::ColorType::RGB(_) => 3,
        tiff::ColorType::RGBA(_) => 4,
        tiff::ColorType::CMYK(_) => return Err("CMYK color type not supported".to_string()),
        tiff::ColorType::YCbCr(_) => return Err("YCbCr color type not supported".to_string()),
        tiff::ColorType::Palette(_) => return Err("Palette color type not supported".to_string()),
        other => return Err(format!("Unknown TIFF color type: {:?}", other)),
    };

    let expected_len = (width * height * channels) as usize;
    if buf.len() != expected_len {
        return Err(format!(
            "TIFF buffer size mismatch: expected {}, got {}",
            expected_len,
            buf.len()
        ));
    }

    match channels {
        1 => Ok(buf.iter().map(|&v| v.to_normalized_f32()).collect()),
        _ => {
            // Rec.709 luma reduction, alpha dropped
            let mut gray = Vec::with_capacity((width * height) as usize);
            for px in buf.chunks_exact(channels as usize) {
                let r = px[0].to_normalized_f32();
                let g = px[1].to_normalized_f32();
                let b = px[2].to_normalized_f32();
                gray.push(0.2126 * r + 0.7152 * g + 0.0722 * b);
            }
            Ok(gray)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::BufWriter;
    use tempfile::tempdir;

    fn write_gray16_tiff(path: &std::path::Path, width: u32, height: u32, data: &[u16]) {
        let file = File::create(path).unwrap();
        let mut encoder = tiff::encoder::TiffEncoder::new(BufWriter::new(file)).unwrap();
        encoder
            .write_image::<tiff::encoder::colortype::Gray16>(width, height, data)
            .unwrap();
    }

    // Returning drops the encoder and flushes the file
    fn write_rgb8_tiff(path: &std::path::Path, width: u32, height: u32, data: &[u8]) {
        let file = File::create(path).unwrap();
        let mut encoder = tiff::encoder::TiffEncoder::new(BufWriter::new(file)).unwrap();
        encoder
            .write_image::<tiff::encoder::colortype::RGB8>(width, height, data)
            .unwrap();
    }

    #[test]
    fn test_decode_gray16_tiff() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ramp.tif");

        // Horizontal 16-bit ramp
        let width = 64u32;
        let height = 16u32;
        let data: Vec<u16> = (0..height)
            .flat_map(|_| (0..width).map(|x| (x * 1040) as u16))
            .collect();
        write_gray16_tiff(&path, width, height, &data);

        let img = decode_radiograph(&path).unwrap();

        assert_eq!(img.width, width);
        assert_eq!(img.height, height);
        assert_eq!(img.source_bit_depth, 16);
        assert_eq!(img.data.len(), (width * height) as usize);

        // All values normalized into [0, 1]
        assert!(img.data.iter().all(|&v| (0.0..=1.0).contains(&v)));

        // First column is black, ramp increases along a row
        assert!(img.data[0].abs() < 1e-6);
        assert!(img.data[1] > img.data[0]);
    }

    #[test]
    fn test_decode_rgb8_tiff_reduces_to_luma() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rgb.tif");

        let width = 4u32;
        let height = 4u32;
        // Mid-gray stored as RGB
        let data: Vec<u8> = vec![128; (width * height * 3) as usize];
        write_rgb8_tiff(&path, width, height, &data);

        let img = decode_radiograph(&path).unwrap();

        assert_eq!(img.data.len(), (width * height) as usize);
        // Equal channels collapse to the same gray value
        for &v in &img.data {
            assert!((v - 128.0 / 255.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_decode_unsupported_extension() {
        let result = decode_radiograph("image.bmp");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Unsupported file format"));
    }

    #[test]
    fn test_decode_missing_file() {
        let result = decode_radiograph("/nonexistent/file.tif");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to open TIFF file"));
    }
}
