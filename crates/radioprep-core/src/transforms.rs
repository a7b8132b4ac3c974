//! Contrast enhancement transforms.
//!
//! Three variants over normalized single-channel rasters: percentile
//! contrast stretching, global histogram equalization, and adaptive
//! (tile-based) histogram equalization with a clip limit. The numeric
//! contract is fixed: 2nd/95th percentile stretch, 65536-bucket intensity
//! resolution, clip limit 0.1, outputs in [0.0, 1.0].

use crate::stats;

/// Intensity resolution used for equalization and reporting.
pub const REPORT_BINS: usize = 65536;

/// Clip limit bounding local contrast amplification in adaptive
/// equalization.
pub const CLIP_LIMIT: f32 = 0.1;

/// Lower percentile for contrast stretching.
pub const STRETCH_LOWER_PCT: f32 = 2.0;

/// Upper percentile for contrast stretching.
pub const STRETCH_UPPER_PCT: f32 = 95.0;

/// Tile grid dimension for adaptive equalization (8x8 tiles).
const ADAPTHIST_TILES: u32 = 8;

const DEGENERATE_RANGE_EPS: f32 = 1e-6;

/// Contrast stretching: rescale so the 2nd percentile maps to 0.0 and the
/// 95th to 1.0, clipping outside that range.
///
/// Zero-dynamic-range inputs (2nd and 95th percentile equal) are passed
/// through unchanged rather than divided by a degenerate range.
pub fn stretch_contrast(data: &[f32]) -> Vec<f32> {
    if data.is_empty() {
        return Vec::new();
    }

    let mut scratch = data.to_vec();
    let (low, high) = stats::percentile_pair(&mut scratch, STRETCH_LOWER_PCT, STRETCH_UPPER_PCT);

    if (high - low).abs() < DEGENERATE_RANGE_EPS {
        return data.to_vec();
    }

    data.iter()
        .map(|&v| ((v - low) / (high - low)).clamp(0.0, 1.0))
        .collect()
}

/// Global histogram equalization: remap each intensity to the value of the
/// cumulative distribution at that intensity, computed over `nbins`
/// buckets across the full image.
pub fn equalize_hist(data: &[f32], nbins: usize) -> Vec<f32> {
    if data.is_empty() {
        return Vec::new();
    }

    let hist = stats::histogram(data, nbins);
    let cdf = stats::cumulative_distribution(&hist);

    data.iter()
        .map(|&v| cdf[stats::bin_index(v, nbins)])
        .collect()
}

/// Adaptive (locally windowed) histogram equalization.
///
/// The image is divided into an 8x8 tile grid. Each tile gets a clipped
/// histogram (per-bin counts capped at `clip_limit` times the tile pixel
/// count, excess redistributed uniformly) and a CDF remapping derived from
/// it. Per-pixel output is the bilinear blend of the four surrounding tile
/// remappings, which avoids visible tile seams. Output dimensions always
/// equal input dimensions.
pub fn equalize_adapthist(
    data: &[f32],
    width: u32,
    height: u32,
    clip_limit: f32,
    nbins: usize,
) -> Vec<f32> {
    if data.is_empty() || width == 0 || height == 0 {
        return Vec::new();
    }

    let ntx = ADAPTHIST_TILES.min(width) as usize;
    let nty = ADAPTHIST_TILES.min(height) as usize;

    // Per-tile CDF remappings, indexed [ty * ntx + tx][bin]
    let mut maps: Vec<Vec<f32>> = Vec::with_capacity(ntx * nty);

    for ty in 0..nty {
        let y_start = (ty as u32 * height / nty as u32) as usize;
        let y_end = ((ty as u32 + 1) * height / nty as u32) as usize;

        for tx in 0..ntx {
            let x_start = (tx as u32 * width / ntx as u32) as usize;
            let x_end = ((tx as u32 + 1) * width / ntx as u32) as usize;

            maps.push(tile_mapping(
                data, width as usize, x_start, x_end, y_start, y_end, clip_limit, nbins,
            ));
        }
    }

    let mut out = Vec::with_capacity(data.len());
    for y in 0..height {
        let (ty0, ty1, fy) = tile_blend(y, height, nty);
        for x in 0..width {
            let (tx0, tx1, fx) = tile_blend(x, width, ntx);
            let bin = stats::bin_index(data[(y * width + x) as usize], nbins);

            let v00 = maps[ty0 * ntx + tx0][bin];
            let v01 = maps[ty0 * ntx + tx1][bin];
            let v10 = maps[ty1 * ntx + tx0][bin];
            let v11 = maps[ty1 * ntx + tx1][bin];

            let top = v00 + fx * (v01 - v00);
            let bottom = v10 + fx * (v11 - v10);
            out.push((top + fy * (bottom - top)).clamp(0.0, 1.0));
        }
    }
    out
}

/// Build the clipped-histogram CDF remapping for one tile.
#[allow(clippy::too_many_arguments)]
fn tile_mapping(
    data: &[f32],
    row_stride: usize,
    x_start: usize,
    x_end: usize,
    y_start: usize,
    y_end: usize,
    clip_limit: f32,
    nbins: usize,
) -> Vec<f32> {
    let mut hist = vec![0.0f32; nbins];
    let mut npixels = 0usize;

    for y in y_start..y_end {
        for x in x_start..x_end {
            hist[stats::bin_index(data[y * row_stride + x], nbins)] += 1.0;
            npixels += 1;
        }
    }

    if npixels == 0 {
        // Degenerate tile layout; identity remapping
        return (0..nbins).map(|b| b as f32 / (nbins - 1) as f32).collect();
    }

    // Clip bins and redistribute the excess uniformly
    let clip = (clip_limit * npixels as f32).max(1.0);
    let mut excess = 0.0f32;
    for count in hist.iter_mut() {
        if *count > clip {
            excess += *count - clip;
            *count = clip;
        }
    }
    if excess > 0.0 {
        let bonus = excess / nbins as f32;
        for count in hist.iter_mut() {
            *count += bonus;
        }
    }

    // CDF remapping normalized to [0, 1]
    let total: f32 = npixels as f32;
    let mut running = 0.0f32;
    hist.into_iter()
        .map(|count| {
            running += count;
            (running / total).min(1.0)
        })
        .collect()
}

/// Tile-space interpolation coordinates for a pixel position: the two
/// bracketing tile indices and the blend fraction toward the second.
fn tile_blend(pos: u32, extent: u32, ntiles: usize) -> (usize, usize, f32) {
    let g = (pos as f32 + 0.5) * ntiles as f32 / extent as f32 - 0.5;
    if g <= 0.0 {
        return (0, 0, 0.0);
    }
    let i0 = g.floor() as usize;
    if i0 + 1 >= ntiles {
        return (ntiles - 1, ntiles - 1, 0.0);
    }
    (i0, i0 + 1, g - i0 as f32)
}
