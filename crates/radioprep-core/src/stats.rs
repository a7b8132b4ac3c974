//! Intensity statistics for normalized rasters.
//!
//! Percentiles use partial sorting (`select_nth_unstable_by`) so the batch
//! driver never pays a full sort per image.

use std::cmp::Ordering;

/// Intensity histogram over the normalized [0, 1] range.
#[derive(Debug, Clone)]
pub struct Histogram {
    pub bins: Vec<u32>,
    pub bin_edges: Vec<f32>,
}

/// Map a normalized intensity to its histogram bin index. Bins are
/// uniform with width `1 / nbins`, matching `bin_edges`; 1.0 lands in the
/// last bin.
#[inline]
pub fn bin_index(value: f32, nbins: usize) -> usize {
    let clamped = value.clamp(0.0, 1.0);
    ((clamped * nbins as f32) as usize).min(nbins - 1)
}

/// Compute a linear-bin histogram of the data.
pub fn histogram(data: &[f32], nbins: usize) -> Histogram {
    let mut bins = vec![0u32; nbins];
    let bin_edges: Vec<f32> = (0..=nbins).map(|i| i as f32 / nbins as f32).collect();

    for &value in data {
        bins[bin_index(value, nbins)] += 1;
    }

    Histogram { bins, bin_edges }
}

/// Normalized cumulative distribution of a histogram (last entry 1.0 for
/// non-empty data).
pub fn cumulative_distribution(hist: &Histogram) -> Vec<f32> {
    let total: u64 = hist.bins.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return vec![0.0; hist.bins.len()];
    }

    let mut cdf = Vec::with_capacity(hist.bins.len());
    let mut running = 0u64;
    for &count in &hist.bins {
        running += count as u64;
        cdf.push(running as f32 / total as f32);
    }
    cdf
}

/// Find the values at two percentiles using two-stage partial sorting.
///
/// The slice is reordered in place; callers pass a scratch copy. This is
/// O(n) instead of the O(n log n) a full sort would cost.
pub fn percentile_pair(values: &mut [f32], lower_pct: f32, upper_pct: f32) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 1.0);
    }

    let low_idx = percentile_index(values.len(), lower_pct);
    let high_idx = percentile_index(values.len(), upper_pct);

    values.select_nth_unstable_by(low_idx, |a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let low = values[low_idx];

    if high_idx > low_idx {
        values[low_idx..]
            .select_nth_unstable_by(high_idx - low_idx, |a, b| {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            });
    }
    let high = values[high_idx];

    (low, high)
}

#[inline]
fn percentile_index(len: usize, pct: f32) -> usize {
    (((len as f32) * pct / 100.0) as usize).min(len - 1)
}
