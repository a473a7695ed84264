//! Summary statistics over per-trial rounds-to-certainty samples.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: u32,
    pub upper: u32,
    pub count: u32,
}

/// Moments, order statistics and a fixed-width histogram of one sample set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub skew: f64,
    /// Excess kurtosis (a normal distribution scores 0).
    pub kurtosis: f64,
    pub median: f64,
    pub min: usize,
    pub max: usize,
    pub histogram: Vec<HistogramBin>,
    /// Samples above the last histogram edge.
    pub out_of_range: u32,
}

impl Summary {
    pub fn from_samples(samples: &[usize], bin_width: u32, upper_edge: u32) -> Self {
        let (histogram, out_of_range) = histogram(samples, bin_width, upper_edge);
        if samples.is_empty() {
            return Self {
                count: 0,
                mean: 0.0,
                std_dev: 0.0,
                skew: 0.0,
                kurtosis: 0.0,
                median: 0.0,
                min: 0,
                max: 0,
                histogram,
                out_of_range,
            };
        }

        let n = samples.len() as f64;
        let mean = samples.iter().map(|&x| x as f64).sum::<f64>() / n;
        let variance = samples
            .iter()
            .map(|&x| (x as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        let std_dev = variance.sqrt();

        // Standardized moments are undefined for a constant sample; report 0.
        let (skew, kurtosis) = if std_dev > 0.0 {
            let standardized = |power: i32| {
                samples
                    .iter()
                    .map(|&x| ((x as f64 - mean) / std_dev).powi(power))
                    .sum::<f64>()
                    / n
            };
            (standardized(3), standardized(4) - 3.0)
        } else {
            (0.0, 0.0)
        };

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 1 {
            sorted[mid] as f64
        } else {
            (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
        };

        Self {
            count: samples.len(),
            mean,
            std_dev,
            skew,
            kurtosis,
            median,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            histogram,
            out_of_range,
        }
    }
}

/// Count samples into bins of `bin_width` from 0 up to `upper_edge`.
///
/// Bins are half-open except the last, which also takes samples equal to
/// `upper_edge`. Larger samples are counted separately as out of range.
pub fn histogram(samples: &[usize], bin_width: u32, upper_edge: u32) -> (Vec<HistogramBin>, u32) {
    let width = bin_width.max(1);
    let num_bins = (upper_edge / width).max(1);
    let top = num_bins * width;

    let mut bins: Vec<HistogramBin> = (0..num_bins)
        .map(|i| HistogramBin {
            lower: i * width,
            upper: (i + 1) * width,
            count: 0,
        })
        .collect();

    let mut out_of_range = 0;
    for &sample in samples {
        if sample > top as usize {
            out_of_range += 1;
            continue;
        }
        let idx = ((sample as u32) / width).min(num_bins - 1) as usize;
        bins[idx].count += 1;
    }
    (bins, out_of_range)
}
