//! Equal-width histogram of event delays.

use super::stats::mean;

pub const MIN_BINS: usize = 5;
pub const MAX_BINS: usize = 15;

/// Half the sample count, kept within `MIN_BINS..=MAX_BINS`.
pub fn bin_count(n: usize) -> usize {
    (n / 2).clamp(MIN_BINS, MAX_BINS)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    /// `bins + 1` ascending edges; the last bin is closed on the right.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    pub mean: f64,
}

impl Histogram {
    /// Bins the finite entries of `values` with [`bin_count`] bins over their
    /// range. `None` when there is nothing finite to bin.
    pub fn of_delays(values: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        Some(Self::with_bins(&finite, bin_count(finite.len())))
    }

    fn with_bins(values: &[f64], bins: usize) -> Self {
        let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins)
            .map(|i| if i == bins { hi } else { lo + i as f64 * width })
            .collect();

        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Self {
            edges,
            counts,
            mean: mean(values),
        }
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// `(left, right, count)` per bin.
    pub fn iter_bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| (self.edges[i], self.edges[i + 1], c))
    }

    pub fn mean_label(&self) -> String {
        format!("Mean = {:.1}", self.mean)
    }
}
