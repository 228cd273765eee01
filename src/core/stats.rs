//! Descriptive statistics over flat samples.

use std::fmt;

/// Count, moments and quartiles of a sample, in the layout of a
/// `describe()` table. `std` is the sample standard deviation (n - 1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Summary {
    /// Returns `None` for an empty sample.
    pub fn describe(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let mean = mean(&sorted);
        let std = if n < 2 {
            f64::NAN
        } else {
            (sum_sq_dev(&sorted, mean) / (n - 1) as f64).sqrt()
        };

        Some(Self {
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted[n - 1],
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count={} mean={:.6} std={:.6} min={:.6} 25%={:.6} 50%={:.6} 75%={:.6} max={:.6}",
            self.count, self.mean, self.std, self.min, self.q25, self.median, self.q75, self.max
        )
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population mean and standard deviation (divides by n).
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let m = mean(values);
    let var = sum_sq_dev(values, m) / values.len() as f64;
    (m, var.max(0.0).sqrt())
}

fn sum_sq_dev(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean) * (v - mean)).sum()
}

/// Linear interpolation between closest ranks. `sorted` must be ascending
/// and non-empty.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
