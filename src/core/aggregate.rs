//! Per-offset mean and confidence band over stacked windows.

use super::window::{Window, WindowSpec};
use crate::error::AnalysisError;

/// z for a two-sided 95% normal interval.
pub const Z_95: f64 = 1.96;

#[derive(Clone, Debug, PartialEq)]
pub struct AggregateCurve {
    /// Step offset from the event for each column.
    pub offsets: Vec<i64>,
    pub mean: Vec<f64>,
    /// Population standard deviation across events over `sqrt(n)`.
    pub sem: Vec<f64>,
    /// Half-width of the 95% band, `Z_95 * sem`.
    pub ci: Vec<f64>,
    pub n_events: usize,
}

impl AggregateCurve {
    /// Aggregates equal-length windows column by column. Returns `Ok(None)`
    /// for an empty stack.
    pub fn from_windows(
        windows: &[Window],
        spec: WindowSpec,
    ) -> Result<Option<Self>, AnalysisError> {
        if windows.is_empty() {
            return Ok(None);
        }
        let len = spec.len();
        for (index, w) in windows.iter().enumerate() {
            if w.len() != len {
                return Err(AnalysisError::WindowShape {
                    index,
                    actual: w.len(),
                    expected: len,
                });
            }
        }

        let n = windows.len() as f64;
        let mut mean = vec![0.0f64; len];
        for w in windows {
            for (acc, &v) in mean.iter_mut().zip(w) {
                *acc += v;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut var = vec![0.0f64; len];
        for w in windows {
            for ((acc, &v), &m) in var.iter_mut().zip(w).zip(&mean) {
                *acc += (v - m) * (v - m);
            }
        }
        let sqrt_n = n.sqrt();
        let sem: Vec<f64> = var.iter().map(|v| (v / n).sqrt() / sqrt_n).collect();
        let ci = sem.iter().map(|s| Z_95 * s).collect();

        Ok(Some(Self {
            offsets: spec.offsets().collect(),
            mean,
            sem,
            ci,
            n_events: windows.len(),
        }))
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    pub fn lower(&self) -> impl Iterator<Item = f64> + '_ {
        self.mean.iter().zip(&self.ci).map(|(m, c)| m - c)
    }

    pub fn upper(&self) -> impl Iterator<Item = f64> + '_ {
        self.mean.iter().zip(&self.ci).map(|(m, c)| m + c)
    }

    /// `offset,mean,sem,ci_lo,ci_hi` rows with a header line.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("offset,mean,sem,ci_lo,ci_hi\n");
        for (i, ((lo, hi), offset)) in self.lower().zip(self.upper()).zip(&self.offsets).enumerate() {
            csv.push_str(&format!(
                "{offset},{:.6},{:.6},{lo:.6},{hi:.6}\n",
                self.mean[i], self.sem[i]
            ));
        }
        csv
    }
}
