//! Chart output. The pipeline hands finished statistics to a [`ChartSink`];
//! [`FileSink`] renders them with plotters, tests swap in a recorder.

mod render;

use std::path::PathBuf;

use crate::core::{AggregateCurve, Histogram, Signal};
use crate::error::AnalysisError;

pub use render::FileSink;

pub trait ChartSink {
    /// Delay histogram. `n_rows` is the number of event rows in the table.
    /// Returns the files written, if any.
    fn histogram(&mut self, hist: &Histogram, n_rows: usize)
    -> Result<Vec<PathBuf>, AnalysisError>;

    fn aligned_curve(
        &mut self,
        signal: Signal,
        curve: &AggregateCurve,
    ) -> Result<Vec<PathBuf>, AnalysisError>;
}

/// Labels for one event-aligned chart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurveLabels {
    pub title: &'static str,
    pub y_desc: &'static str,
    pub line: &'static str,
}

pub const EVENT_MARKER_LABEL: &str = "t_global (Social Death)";
pub const OFFSET_X_DESC: &str = "Time from t_global (steps)";

pub fn curve_labels(signal: Signal) -> CurveLabels {
    match signal {
        Signal::Alive => CurveLabels {
            title: "Event-aligned: Alive around Social Death",
            y_desc: "Alive Fraction",
            line: "Mean Alive",
        },
        Signal::LLocal => CurveLabels {
            title: "Event-aligned: Individual Energy Ratio around Social Death",
            y_desc: "Λ_local [mean normalized]",
            line: "Mean Λ_local (or proxy)",
        },
    }
}

/// Discards everything. Useful for statistics-only runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ChartSink for NullSink {
    fn histogram(&mut self, _: &Histogram, _: usize) -> Result<Vec<PathBuf>, AnalysisError> {
        Ok(Vec::new())
    }

    fn aligned_curve(
        &mut self,
        _: Signal,
        _: &AggregateCurve,
    ) -> Result<Vec<PathBuf>, AnalysisError> {
        Ok(Vec::new())
    }
}
