use std::error::Error;
use std::fs::{create_dir_all, write};
use std::path::PathBuf;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use super::{ChartSink, EVENT_MARKER_LABEL, OFFSET_X_DESC, curve_labels};
use crate::config::{ImageFormat, OutputConfig};
use crate::core::{AggregateCurve, Histogram, Signal};
use crate::error::AnalysisError;

/// Writes charts (and optionally the aggregate CSVs) under `out_dir`, with
/// file names prefixed by the run tag.
#[derive(Clone, Debug)]
pub struct FileSink {
    pub out_dir: PathBuf,
    pub run_tag: String,
    pub output: OutputConfig,
}

impl FileSink {
    pub fn new(out_dir: impl Into<PathBuf>, run_tag: impl Into<String>, output: OutputConfig) -> Self {
        Self {
            out_dir: out_dir.into(),
            run_tag: run_tag.into(),
            output,
        }
    }

    pub fn histogram_path(&self) -> PathBuf {
        self.out_dir.join(format!(
            "{}_tau_delay_hist.{}",
            self.run_tag,
            self.output.format.extension()
        ))
    }

    pub fn curve_path(&self, signal: Signal, ext: &str) -> PathBuf {
        self.out_dir.join(format!(
            "{}_tau_event_aligned_{}.{ext}",
            self.run_tag,
            signal.file_stem()
        ))
    }

    fn ensure_out_dir(&self) -> Result<(), AnalysisError> {
        create_dir_all(&self.out_dir).map_err(|e| AnalysisError::io(&self.out_dir, e))
    }
}

impl ChartSink for FileSink {
    fn histogram(
        &mut self,
        hist: &Histogram,
        n_rows: usize,
    ) -> Result<Vec<PathBuf>, AnalysisError> {
        self.ensure_out_dir()?;
        let path = self.histogram_path();
        let size = self.output.hist_size;
        let drawn = match self.output.format {
            ImageFormat::Svg => draw_histogram(SVGBackend::new(&path, size).into_drawing_area(), hist, n_rows),
            ImageFormat::Png => {
                draw_histogram(BitMapBackend::new(&path, size).into_drawing_area(), hist, n_rows)
            }
        };
        drawn.map_err(|e| AnalysisError::render(&path, e))?;
        info!(path = %path.display(), bins = hist.bins(), "saved delay histogram");
        Ok(vec![path])
    }

    fn aligned_curve(
        &mut self,
        signal: Signal,
        curve: &AggregateCurve,
    ) -> Result<Vec<PathBuf>, AnalysisError> {
        self.ensure_out_dir()?;
        let mut written = Vec::with_capacity(2);
        if self.output.write_csv {
            let csv_path = self.curve_path(signal, "csv");
            write(&csv_path, curve.to_csv()).map_err(|e| AnalysisError::io(&csv_path, e))?;
            written.push(csv_path);
        }

        let path = self.curve_path(signal, self.output.format.extension());
        let size = self.output.curve_size;
        let drawn = match self.output.format {
            ImageFormat::Svg => {
                draw_aligned_curve(SVGBackend::new(&path, size).into_drawing_area(), signal, curve)
            }
            ImageFormat::Png => {
                draw_aligned_curve(BitMapBackend::new(&path, size).into_drawing_area(), signal, curve)
            }
        };
        drawn.map_err(|e| AnalysisError::render(&path, e))?;
        info!(path = %path.display(), n_events = curve.n_events, "saved event-aligned curve");
        written.push(path);
        Ok(written)
    }
}

fn draw_histogram<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    hist: &Histogram,
    n_rows: usize,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let x_lo = hist.edges.first().copied().unwrap_or(0.0);
    let x_hi = hist.edges.last().copied().unwrap_or(1.0);
    let pad = 0.05 * (x_hi - x_lo);
    let y_hi = (hist.max_count().max(1) as f64) * 1.1;

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("τ_delay Distribution (N={n_rows})"),
            ("sans-serif", 20),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((x_lo - pad)..(x_hi + pad), 0.0f64..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("τ_delay (steps)")
        .y_desc("Count")
        .light_line_style(BLACK.mix(0.05))
        .draw()?;

    for (x0, x1, count) in hist.iter_bins() {
        let corners = [(x0, 0.0), (x1, count as f64)];
        chart.draw_series(std::iter::once(Rectangle::new(
            corners,
            BLUE.mix(0.6).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            corners,
            BLACK.stroke_width(1),
        )))?;
    }

    let mean = hist.mean;
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(mean, 0.0), (mean, y_hi)],
            RED.stroke_width(2),
        )))?
        .label(hist.mean_label())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_aligned_curve<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    signal: Signal,
    curve: &AggregateCurve,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let labels = curve_labels(signal);

    let mut x_lo = curve.offsets.first().copied().unwrap_or(0) as f64;
    let mut x_hi = curve.offsets.last().copied().unwrap_or(0) as f64;
    if x_hi <= x_lo {
        x_lo -= 1.0;
        x_hi += 1.0;
    }

    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for (lo, hi) in curve.lower().zip(curve.upper()) {
        if lo.is_finite() && hi.is_finite() {
            y_min = y_min.min(lo);
            y_max = y_max.max(hi);
        }
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    let range = (y_max - y_min).abs();
    let pad = if range > 1e-9 {
        0.1 * range
    } else {
        0.1 * y_max.abs().max(1.0)
    };
    let y_lo = y_min - pad;
    let y_hi = y_max + pad;

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} (N={})", labels.title, curve.n_events),
            ("sans-serif", 20),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc(OFFSET_X_DESC)
        .y_desc(labels.y_desc)
        .light_line_style(BLACK.mix(0.05))
        .draw()?;

    let xs: Vec<f64> = curve.offsets.iter().map(|&o| o as f64).collect();
    let lower: Vec<f64> = curve.lower().collect();
    let mut band_points: Vec<(f64, f64)> = Vec::with_capacity(xs.len() * 2);
    band_points.extend(xs.iter().copied().zip(curve.upper()));
    for i in (0..xs.len()).rev() {
        band_points.push((xs[i], lower[i]));
    }
    chart
        .draw_series(std::iter::once(Polygon::new(
            band_points,
            BLUE.mix(0.25).filled(),
        )))?
        .label("95% CI")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], BLUE.mix(0.25).filled()));

    chart
        .draw_series(LineSeries::new(
            xs.iter().copied().zip(curve.mean.iter().copied()),
            BLUE.stroke_width(3),
        ))?
        .label(labels.line)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(3)));

    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(0.0, y_lo), (0.0, y_hi)],
            RED.stroke_width(2),
        )))?
        .label(EVENT_MARKER_LABEL)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
