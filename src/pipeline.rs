//! The full analysis: describe delays, draw their histogram, then align,
//! aggregate and draw each signal around the events.

use std::path::PathBuf;

use tracing::info;

use crate::config::AppConfig;
use crate::core::window::ExtractStats;
use crate::core::{AggregateCurve, Histogram, Signal, Summary, WindowSpec, extract_windows};
use crate::data::{EventTable, SeriesSource};
use crate::error::AnalysisError;
use crate::plots::{ChartSink, FileSink};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    /// `describe()` of each numeric event-table column.
    pub columns: Vec<(&'static str, Option<Summary>)>,
    pub histogram: Option<Histogram>,
    pub extract: ExtractStats,
    pub alive: Option<AggregateCurve>,
    pub l_local: Option<AggregateCurve>,
    /// Files written by the sink, in order.
    pub outputs: Vec<PathBuf>,
}

impl Report {
    pub fn curve(&self, signal: Signal) -> Option<&AggregateCurve> {
        match signal {
            Signal::Alive => self.alive.as_ref(),
            Signal::LLocal => self.l_local.as_ref(),
        }
    }

    pub fn delay_summary(&self) -> Option<&Summary> {
        self.columns
            .iter()
            .find(|(name, _)| *name == crate::data::events::COL_TAU_DELAY)
            .and_then(|(_, s)| s.as_ref())
    }
}

/// Runs every stage against an already loaded event table.
pub fn analyze<S, C>(
    events: &EventTable,
    source: &S,
    spec: WindowSpec,
    sink: &mut C,
) -> Result<Report, AnalysisError>
where
    S: SeriesSource + ?Sized,
    C: ChartSink + ?Sized,
{
    let mut report = Report::default();

    info!("τ_delay summary:");
    for (name, values) in events.numeric_columns() {
        let summary = Summary::describe(&values);
        match &summary {
            Some(s) => info!("  {name:<9} {s}"),
            None => info!("  {name:<9} count=0"),
        }
        report.columns.push((name, summary));
    }

    report.histogram = Histogram::of_delays(&events.delays);
    match &report.histogram {
        Some(hist) => report.outputs.extend(sink.histogram(hist, events.len())?),
        None => info!("no τ_delay values; skipping histogram"),
    }

    let windows = extract_windows(&events.records, source, spec)?;
    report.extract = windows.stats;
    info!(
        events = windows.stats.events,
        retained = windows.stats.retained,
        missing_series = windows.stats.missing_series,
        out_of_bounds = windows.stats.out_of_bounds,
        proxied = windows.stats.proxied,
        "extracted event-aligned windows"
    );

    for signal in Signal::ALL {
        let curve = AggregateCurve::from_windows(windows.signal(signal), spec)?;
        match &curve {
            Some(c) => report.outputs.extend(sink.aligned_curve(signal, c)?),
            None => info!("no valid windows for {}; skipping chart", signal.file_stem()),
        }
        match signal {
            Signal::Alive => report.alive = curve,
            Signal::LLocal => report.l_local = curve,
        }
    }

    Ok(report)
}

/// Loads the event table named by `config` and runs [`analyze`] with the
/// on-disk run layout and file output.
pub fn run(config: &AppConfig) -> Result<Report, AnalysisError> {
    let table_path = config.paths.event_table();
    info!(path = %table_path.display(), "loading event table");
    let events = EventTable::load(&table_path)?;

    let source = config.paths.series_source();
    let out_dir = config.paths.output_dir();
    let mut sink = FileSink::new(&out_dir, &config.paths.run_tag, config.output.clone());

    let report = analyze(&events, &source, config.window_spec(), &mut sink)?;
    info!("All plots saved in: {}", out_dir.display());
    Ok(report)
}
