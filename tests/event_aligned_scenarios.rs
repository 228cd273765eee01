use std::path::PathBuf;

use approx::assert_relative_eq;

use tau_align::AnalysisError;
use tau_align::core::aggregate::Z_95;
use tau_align::core::stats::mean_std;
use tau_align::core::{AggregateCurve, Histogram, Signal, WindowSpec, extract_windows};
use tau_align::data::{EventRecord, EventTable, MemorySource, TimeSeries};
use tau_align::pipeline::analyze;
use tau_align::plots::ChartSink;

#[derive(Default)]
struct RecordingSink {
    histograms: Vec<(usize, usize)>,
    curves: Vec<(Signal, usize)>,
}

impl ChartSink for RecordingSink {
    fn histogram(
        &mut self,
        hist: &Histogram,
        n_rows: usize,
    ) -> Result<Vec<PathBuf>, AnalysisError> {
        self.histograms.push((hist.bins(), n_rows));
        Ok(Vec::new())
    }

    fn aligned_curve(
        &mut self,
        signal: Signal,
        curve: &AggregateCurve,
    ) -> Result<Vec<PathBuf>, AnalysisError> {
        self.curves.push((signal, curve.n_events));
        Ok(Vec::new())
    }
}

fn event(run_id: u32, t_global: i64) -> EventRecord {
    EventRecord {
        run_id,
        t_global,
        tau_delay: Some(t_global as f64 / 10.0),
    }
}

fn table(records: Vec<EventRecord>) -> EventTable {
    let delays = records.iter().filter_map(|r| r.tau_delay).collect();
    EventTable { records, delays }
}

fn linear_decay(len: usize) -> TimeSeries {
    let last = (len - 1) as f64;
    TimeSeries::new((0..len).map(|i| 1.0 - i as f64 / last).collect())
}

#[test]
fn single_run_window_is_centered_on_event() {
    let series = linear_decay(200);
    let source: MemorySource = [(1, series.clone())].into_iter().collect();
    let spec = WindowSpec::new(15, 30);

    let set = extract_windows(&[event(1, 100)], &source, spec).unwrap();
    assert_eq!(set.alive.len(), 1);
    let w = &set.alive[0];
    assert_eq!(w.len(), 46);
    assert_eq!(w[15], series.alive[100]);
    assert_eq!(w[0], series.alive[85]);
    assert_eq!(w[45], series.alive[130]);
}

#[test]
fn negative_lower_bound_skips_event_and_charts() {
    let source: MemorySource = [(1, linear_decay(200))].into_iter().collect();
    let events = table(vec![event(1, 5)]);
    let mut sink = RecordingSink::default();

    let report = analyze(&events, &source, WindowSpec::new(15, 30), &mut sink).unwrap();
    assert_eq!(report.extract.out_of_bounds, 1);
    assert!(report.alive.is_none());
    assert!(report.l_local.is_none());
    assert!(sink.curves.is_empty());
    assert_eq!(sink.histograms, vec![(5, 1)]);
}

#[test]
fn window_past_series_end_is_skipped() {
    let source: MemorySource = [(1, linear_decay(50))].into_iter().collect();
    let spec = WindowSpec::new(5, 10);
    // t + post + 1 == len fits exactly; one more step does not.
    let set = extract_windows(&[event(1, 39), event(1, 40)], &source, spec).unwrap();
    assert_eq!(set.alive.len(), 1);
    assert_eq!(set.l_local.len(), 1);
    assert_eq!(set.stats.out_of_bounds, 1);
}

#[test]
fn two_runs_average_elementwise() {
    let a: Vec<f64> = (0..40).map(|i| (i as f64 * 0.37).sin()).collect();
    let b: Vec<f64> = (0..40).map(|i| 0.5 + (i as f64 * 0.11).cos()).collect();
    let source: MemorySource = [
        (1, TimeSeries::new(a.clone())),
        (2, TimeSeries::new(b.clone())),
    ]
    .into_iter()
    .collect();
    let spec = WindowSpec::new(4, 6);

    let set = extract_windows(&[event(1, 10), event(2, 20)], &source, spec).unwrap();
    let curve = AggregateCurve::from_windows(&set.alive, spec).unwrap().unwrap();

    assert_eq!(curve.n_events, 2);
    for (i, offset) in spec.offsets().enumerate() {
        let ai = a[(10 + offset) as usize];
        let bi = b[(20 + offset) as usize];
        let (_, std) = mean_std(&[ai, bi]);
        assert_relative_eq!(curve.mean[i], (ai + bi) / 2.0, epsilon = 1e-12);
        assert_relative_eq!(curve.sem[i], std / 2f64.sqrt(), epsilon = 1e-12);
        assert_eq!(curve.ci[i], Z_95 * curve.sem[i]);
    }
}

#[test]
fn proxy_signal_matches_alive_without_secondary_column() {
    let with_l = linear_decay(60).with_l_local_mean(vec![0.25; 60]);
    let source: MemorySource = [(1, linear_decay(60)), (2, with_l)].into_iter().collect();
    let spec = WindowSpec::new(3, 3);

    let set = extract_windows(&[event(1, 30), event(2, 30)], &source, spec).unwrap();
    assert_eq!(set.stats.proxied, 1);
    assert_eq!(set.l_local[0], set.alive[0]);
    assert_eq!(set.l_local[1], vec![0.25; 7]);
    assert_ne!(set.l_local[1], set.alive[1]);
}

#[test]
fn missing_run_contributes_to_neither_signal() {
    let source: MemorySource = [(1, linear_decay(100))].into_iter().collect();
    let events = table(vec![event(1, 50), event(7, 50)]);
    let mut sink = RecordingSink::default();

    let report = analyze(&events, &source, WindowSpec::new(10, 10), &mut sink).unwrap();
    assert_eq!(report.extract.missing_series, 1);
    assert_eq!(report.extract.retained, 1);
    assert_eq!(
        sink.curves,
        vec![(Signal::Alive, 1), (Signal::LLocal, 1)]
    );
}

#[test]
fn aggregate_shapes_hold_for_any_stack() {
    let spec = WindowSpec::new(7, 12);
    let windows: Vec<Vec<f64>> = (0..9)
        .map(|k| spec.offsets().map(|o| ((k * 31 + o * 7) % 13) as f64 / 13.0).collect())
        .collect();
    let curve = AggregateCurve::from_windows(&windows, spec).unwrap().unwrap();
    assert_eq!(curve.len(), spec.len());
    assert_eq!(curve.sem.len(), spec.len());
    assert_eq!(curve.offsets.first(), Some(&-7));
    assert_eq!(curve.offsets.last(), Some(&12));
    for (sem, ci) in curve.sem.iter().zip(&curve.ci) {
        assert!(*sem >= 0.0);
        assert_eq!(*ci, Z_95 * sem);
    }
}

#[test]
fn rerunning_is_bit_identical() {
    let source: MemorySource = (1..=6)
        .map(|r| {
            let s: Vec<f64> = (0..80).map(|i| ((i * r) as f64 * 0.013).exp().recip()).collect();
            (r as u32, TimeSeries::new(s))
        })
        .collect();
    let events = table((1..=6).map(|r| event(r, 20 + 5 * r as i64)).collect());
    let spec = WindowSpec::new(15, 30);

    let first = analyze(&events, &source, spec, &mut RecordingSink::default()).unwrap();
    let second = analyze(&events, &source, spec, &mut RecordingSink::default()).unwrap();
    assert_eq!(first, second);
    assert!(first.alive.is_some());
}

#[test]
fn empty_delays_skip_histogram_only() {
    let source: MemorySource = [(1, linear_decay(100))].into_iter().collect();
    let events = EventTable {
        records: vec![EventRecord {
            run_id: 1,
            t_global: 50,
            tau_delay: None,
        }],
        delays: Vec::new(),
    };
    let mut sink = RecordingSink::default();

    let report = analyze(&events, &source, WindowSpec::new(15, 30), &mut sink).unwrap();
    assert!(report.histogram.is_none());
    assert!(report.delay_summary().is_none());
    assert!(sink.histograms.is_empty());
    assert_eq!(sink.curves.len(), 2);
}
