//! Event-aligned window extraction.
//!
//! Each event contributes one window per signal, sliced so that index
//! `pre` of the window is the series row at `t_global`. Events whose window
//! would leave the series are dropped, never padded.

use std::ops::{Range, RangeInclusive};

use tracing::{debug, warn};

use crate::data::{EventRecord, SeriesSource, TimeSeries};
use crate::error::AnalysisError;

pub type Window = Vec<f64>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSpec {
    /// Samples kept before the event step.
    pub pre: usize,
    /// Samples kept after the event step.
    pub post: usize,
}

impl WindowSpec {
    pub fn new(pre: usize, post: usize) -> Self {
        Self { pre, post }
    }

    pub fn len(&self) -> usize {
        self.pre + self.post + 1
    }

    /// Row range `[t - pre, t + post + 1)` if it fits inside `series_len`.
    pub fn bounds(&self, t_global: i64, series_len: usize) -> Option<Range<usize>> {
        let lo = t_global.checked_sub(self.pre as i64)?;
        let hi = t_global.checked_add(self.post as i64 + 1)?;
        if lo < 0 || hi > series_len as i64 {
            return None;
        }
        Some(lo as usize..hi as usize)
    }

    /// Step offsets relative to the event, `-pre..=post`.
    pub fn offsets(&self) -> RangeInclusive<i64> {
        -(self.pre as i64)..=self.post as i64
    }
}

/// The two signals carried through alignment and aggregation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Alive fraction.
    Alive,
    /// Local energy ratio `L_local_mean`, or the alive fraction when the run
    /// does not record it.
    LLocal,
}

impl Signal {
    pub const ALL: [Signal; 2] = [Signal::Alive, Signal::LLocal];

    /// Short name used in output file names.
    pub fn file_stem(self) -> &'static str {
        match self {
            Signal::Alive => "alive",
            Signal::LLocal => "Llocal",
        }
    }
}

/// Windows for one event, plus whether the secondary signal fell back to
/// the alive fraction.
#[derive(Clone, Debug, PartialEq)]
pub struct EventWindows {
    pub alive: Window,
    pub l_local: Window,
    pub proxied: bool,
}

/// Slices both signal windows around `t_global`, or `None` when the window
/// would run past either end of the series (or of a shorter `L_local_mean`).
///
/// Runs without `L_local_mean` reuse the alive window as the secondary
/// signal. This is a deliberate approximation, not a missing-data error.
pub fn slice_event(series: &TimeSeries, spec: WindowSpec, t_global: i64) -> Option<EventWindows> {
    let range = spec.bounds(t_global, series.len())?;
    let alive = series.alive[range.clone()].to_vec();
    let (l_local, proxied) = match &series.l_local_mean {
        Some(values) => (values.get(range)?.to_vec(), false),
        None => (alive.clone(), true),
    };
    Some(EventWindows {
        alive,
        l_local,
        proxied,
    })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub events: usize,
    pub retained: usize,
    pub missing_series: usize,
    pub out_of_bounds: usize,
    pub proxied: usize,
}

/// Accumulated windows, index-aligned across the two signals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WindowSet {
    pub alive: Vec<Window>,
    pub l_local: Vec<Window>,
    pub stats: ExtractStats,
}

impl WindowSet {
    pub fn signal(&self, signal: Signal) -> &[Window] {
        match signal {
            Signal::Alive => &self.alive,
            Signal::LLocal => &self.l_local,
        }
    }

    fn push(&mut self, w: EventWindows) {
        self.stats.retained += 1;
        if w.proxied {
            self.stats.proxied += 1;
        }
        self.alive.push(w.alive);
        self.l_local.push(w.l_local);
    }
}

/// Walks `events` in order, resolving each record's series through
/// `source`. A run with no series is skipped with a warning; a window out of
/// bounds is skipped quietly. Errors from the source are propagated.
pub fn extract_windows<S>(
    events: &[EventRecord],
    source: &S,
    spec: WindowSpec,
) -> Result<WindowSet, AnalysisError>
where
    S: SeriesSource + ?Sized,
{
    let mut set = WindowSet::default();
    for event in events {
        set.stats.events += 1;
        let Some(series) = source.load(event.run_id)? else {
            warn!(
                "{} not found, skipping run {}",
                source.locate(event.run_id),
                event.run_id
            );
            set.stats.missing_series += 1;
            continue;
        };
        match slice_event(&series, spec, event.t_global) {
            Some(w) => set.push(w),
            None => {
                debug!(
                    run_id = event.run_id,
                    t_global = event.t_global,
                    series_len = series.len(),
                    "window out of bounds"
                );
                set.stats.out_of_bounds += 1;
            }
        }
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemorySource;

    fn ramp(len: usize) -> TimeSeries {
        TimeSeries::new((0..len).map(|i| i as f64).collect())
    }

    #[test]
    fn bounds_reject_both_edges() {
        let spec = WindowSpec::new(2, 3);
        assert_eq!(spec.bounds(2, 6), Some(0..6));
        assert_eq!(spec.bounds(1, 10), None);
        assert_eq!(spec.bounds(7, 10), None);
        assert_eq!(spec.bounds(6, 10), Some(4..10));
        assert_eq!(spec.bounds(-4, 10), None);
    }

    #[test]
    fn offsets_span_pre_to_post() {
        let spec = WindowSpec::new(2, 3);
        assert_eq!(spec.offsets().collect::<Vec<_>>(), vec![-2, -1, 0, 1, 2, 3]);
        assert_eq!(spec.offsets().count(), spec.len());
    }

    #[test]
    fn event_row_sits_at_index_pre() {
        let spec = WindowSpec::new(3, 4);
        let w = slice_event(&ramp(20), spec, 10).unwrap();
        assert_eq!(w.alive.len(), 8);
        assert_eq!(w.alive[spec.pre], 10.0);
        assert_eq!(w.alive.first(), Some(&7.0));
        assert_eq!(w.alive.last(), Some(&14.0));
    }

    #[test]
    fn secondary_uses_recorded_column_when_present() {
        let series = ramp(10).with_l_local_mean((0..10).map(|i| -(i as f64)).collect());
        let w = slice_event(&series, WindowSpec::new(1, 1), 5).unwrap();
        assert!(!w.proxied);
        assert_eq!(w.l_local, vec![-4.0, -5.0, -6.0]);
    }

    #[test]
    fn short_secondary_column_is_out_of_bounds() {
        let series = TimeSeries {
            alive: (0..20).map(f64::from).collect(),
            l_local_mean: Some(vec![0.5; 12]),
        };
        let spec = WindowSpec::new(2, 2);
        assert!(slice_event(&series, spec, 9).is_some());
        assert!(slice_event(&series, spec, 10).is_none());

        let mut source = MemorySource::new();
        source.insert(1, series);
        let events = [EventRecord { run_id: 1, t_global: 15, tau_delay: None }];
        let set = extract_windows(&events, &source, spec).unwrap();
        assert_eq!(set.stats.out_of_bounds, 1);
        assert!(set.alive.is_empty());
        assert!(set.l_local.is_empty());
    }

    #[test]
    fn stats_account_for_every_event() {
        let source: MemorySource = [(1, ramp(50)), (2, ramp(50))].into_iter().collect();
        let events = [
            EventRecord { run_id: 1, t_global: 20, tau_delay: None },
            EventRecord { run_id: 2, t_global: 1, tau_delay: None },
            EventRecord { run_id: 3, t_global: 20, tau_delay: None },
            EventRecord { run_id: 1, t_global: 30, tau_delay: None },
        ];
        let set = extract_windows(&events, &source, WindowSpec::new(5, 5)).unwrap();
        assert_eq!(
            set.stats,
            ExtractStats {
                events: 4,
                retained: 2,
                missing_series: 1,
                out_of_bounds: 1,
                proxied: 2,
            }
        );
        assert_eq!(set.alive[1][5], 30.0);
    }
}
