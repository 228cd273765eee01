use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::table::{CsvTable, parse_opt_f64};
use crate::error::AnalysisError;

pub const COL_ALIVE: &str = "alive";
pub const COL_L_LOCAL_MEAN: &str = "L_local_mean";

/// Per-step observations of one run. Row `i` is simulation step `i`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeSeries {
    pub alive: Vec<f64>,
    pub l_local_mean: Option<Vec<f64>>,
}

impl TimeSeries {
    pub fn new(alive: Vec<f64>) -> Self {
        Self {
            alive,
            l_local_mean: None,
        }
    }

    pub fn with_l_local_mean(mut self, l_local_mean: Vec<f64>) -> Self {
        debug_assert_eq!(l_local_mean.len(), self.alive.len());
        self.l_local_mean = Some(l_local_mean);
        self
    }

    pub fn len(&self) -> usize {
        self.alive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let table = CsvTable::read(path)?;
        Self::from_table(&table)
    }

    /// Empty cells become NaN so the step index stays aligned with the row.
    pub fn from_table(table: &CsvTable) -> Result<Self, AnalysisError> {
        let alive_i = table.require(COL_ALIVE)?;
        let l_local_i = table.column(COL_L_LOCAL_MEAN);

        let mut alive = Vec::with_capacity(table.len());
        let mut l_local = l_local_i.map(|_| Vec::with_capacity(table.len()));
        for row in &table.rows {
            let err = |msg: String| AnalysisError::parse(&table.path, row.line, msg);
            alive.push(parse_opt_f64(row.cell(alive_i)).map_err(err)?.unwrap_or(f64::NAN));
            if let (Some(idx), Some(values)) = (l_local_i, l_local.as_mut()) {
                values.push(parse_opt_f64(row.cell(idx)).map_err(err)?.unwrap_or(f64::NAN));
            }
        }
        Ok(Self {
            alive,
            l_local_mean: l_local,
        })
    }
}

/// Resolves a run id to that run's time series.
///
/// `Ok(None)` means the run has no series on record; callers treat that as a
/// per-run skip rather than a failure.
pub trait SeriesSource {
    fn load(&self, run_id: u32) -> Result<Option<TimeSeries>, AnalysisError>;

    /// Human-readable location used in skip warnings.
    fn locate(&self, run_id: u32) -> String {
        format!("run {run_id}")
    }
}

impl<F> SeriesSource for F
where
    F: Fn(u32) -> Result<Option<TimeSeries>, AnalysisError>,
{
    fn load(&self, run_id: u32) -> Result<Option<TimeSeries>, AnalysisError> {
        self(run_id)
    }
}

/// In-memory series keyed by run id.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    runs: HashMap<u32, TimeSeries>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, run_id: u32, series: TimeSeries) -> &mut Self {
        self.runs.insert(run_id, series);
        self
    }
}

impl FromIterator<(u32, TimeSeries)> for MemorySource {
    fn from_iter<I: IntoIterator<Item = (u32, TimeSeries)>>(iter: I) -> Self {
        Self {
            runs: iter.into_iter().collect(),
        }
    }
}

impl SeriesSource for MemorySource {
    fn load(&self, run_id: u32) -> Result<Option<TimeSeries>, AnalysisError> {
        Ok(self.runs.get(&run_id).cloned())
    }
}

/// Ensemble layout on disk: each run lives in a sibling of the ensemble
/// directory, named by swapping the `_ensemble` suffix for `_<tag>_runNN`.
#[derive(Clone, Debug)]
pub struct RunDirSource {
    pub base_dir: PathBuf,
    pub run_tag: String,
    pub file_name: String,
}

const ENSEMBLE_MARKER: &str = "_ensemble";

impl RunDirSource {
    pub fn new(base_dir: impl Into<PathBuf>, run_tag: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            run_tag: run_tag.into(),
            file_name: "timeseries.csv".to_string(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn run_dir(&self, run_id: u32) -> PathBuf {
        let run_name = format!("{}_run{run_id:02}", self.run_tag);
        let base = self.base_dir.to_string_lossy();
        if base.contains(ENSEMBLE_MARKER) {
            PathBuf::from(base.replace(ENSEMBLE_MARKER, &format!("_{run_name}")))
        } else {
            // No ensemble marker to swap: nest runs under the base directory.
            self.base_dir.join(run_name)
        }
    }

    pub fn series_path(&self, run_id: u32) -> PathBuf {
        self.run_dir(run_id).join(&self.file_name)
    }
}

impl SeriesSource for RunDirSource {
    fn load(&self, run_id: u32) -> Result<Option<TimeSeries>, AnalysisError> {
        let path = self.series_path(run_id);
        if !path.is_file() {
            return Ok(None);
        }
        TimeSeries::load(&path).map(Some)
    }

    fn locate(&self, run_id: u32) -> String {
        self.series_path(run_id).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_dir_swaps_ensemble_suffix() {
        let src = RunDirSource::new("/data/outputs/U25_FULL_ensemble", "N10");
        assert_eq!(
            src.series_path(3),
            PathBuf::from("/data/outputs/U25_FULL_N10_run03/timeseries.csv")
        );
        assert_eq!(
            src.run_dir(12),
            PathBuf::from("/data/outputs/U25_FULL_N10_run12")
        );
    }

    #[test]
    fn run_dir_without_marker_nests_under_base() {
        let src = RunDirSource::new("/data/runs", "N10");
        assert_eq!(src.run_dir(4), PathBuf::from("/data/runs/N10_run04"));
    }

    #[test]
    fn secondary_column_is_optional() {
        let t = CsvTable::parse(Path::new("ts.csv"), "step,alive\n0,1.0\n1,0.5\n").unwrap();
        let s = TimeSeries::from_table(&t).unwrap();
        assert_eq!(s.alive, vec![1.0, 0.5]);
        assert!(s.l_local_mean.is_none());

        let t = CsvTable::parse(Path::new("ts.csv"), "alive,L_local_mean\n1.0,0.2\n,0.3\n").unwrap();
        let s = TimeSeries::from_table(&t).unwrap();
        assert_eq!(s.len(), 2);
        assert!(s.alive[1].is_nan());
        assert_eq!(s.l_local_mean, Some(vec![0.2, 0.3]));
    }

    #[test]
    fn alive_column_is_required() {
        let t = CsvTable::parse(Path::new("ts.csv"), "L_local_mean\n0.2\n").unwrap();
        assert!(matches!(
            TimeSeries::from_table(&t),
            Err(AnalysisError::MissingColumn { .. })
        ));
    }

    #[test]
    fn closures_act_as_sources() {
        let src = |run_id: u32| -> Result<Option<TimeSeries>, AnalysisError> {
            Ok((run_id == 1).then(|| TimeSeries::new(vec![0.5; 4])))
        };
        assert!(src.load(1).unwrap().is_some());
        assert!(src.load(2).unwrap().is_none());
        assert_eq!(src.locate(2), "run 2");
    }
}
