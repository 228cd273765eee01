use std::path::Path;

use tracing::debug;

use super::table::{CsvTable, parse_i64_required, parse_opt_f64};
use crate::error::AnalysisError;

pub const COL_RUN: &str = "run";
pub const COL_T_GLOBAL: &str = "t_global";
pub const COL_TAU_DELAY: &str = "tau_delay";

/// One detected social-death event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventRecord {
    pub run_id: u32,
    /// Step index of the event inside the run's time series.
    pub t_global: i64,
    pub tau_delay: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct EventTable {
    pub records: Vec<EventRecord>,
    /// Non-missing, finite `tau_delay` values in row order.
    pub delays: Vec<f64>,
}

impl EventTable {
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let table = CsvTable::read(path)?;
        let events = Self::from_table(&table)?;
        debug!(
            path = %path.display(),
            rows = events.len(),
            delays = events.delays.len(),
            "loaded event table"
        );
        Ok(events)
    }

    pub fn from_table(table: &CsvTable) -> Result<Self, AnalysisError> {
        let run_i = table.require(COL_RUN)?;
        let t_i = table.require(COL_T_GLOBAL)?;
        let tau_i = table.require(COL_TAU_DELAY)?;

        let mut records = Vec::with_capacity(table.len());
        let mut delays = Vec::with_capacity(table.len());
        for row in &table.rows {
            let err = |msg: String| AnalysisError::parse(&table.path, row.line, msg);
            let run = parse_i64_required(row.cell(run_i), COL_RUN).map_err(err)?;
            let run_id = u32::try_from(run)
                .map_err(|_| err(format!("run id {run} is out of range")))?;
            let t_global = parse_i64_required(row.cell(t_i), COL_T_GLOBAL).map_err(err)?;
            // Infinite delays carry no usable magnitude; treat them as missing.
            let tau_delay = parse_opt_f64(row.cell(tau_i))
                .map_err(err)?
                .filter(|tau| tau.is_finite());

            if let Some(tau) = tau_delay {
                delays.push(tau);
            }
            records.push(EventRecord {
                run_id,
                t_global,
                tau_delay,
            });
        }
        Ok(Self { records, delays })
    }

    /// Number of event rows, including rows with a missing delay.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Numeric columns in table order, each with its missing values dropped.
    pub fn numeric_columns(&self) -> [(&'static str, Vec<f64>); 3] {
        [
            (
                COL_RUN,
                self.records.iter().map(|r| f64::from(r.run_id)).collect(),
            ),
            (
                COL_T_GLOBAL,
                self.records.iter().map(|r| r.t_global as f64).collect(),
            ),
            (COL_TAU_DELAY, self.delays.clone()),
        ]
    }
}
