//! Minimal header-indexed CSV reader shared by the event table and the
//! per-run time series loaders.

use std::collections::HashMap;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use crate::error::AnalysisError;

#[derive(Clone, Debug)]
pub struct CsvRow {
    /// 1-based line number in the source file.
    pub line: usize,
    pub cells: Vec<String>,
}

impl CsvRow {
    pub fn cell(&self, idx: usize) -> Option<&str> {
        self.cells.get(idx).map(String::as_str)
    }
}

#[derive(Clone, Debug)]
pub struct CsvTable {
    pub path: PathBuf,
    col_idx: HashMap<String, usize>,
    pub rows: Vec<CsvRow>,
}

impl CsvTable {
    pub fn read(path: &Path) -> Result<Self, AnalysisError> {
        let text = read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        Self::parse(path, &text)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, AnalysisError> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());
        let (_, header) = lines
            .next()
            .ok_or_else(|| AnalysisError::parse(path, 1, "empty CSV"))?;
        let header = header.trim_start_matches('\u{feff}');

        let mut col_idx = HashMap::new();
        for (i, c) in header.split(',').enumerate() {
            col_idx.insert(unquote(c).to_string(), i);
        }

        let rows = lines
            .map(|(i, l)| CsvRow {
                line: i + 1,
                cells: l.split(',').map(|c| unquote(c).to_string()).collect(),
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            col_idx,
            rows,
        })
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.col_idx.get(name).copied()
    }

    pub fn require(&self, name: &str) -> Result<usize, AnalysisError> {
        self.column(name)
            .ok_or_else(|| AnalysisError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parses a float cell. Empty and NA-style markers map to `None`.
pub fn parse_opt_f64(v: Option<&str>) -> Result<Option<f64>, String> {
    let Some(s) = v.map(str::trim) else {
        return Ok(None);
    };
    if is_missing(s) {
        return Ok(None);
    }
    let x = s
        .parse::<f64>()
        .map_err(|e| format!("invalid number `{s}`: {e}"))?;
    if x.is_nan() { Ok(None) } else { Ok(Some(x)) }
}

/// Parses an integer cell, accepting integral floats such as `12.0`.
pub fn parse_i64_required(v: Option<&str>, name: &str) -> Result<i64, String> {
    let s = v
        .map(str::trim)
        .filter(|s| !is_missing(s))
        .ok_or_else(|| format!("missing value for `{name}`"))?;
    if let Ok(x) = s.parse::<i64>() {
        return Ok(x);
    }
    let x = s
        .parse::<f64>()
        .map_err(|e| format!("invalid {name} `{s}`: {e}"))?;
    if x.is_finite() && x.fract() == 0.0 {
        Ok(x as i64)
    } else {
        Err(format!("invalid {name} `{s}`: not an integer"))
    }
}

/// Trims a cell and drops one pair of surrounding double quotes.
fn unquote(cell: &str) -> &str {
    let cell = cell.trim();
    cell.strip_prefix('"')
        .and_then(|c| c.strip_suffix('"'))
        .map(str::trim)
        .unwrap_or(cell)
}

fn is_missing(s: &str) -> bool {
    matches!(s, "" | "nan" | "NaN" | "NAN" | "NA" | "N/A" | "null" | "None")
}
