use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading tables, aggregating windows, or rendering charts.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("missing required column `{column}` in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("window {index} has length {actual}, expected {expected}")]
    WindowShape {
        index: usize,
        actual: usize,
        expected: usize,
    },

    #[error("failed to render {}: {message}", path.display())]
    Render { path: PathBuf, message: String },
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    pub(crate) fn render(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Render {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
