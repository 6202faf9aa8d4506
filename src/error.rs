//! Error types for loading and reshaping the case tables

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("{file}: missing column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("{file}:{line}: invalid count {value:?} in column '{column}'")]
    InvalidCount {
        file: String,
        line: u64,
        column: String,
        value: String,
    },

    #[error("{file}: invalid date header {value:?}")]
    InvalidDate { file: String, value: String },

    #[error("unknown country: {0}")]
    UnknownCountry(String),

    #[error("{file}: date columns differ from the confirmed time series")]
    SeriesDatesDiffer { file: String },

    #[error("time series tables share no dates")]
    DateMismatch,
}

pub type Result<T, E = DataError> = std::result::Result<T, E>;
