//! Case tables: raw CSV-backed tables and the shapes derived from them

pub mod loader;
pub mod reshape;

use chrono::NaiveDate;
use serde::Serialize;

pub use loader::{load_all, DataPaths};

/// One of the three tracked conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Confirmed,
    Deaths,
    Recovered,
}

impl Condition {
    /// Fixed presentation order
    pub const ALL: [Condition; 3] = [Condition::Confirmed, Condition::Deaths, Condition::Recovered];

    /// Name used in upstream file names (`time_series_covid19_<name>_global.csv`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Confirmed => "confirmed",
            Condition::Deaths => "deaths",
            Condition::Recovered => "recovered",
        }
    }

    /// Human readable label for charts and tables
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Confirmed => "Confirmed",
            Condition::Deaths => "Deaths",
            Condition::Recovered => "Recovered",
        }
    }
}

/// A row of the daily report, one per country or province
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub country: String,
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
}

/// Daily report for a single date
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub rows: Vec<SnapshotRow>,
}

/// A row of a time series file: the country plus one cumulative count per date.
/// Province and coordinates are dropped on load.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesRow {
    pub country: String,
    pub values: Vec<u64>,
}

/// Wide time series for one condition; `rows[i].values[j]` is the count on `dates[j]`.
/// `dates` is strictly increasing.
#[derive(Debug, Clone)]
pub struct TimeSeriesTable {
    pub condition: Condition,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<TimeSeriesRow>,
}

/// Everything loaded at startup. Never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RawTables {
    pub snapshot: Snapshot,
    pub confirmed: TimeSeriesTable,
    pub deaths: TimeSeriesTable,
    pub recovered: TimeSeriesTable,
}

/// Country-daily table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryDaily {
    pub country: String,
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
}

/// Totals table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionTotal {
    pub condition: Condition,
    pub total: u64,
}

/// Long-form time series row, all three conditions joined on date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
}
