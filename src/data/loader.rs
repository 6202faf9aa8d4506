//! CSV loading for the daily report and the global time series files

use chrono::NaiveDate;
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{Condition, RawTables, Snapshot, SnapshotRow, TimeSeriesRow, TimeSeriesTable};
use crate::config::DataConfig;
use crate::error::{DataError, Result};

/// Daily report file names, e.g. `11-09-2020.csv`
pub const SNAPSHOT_DATE_FORMAT: &str = "%m-%d-%Y";

/// Date headers of the time series files, e.g. `1/22/20`
const SERIES_DATE_FORMAT: &str = "%m/%d/%y";

const IDENTITY_COLUMNS: [&str; 4] = ["Province/State", "Country/Region", "Lat", "Long"];

/// Resolved locations of the two data directories
#[derive(Debug, Clone, PartialEq)]
pub struct DataPaths {
    pub daily_repo: PathBuf,
    pub time_repo: PathBuf,
}

impl DataPaths {
    pub fn from_config(config: &DataConfig) -> Self {
        let repo = PathBuf::from(&config.repo);
        let daily_repo = config
            .daily_repo
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| repo.join("csse_covid_19_daily_reports"));
        let time_repo = config
            .time_repo
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| repo.join("csse_covid_19_time_series"));
        Self { daily_repo, time_repo }
    }

    pub fn snapshot_path(&self, date: NaiveDate) -> PathBuf {
        self.daily_repo
            .join(format!("{}.csv", date.format(SNAPSHOT_DATE_FORMAT)))
    }

    pub fn time_series_path(&self, condition: Condition) -> PathBuf {
        self.time_repo
            .join(format!("time_series_covid19_{}_global.csv", condition.as_str()))
    }
}

/// Load the snapshot and all three time series. Any failure aborts the whole load,
/// including time series files whose date columns differ from the confirmed file.
pub fn load_all(paths: &DataPaths, date: NaiveDate) -> Result<RawTables> {
    let snapshot = load_snapshot(&paths.snapshot_path(date), date)?;
    let confirmed = load_time_series(&paths.time_series_path(Condition::Confirmed), Condition::Confirmed)?;
    let deaths = load_time_series(&paths.time_series_path(Condition::Deaths), Condition::Deaths)?;
    let recovered = load_time_series(&paths.time_series_path(Condition::Recovered), Condition::Recovered)?;

    for table in [&deaths, &recovered] {
        if table.dates != confirmed.dates {
            return Err(DataError::SeriesDatesDiffer {
                file: paths.time_series_path(table.condition).display().to_string(),
            });
        }
    }

    Ok(RawTables {
        snapshot,
        confirmed,
        deaths,
        recovered,
    })
}

pub fn load_snapshot(path: &Path, date: NaiveDate) -> Result<Snapshot> {
    let file = open(path)?;
    let snapshot = read_snapshot(file, &path.display().to_string(), date)?;
    info!(path = %path.display(), rows = snapshot.rows.len(), "Loaded daily report");
    Ok(snapshot)
}

pub fn load_time_series(path: &Path, condition: Condition) -> Result<TimeSeriesTable> {
    let file = open(path)?;
    let table = read_time_series(file, &path.display().to_string(), condition)?;
    info!(
        path = %path.display(),
        rows = table.rows.len(),
        dates = table.dates.len(),
        "Loaded {} time series",
        condition.as_str()
    );
    Ok(table)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a daily report. Columns are located by header name; extra columns are ignored.
pub fn read_snapshot<R: Read>(reader: R, file: &str, date: NaiveDate) -> Result<Snapshot> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers().map_err(|e| csv_error(file, e))?.clone();

    let country_idx = column_index(&headers, "Country_Region", file)?;
    let confirmed_idx = column_index(&headers, "Confirmed", file)?;
    let deaths_idx = column_index(&headers, "Deaths", file)?;
    let recovered_idx = column_index(&headers, "Recovered", file)?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| csv_error(file, e))?;
        let line = line_of(&record);
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        rows.push(SnapshotRow {
            country: cell(country_idx).trim().to_string(),
            confirmed: parse_count(cell(confirmed_idx), file, line, "Confirmed")?,
            deaths: parse_count(cell(deaths_idx), file, line, "Deaths")?,
            recovered: parse_count(cell(recovered_idx), file, line, "Recovered")?,
        });
    }

    Ok(Snapshot { date, rows })
}

/// Parse a wide time series file: four identity columns, then one column per date.
pub fn read_time_series<R: Read>(reader: R, file: &str, condition: Condition) -> Result<TimeSeriesTable> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers().map_err(|e| csv_error(file, e))?.clone();

    for (idx, expected) in IDENTITY_COLUMNS.iter().enumerate() {
        if headers.get(idx).map(str::trim) != Some(*expected) {
            return Err(DataError::MissingColumn {
                file: file.to_string(),
                column: expected.to_string(),
            });
        }
    }

    let date_headers: Vec<&str> = headers.iter().skip(IDENTITY_COLUMNS.len()).collect();
    let mut dates: Vec<NaiveDate> = Vec::with_capacity(date_headers.len());
    for header in &date_headers {
        let invalid = || DataError::InvalidDate {
            file: file.to_string(),
            value: header.to_string(),
        };
        let date = NaiveDate::parse_from_str(header.trim(), SERIES_DATE_FORMAT).map_err(|_| invalid())?;
        // Columns must be strictly increasing: no duplicates, no going back
        if dates.last().is_some_and(|&previous| date <= previous) {
            return Err(invalid());
        }
        dates.push(date);
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| csv_error(file, e))?;
        let line = line_of(&record);

        let mut values = Vec::with_capacity(dates.len());
        for (offset, header) in date_headers.iter().enumerate() {
            let raw = record.get(IDENTITY_COLUMNS.len() + offset).unwrap_or("");
            values.push(parse_count(raw, file, line, header)?);
        }

        rows.push(TimeSeriesRow {
            country: record.get(1).unwrap_or("").trim().to_string(),
            values,
        });
    }

    Ok(TimeSeriesTable {
        condition,
        dates,
        rows,
    })
}

fn column_index(headers: &StringRecord, name: &str, file: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| DataError::MissingColumn {
            file: file.to_string(),
            column: name.to_string(),
        })
}

fn csv_error(file: &str, source: csv::Error) -> DataError {
    DataError::Csv {
        file: file.to_string(),
        source,
    }
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Counts are non-negative integers. Blank cells count as zero and
/// whole-valued floats (`12.0`) are accepted.
fn parse_count(raw: &str, file: &str, line: u64, column: &str) -> Result<u64> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(0);
    }
    if let Ok(count) = value.parse::<u64>() {
        return Ok(count);
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
        _ => Err(DataError::InvalidCount {
            file: file.to_string(),
            line,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SNAPSHOT_CSV: &str = "\
FIPS,Admin2,Province_State,Country_Region,Last_Update,Lat,Long_,Confirmed,Deaths,Recovered,Active,Combined_Key
,,,Afghanistan,2020-11-10 05:25:58,33.93911,67.709953,42297,1574,34967,5756,Afghanistan
,,Ontario,Canada,2020-11-10 05:25:58,51.2538,-85.3232,85395,3231,72815,9349,\"Ontario, Canada\"
,,Quebec,Canada,2020-11-10 05:25:58,52.9399,-73.5491,116209,6477,,7588,\"Quebec, Canada\"
";

    const CONFIRMED_CSV: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,Afghanistan,33.93911,67.709953,0,1,3
Ontario,Canada,51.2538,-85.3232,2,4,8
";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 11, 9).unwrap()
    }

    #[test]
    fn snapshot_reads_named_columns() {
        let snapshot = read_snapshot(SNAPSHOT_CSV.as_bytes(), "test.csv", date()).unwrap();
        assert_eq!(snapshot.rows.len(), 3);
        assert_eq!(snapshot.rows[0].country, "Afghanistan");
        assert_eq!(snapshot.rows[0].confirmed, 42297);
        assert_eq!(snapshot.rows[1].country, "Canada");
        assert_eq!(snapshot.rows[1].deaths, 3231);
    }

    #[test]
    fn snapshot_blank_count_is_zero() {
        let snapshot = read_snapshot(SNAPSHOT_CSV.as_bytes(), "test.csv", date()).unwrap();
        assert_eq!(snapshot.rows[2].recovered, 0);
    }

    #[test]
    fn snapshot_missing_column_is_schema_error() {
        let csv = "Country_Region,Confirmed,Deaths\nA,1,2\n";
        let err = read_snapshot(csv.as_bytes(), "bad.csv", date()).unwrap_err();
        match err {
            DataError::MissingColumn { column, .. } => assert_eq!(column, "Recovered"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn snapshot_rejects_negative_count() {
        let csv = "Country_Region,Confirmed,Deaths,Recovered\nA,1,-2,0\n";
        let err = read_snapshot(csv.as_bytes(), "bad.csv", date()).unwrap_err();
        match err {
            DataError::InvalidCount { line, column, value, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, "Deaths");
                assert_eq!(value, "-2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn whole_float_counts_are_accepted() {
        assert_eq!(parse_count("12.0", "f", 1, "c").unwrap(), 12);
        assert!(parse_count("12.5", "f", 1, "c").is_err());
        assert!(parse_count("abc", "f", 1, "c").is_err());
    }

    #[test]
    fn time_series_parses_dates_and_values() {
        let table = read_time_series(CONFIRMED_CSV.as_bytes(), "ts.csv", Condition::Confirmed).unwrap();
        assert_eq!(table.condition, Condition::Confirmed);
        assert_eq!(
            table.dates,
            vec![
                NaiveDate::from_ymd_opt(2020, 1, 22).unwrap(),
                NaiveDate::from_ymd_opt(2020, 1, 23).unwrap(),
                NaiveDate::from_ymd_opt(2020, 1, 24).unwrap(),
            ]
        );
        assert_eq!(table.rows[0].values, vec![0, 1, 3]);
        assert_eq!(table.rows[1].country, "Canada");
        assert_eq!(table.rows[1].values, vec![2, 4, 8]);
    }

    #[test]
    fn time_series_requires_identity_columns() {
        let csv = "Country/Region,Lat,Long,1/22/20\nA,0,0,1\n";
        let err = read_time_series(csv.as_bytes(), "ts.csv", Condition::Deaths).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == "Province/State"));
    }

    #[test]
    fn time_series_rejects_bad_date_header() {
        let csv = "Province/State,Country/Region,Lat,Long,yesterday\n,A,0,0,1\n";
        let err = read_time_series(csv.as_bytes(), "ts.csv", Condition::Deaths).unwrap_err();
        assert!(matches!(err, DataError::InvalidDate { ref value, .. } if value == "yesterday"));
    }

    #[test]
    fn time_series_rejects_unordered_date_headers() {
        let csv = "Province/State,Country/Region,Lat,Long,1/23/20,1/22/20\n,A,0,0,5,1\n";
        let err = read_time_series(csv.as_bytes(), "ts.csv", Condition::Confirmed).unwrap_err();
        assert!(matches!(err, DataError::InvalidDate { ref value, .. } if value == "1/22/20"));
    }

    #[test]
    fn time_series_rejects_duplicate_date_headers() {
        let csv = "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/23/20\n,A,0,0,1,2,2\n";
        let err = read_time_series(csv.as_bytes(), "ts.csv", Condition::Confirmed).unwrap_err();
        assert!(matches!(err, DataError::InvalidDate { ref value, .. } if value == "1/23/20"));
    }

    #[test]
    fn paths_follow_repository_layout() {
        let config = DataConfig {
            repo: "/data/csse".to_string(),
            daily_repo: None,
            time_repo: Some("/elsewhere/series".to_string()),
            date: "11-09-2020".to_string(),
            default_country: String::new(),
        };
        let paths = DataPaths::from_config(&config);
        assert_eq!(
            paths.snapshot_path(date()),
            PathBuf::from("/data/csse/csse_covid_19_daily_reports/11-09-2020.csv")
        );
        assert_eq!(
            paths.time_series_path(Condition::Recovered),
            PathBuf::from("/elsewhere/series/time_series_covid19_recovered_global.csv")
        );
    }

    #[test]
    fn load_all_reads_repository_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths {
            daily_repo: dir.path().join("daily"),
            time_repo: dir.path().join("series"),
        };
        fs::create_dir_all(&paths.daily_repo).unwrap();
        fs::create_dir_all(&paths.time_repo).unwrap();
        fs::write(paths.snapshot_path(date()), SNAPSHOT_CSV).unwrap();
        for condition in Condition::ALL {
            fs::write(paths.time_series_path(condition), CONFIRMED_CSV).unwrap();
        }

        let tables = load_all(&paths, date()).unwrap();
        assert_eq!(tables.snapshot.rows.len(), 3);
        assert_eq!(tables.deaths.condition, Condition::Deaths);
        assert_eq!(tables.recovered.rows.len(), 2);
    }

    #[test]
    fn load_all_rejects_series_with_different_dates() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths {
            daily_repo: dir.path().to_path_buf(),
            time_repo: dir.path().to_path_buf(),
        };
        fs::write(paths.snapshot_path(date()), SNAPSHOT_CSV).unwrap();
        fs::write(paths.time_series_path(Condition::Confirmed), CONFIRMED_CSV).unwrap();
        fs::write(paths.time_series_path(Condition::Deaths), CONFIRMED_CSV).unwrap();
        fs::write(
            paths.time_series_path(Condition::Recovered),
            "Province/State,Country/Region,Lat,Long,1/23/20,1/24/20\n,Afghanistan,0,0,1,2\n",
        )
        .unwrap();

        let err = load_all(&paths, date()).unwrap_err();
        match err {
            DataError::SeriesDatesDiffer { file } => assert!(file.ends_with("time_series_covid19_recovered_global.csv")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_all_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths {
            daily_repo: dir.path().to_path_buf(),
            time_repo: dir.path().to_path_buf(),
        };
        let err = load_all(&paths, date()).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }
}
