//! Reshaping of raw tables into the presentation tables
//!
//! Every function here is pure: it reads already-loaded tables and returns a
//! freshly built result.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{
    Condition, ConditionTotal, CountryDaily, Snapshot, TimeSeriesPoint, TimeSeriesRow, TimeSeriesTable,
};
use crate::error::{DataError, Result};

/// Sum the three count columns of the snapshot, in fixed condition order.
pub fn totals(snapshot: &Snapshot) -> Vec<ConditionTotal> {
    Condition::ALL
        .iter()
        .map(|&condition| {
            let total = snapshot
                .rows
                .iter()
                .map(|row| match condition {
                    Condition::Confirmed => row.confirmed,
                    Condition::Deaths => row.deaths,
                    Condition::Recovered => row.recovered,
                })
                .sum();
            ConditionTotal { condition, total }
        })
        .collect()
}

/// Group the snapshot by country, summing provinces, largest confirmed count first.
///
/// Grouping yields countries in ascending name order and the sort is stable, so
/// ties on the confirmed count stay alphabetical.
pub fn daily_by_country(snapshot: &Snapshot) -> Vec<CountryDaily> {
    let mut grouped: BTreeMap<&str, CountryDaily> = BTreeMap::new();
    for row in &snapshot.rows {
        let entry = grouped.entry(row.country.as_str()).or_insert_with(|| CountryDaily {
            country: row.country.clone(),
            confirmed: 0,
            deaths: 0,
            recovered: 0,
        });
        entry.confirmed += row.confirmed;
        entry.deaths += row.deaths;
        entry.recovered += row.recovered;
    }

    let mut countries: Vec<CountryDaily> = grouped.into_values().collect();
    countries.sort_by(|a, b| b.confirmed.cmp(&a.confirmed));
    countries
}

/// Distinct country names in ascending order, for the country selector.
pub fn country_options(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .rows
        .iter()
        .map(|row| row.country.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Worldwide cumulative counts per date.
pub fn global_time_series(
    confirmed: &TimeSeriesTable,
    deaths: &TimeSeriesTable,
    recovered: &TimeSeriesTable,
) -> Result<Vec<TimeSeriesPoint>> {
    join_on_date(
        sum_by_date(confirmed, confirmed.rows.iter()),
        sum_by_date(deaths, deaths.rows.iter()),
        sum_by_date(recovered, recovered.rows.iter()),
    )
}

/// Cumulative counts per date for a single country.
///
/// A country that appears in none of the three tables is an `UnknownCountry`
/// error. A table without rows for a known country contributes zeros.
pub fn country_time_series(
    confirmed: &TimeSeriesTable,
    deaths: &TimeSeriesTable,
    recovered: &TimeSeriesTable,
    country: &str,
) -> Result<Vec<TimeSeriesPoint>> {
    let known = [confirmed, deaths, recovered]
        .iter()
        .any(|table| table.rows.iter().any(|row| row.country == country));
    if !known {
        return Err(DataError::UnknownCountry(country.to_string()));
    }

    let matching = |table: &TimeSeriesTable| -> Vec<(NaiveDate, u64)> {
        sum_by_date(table, table.rows.iter().filter(|row| row.country == country))
    };

    join_on_date(matching(confirmed), matching(deaths), matching(recovered))
}

/// Drop the identity columns and sum each date column over the given rows.
fn sum_by_date<'a>(
    table: &TimeSeriesTable,
    rows: impl Iterator<Item = &'a TimeSeriesRow>,
) -> Vec<(NaiveDate, u64)> {
    let mut sums = vec![0u64; table.dates.len()];
    for row in rows {
        for (sum, value) in sums.iter_mut().zip(&row.values) {
            *sum += value;
        }
    }
    table.dates.iter().copied().zip(sums).collect()
}

/// Inner join of the three condition columns on date, in the order of the first.
fn join_on_date(
    confirmed: Vec<(NaiveDate, u64)>,
    deaths: Vec<(NaiveDate, u64)>,
    recovered: Vec<(NaiveDate, u64)>,
) -> Result<Vec<TimeSeriesPoint>> {
    let any_input = !confirmed.is_empty() || !deaths.is_empty() || !recovered.is_empty();
    let deaths: HashMap<NaiveDate, u64> = deaths.into_iter().collect();
    let recovered: HashMap<NaiveDate, u64> = recovered.into_iter().collect();

    let points: Vec<TimeSeriesPoint> = confirmed
        .into_iter()
        .filter_map(|(date, confirmed)| {
            Some(TimeSeriesPoint {
                date,
                confirmed,
                deaths: *deaths.get(&date)?,
                recovered: *recovered.get(&date)?,
            })
        })
        .collect();

    if points.is_empty() && any_input {
        return Err(DataError::DateMismatch);
    }
    Ok(points)
}
