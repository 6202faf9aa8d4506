//! Dashboard page assembly and the country selection handler

use crate::charts::{self, Figure};
use crate::data::{reshape, RawTables, TimeSeriesPoint};
use crate::error::{DataError, Result};

const PAGE_TEMPLATE: &str = include_str!("../static/index.html");

/// Current state of the country dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Global,
    Country(String),
}

impl Selection {
    /// Empty or whitespace-only input means no selection.
    pub fn from_query(country: Option<&str>) -> Self {
        match country.map(str::trim) {
            Some(name) if !name.is_empty() => Selection::Country(name.to_string()),
            _ => Selection::Global,
        }
    }
}

/// What the line chart should show for a selection
#[derive(Debug, Clone, PartialEq)]
pub enum LineView {
    Series {
        title: String,
        points: Vec<TimeSeriesPoint>,
    },
    NoData {
        country: String,
    },
}

impl LineView {
    pub fn to_figure(&self) -> Figure {
        match self {
            LineView::Series { title, points } => charts::line_chart(points, title),
            LineView::NoData { country } => charts::empty_line_chart(country),
        }
    }
}

/// Recompute the line chart contents for a dropdown selection.
///
/// An unknown country becomes `LineView::NoData`; any other reshaping failure
/// is returned.
pub fn select_country(selection: &Selection, tables: &RawTables) -> Result<LineView> {
    match selection {
        Selection::Global => Ok(LineView::Series {
            title: "Global".to_string(),
            points: reshape::global_time_series(&tables.confirmed, &tables.deaths, &tables.recovered)?,
        }),
        Selection::Country(country) => {
            match reshape::country_time_series(&tables.confirmed, &tables.deaths, &tables.recovered, country) {
                Ok(points) => Ok(LineView::Series {
                    title: country.clone(),
                    points,
                }),
                Err(DataError::UnknownCountry(country)) => {
                    tracing::debug!(country = country.as_str(), "No time series rows for selected country");
                    Ok(LineView::NoData { country })
                }
                Err(e) => Err(e),
            }
        }
    }
}

/// Render the dashboard page: server-side table and dropdown, figures fetched by the page script.
pub fn render_page(tables: &RawTables, default_country: &str) -> String {
    let countries = reshape::daily_by_country(&tables.snapshot);
    let table = charts::country_table(&countries);
    let options = country_options_markup(&reshape::country_options(&tables.snapshot), default_country);

    let date = tables.snapshot.date.format("%Y-%m-%d").to_string();

    fill_template(
        PAGE_TEMPLATE,
        &[
            ("SNAPSHOT_DATE", date.as_str()),
            ("COUNTRY_OPTIONS", options.as_str()),
            ("COUNTRY_TABLE", table.as_str()),
        ],
    )
}

/// Replace `{{NAME}}` placeholders in a single pass. Inserted values are never
/// scanned again; unknown placeholders are left as they are.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let replacement = after.find("}}").and_then(|end| {
            let name = &after[..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (end, *value))
        });
        match replacement {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);

    out
}

fn country_options_markup(countries: &[String], selected: &str) -> String {
    let mut html = String::from("<option value=\"\">Global</option>");
    for country in countries {
        let attr = html_escape::encode_double_quoted_attribute(country);
        let text = html_escape::encode_text(country);
        if country == selected {
            html.push_str(&format!("<option value=\"{}\" selected>{}</option>", attr, text));
        } else {
            html.push_str(&format!("<option value=\"{}\">{}</option>", attr, text));
        }
    }
    html
}
