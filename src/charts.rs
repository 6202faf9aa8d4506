//! Chart builders
//!
//! Each builder maps a derived table to a Plotly figure (`data` traces plus a
//! `layout`) that the dashboard page hands straight to plotly.js. The table
//! builder produces HTML markup instead.

use serde::Serialize;
use serde_json::{json, Value};

use crate::data::{Condition, ConditionTotal, CountryDaily, TimeSeriesPoint};

const LINE_COLORS: [&str; 3] = ["#e74c3c", "#8e44ad", "#27ae60"];
const BAR_COLORS: [&str; 3] = ["#e74c3c", "#bdc3c7", "#2ecc71"];
const GEO_SIZE_MAX: f64 = 50.0;

/// A Plotly figure specification
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
}

/// Dark layout shared by every figure
fn dark_layout(title: &str) -> Value {
    json!({
        "title": { "text": title },
        "paper_bgcolor": "#111111",
        "plot_bgcolor": "#111111",
        "font": { "color": "#f2f5fa" },
        "xaxis": { "gridcolor": "#283442", "zerolinecolor": "#283442" },
        "yaxis": { "gridcolor": "#283442", "zerolinecolor": "#283442" },
        "margin": { "l": 60, "r": 30, "t": 60, "b": 40 },
    })
}

/// Cumulative confirmed/deaths/recovered lines over time, with a range slider.
pub fn line_chart(points: &[TimeSeriesPoint], title: &str) -> Figure {
    let dates: Vec<String> = points.iter().map(|p| p.date.format("%Y-%m-%d").to_string()).collect();

    let data = Condition::ALL
        .iter()
        .zip(LINE_COLORS)
        .map(|(condition, color)| {
            let values: Vec<u64> = points
                .iter()
                .map(|p| match condition {
                    Condition::Confirmed => p.confirmed,
                    Condition::Deaths => p.deaths,
                    Condition::Recovered => p.recovered,
                })
                .collect();
            json!({
                "type": "scatter",
                "mode": "lines",
                "name": condition.label(),
                "x": dates,
                "y": values,
                "line": { "color": color },
                "hovertemplate": "%{y:,}<extra>%{fullData.name}</extra>",
            })
        })
        .collect();

    let mut layout = dark_layout(title);
    layout["xaxis"]["title"] = json!({ "text": "Date" });
    layout["xaxis"]["rangeslider"] = json!({ "visible": true });
    layout["yaxis"]["title"] = json!({ "text": "Total" });
    layout["legend"] = json!({ "title": { "text": "Condition" } });

    Figure { data, layout }
}

/// Line chart placeholder for a country without any time series rows.
pub fn empty_line_chart(country: &str) -> Figure {
    let mut figure = line_chart(&[], country);
    figure.layout["annotations"] = json!([{
        "text": format!("No data for {}", country),
        "showarrow": false,
        "xref": "paper",
        "yref": "paper",
        "x": 0.5,
        "y": 0.5,
        "font": { "size": 18 },
    }]);
    figure
}

/// One bar per condition total.
pub fn bar_chart(totals: &[ConditionTotal]) -> Figure {
    let labels: Vec<&str> = totals.iter().map(|t| t.condition.label()).collect();
    let values: Vec<u64> = totals.iter().map(|t| t.total).collect();
    let colors: Vec<&str> = BAR_COLORS.iter().copied().cycle().take(totals.len()).collect();

    let mut layout = dark_layout("Total Global Cases");
    layout["xaxis"]["title"] = json!({ "text": "Condition" });
    layout["yaxis"]["title"] = json!({ "text": "Total" });

    Figure {
        data: vec![json!({
            "type": "bar",
            "x": labels,
            "y": values,
            "marker": { "color": colors },
            "hovertemplate": "%{x}: %{y:,}<extra></extra>",
        })],
        layout,
    }
}

/// Bubble per country on an orthographic globe, sized and coloured by confirmed cases.
pub fn geo_scatter(countries: &[CountryDaily]) -> Figure {
    let names: Vec<&str> = countries.iter().map(|c| c.country.as_str()).collect();
    let confirmed: Vec<u64> = countries.iter().map(|c| c.confirmed).collect();
    let deaths: Vec<u64> = countries.iter().map(|c| c.deaths).collect();
    let recovered: Vec<u64> = countries.iter().map(|c| c.recovered).collect();

    // Area sizing: the largest bubble gets a diameter of GEO_SIZE_MAX pixels.
    let max_confirmed = confirmed.iter().copied().max().unwrap_or(0).max(1) as f64;
    let sizeref = 2.0 * max_confirmed / (GEO_SIZE_MAX * GEO_SIZE_MAX);

    let mut layout = dark_layout("");
    layout["geo"] = json!({
        "projection": { "type": "orthographic" },
        "bgcolor": "#111111",
        "showland": true,
        "landcolor": "#2a2a2a",
        "showocean": true,
        "oceancolor": "#111111",
        "showcountries": true,
        "countrycolor": "#506784",
    });

    Figure {
        data: vec![json!({
            "type": "scattergeo",
            "mode": "markers+text",
            "locationmode": "country names",
            "locations": names,
            "hovertext": names,
            "text": deaths,
            "customdata": recovered,
            "marker": {
                "size": confirmed,
                "sizemode": "area",
                "sizeref": sizeref,
                "sizemin": 1,
                "color": confirmed,
                "colorscale": "Plasma",
                "showscale": true,
                "colorbar": { "title": { "text": "Confirmed" } },
            },
            "hovertemplate": "<b>%{hovertext}</b><br>Confirmed: %{marker.color:,}<br>\
                Deaths: %{text:,}<br>Recovered: %{customdata:,}<extra></extra>",
        })],
        layout,
    }
}

/// Render rows and columns into a grid table. All text is escaped.
pub fn table_markup(columns: &[&str], rows: &[Vec<String>]) -> String {
    let grid = format!("display: grid; grid-template-columns: repeat({}, 1fr)", columns.len().max(1));
    let mut html = String::from("<table>");

    html.push_str("<thead style=\"display: block; margin: 25px 0px\">");
    html.push_str(&format!("<tr style=\"{}; font-weight: 600; font-size: 16px\">", grid));
    for column in columns {
        html.push_str(&format!("<th>{}</th>", html_escape::encode_text(column)));
    }
    html.push_str("</tr></thead>");

    html.push_str("<tbody style=\"max-height: 50vh; display: block; overflow: scroll\">");
    for row in rows {
        html.push_str(&format!(
            "<tr style=\"{}; border-top: 1px solid white; padding: 30px 0px; text-align: center\">",
            grid
        ));
        for value in row {
            html.push_str(&format!("<td>{}</td>", html_escape::encode_text(value)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");

    html
}

/// The country-daily table as markup.
pub fn country_table(countries: &[CountryDaily]) -> String {
    let rows: Vec<Vec<String>> = countries
        .iter()
        .map(|c| {
            vec![
                c.country.clone(),
                c.confirmed.to_string(),
                c.deaths.to_string(),
                c.recovered.to_string(),
            ]
        })
        .collect();
    table_markup(&["Country", "Confirmed", "Deaths", "Recovered"], &rows)
}
