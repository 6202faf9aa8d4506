//! HTTP routes. Every handler recomputes its table from the raw tables.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use super::AppState;
use crate::charts::{self, Figure};
use crate::dashboard::{self, Selection};
use crate::data::{reshape, ConditionTotal, CountryDaily, TimeSeriesPoint};
use crate::error::DataError;

impl IntoResponse for DataError {
    fn into_response(self) -> Response {
        let status = match self {
            DataError::UnknownCountry(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CountryQuery {
    #[serde(default)]
    pub country: Option<String>,
}

impl CountryQuery {
    fn selection(&self) -> Selection {
        Selection::from_query(self.country.as_deref())
    }
}

/// Serve the dashboard page
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(dashboard::render_page(&state.tables, &state.default_country))
}

/// Country bubble map
pub async fn map_figure(State(state): State<Arc<AppState>>) -> Json<Figure> {
    let countries = reshape::daily_by_country(&state.tables.snapshot);
    Json(charts::geo_scatter(&countries))
}

/// Condition totals bar chart
pub async fn bar_figure(State(state): State<Arc<AppState>>) -> Json<Figure> {
    let totals = reshape::totals(&state.tables.snapshot);
    Json(charts::bar_chart(&totals))
}

/// Dropdown handler: rebuild the line chart for the selected country
pub async fn line_figure(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountryQuery>,
) -> Result<Json<Figure>, DataError> {
    let view = dashboard::select_country(&query.selection(), &state.tables)?;
    Ok(Json(view.to_figure()))
}

#[derive(Debug, Serialize)]
pub struct CountriesResponse {
    pub default_country: String,
    pub countries: Vec<String>,
}

/// API: dropdown options
pub async fn api_countries(State(state): State<Arc<AppState>>) -> Json<CountriesResponse> {
    Json(CountriesResponse {
        default_country: state.default_country.clone(),
        countries: reshape::country_options(&state.tables.snapshot),
    })
}

/// API: global totals per condition
pub async fn api_totals(State(state): State<Arc<AppState>>) -> Json<Vec<ConditionTotal>> {
    Json(reshape::totals(&state.tables.snapshot))
}

/// API: per-country daily counts
pub async fn api_daily(State(state): State<Arc<AppState>>) -> Json<Vec<CountryDaily>> {
    Json(reshape::daily_by_country(&state.tables.snapshot))
}

#[derive(Debug, Serialize)]
pub struct TimeSeriesResponse {
    pub country: Option<String>,
    pub points: Vec<TimeSeriesPoint>,
}

/// API: global or per-country time series; unknown countries are a 404
pub async fn api_timeseries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountryQuery>,
) -> Result<Json<TimeSeriesResponse>, DataError> {
    let tables = &state.tables;
    let response = match query.selection() {
        Selection::Global => TimeSeriesResponse {
            country: None,
            points: reshape::global_time_series(&tables.confirmed, &tables.deaths, &tables.recovered)?,
        },
        Selection::Country(country) => TimeSeriesResponse {
            points: reshape::country_time_series(&tables.confirmed, &tables.deaths, &tables.recovered, &country)?,
            country: Some(country),
        },
    };
    Ok(Json(response))
}

/// Any other path
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}
