//! Web server module

mod middleware;
mod routes;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer};
use tracing::info;

use crate::config::Config;
use crate::data::RawTables;
use middleware::RequestLoggingLayer;

pub struct AppState {
    pub tables: Arc<RawTables>,
    pub default_country: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    // Every API response is recomputed from the raw tables
    let api = Router::new()
        .route("/figures/map", get(routes::map_figure))
        .route("/figures/bar", get(routes::bar_figure))
        .route("/figures/line", get(routes::line_figure))
        .route("/countries", get(routes::api_countries))
        .route("/totals", get(routes::api_totals))
        .route("/daily", get(routes::api_daily))
        .route("/timeseries", get(routes::api_timeseries))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route("/", get(routes::index))
        .nest("/api", api)
        .nest_service("/static", ServeDir::new("static"))
        .fallback(routes::not_found)
        .layer(RequestLoggingLayer)
        .with_state(state)
}

pub async fn start_server(config: &Config, tables: Arc<RawTables>) -> Result<()> {
    let state = Arc::new(AppState {
        tables,
        default_country: config.data.default_country.clone(),
    });
    let app = router(state);

    let addr = config.bind_addr();
    info!("Web server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
