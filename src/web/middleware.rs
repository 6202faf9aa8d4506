//! Request logging middleware
//!
//! Logs method, path, status and latency of every request. Static asset
//! requests are logged at debug level only.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    response::Response,
};
use futures::future::BoxFuture;
use std::{
    net::SocketAddr,
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};

/// Path prefixes logged at debug level
const QUIET_PREFIXES: &[&str] = &["/static/"];

/// Layer for HTTP request logging
#[derive(Clone, Copy, Default)]
pub struct RequestLoggingLayer;

impl<S> Layer<S> for RequestLoggingLayer {
    type Service = RequestLoggingMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLoggingMiddleware { inner }
    }
}

/// Middleware service for HTTP request logging
#[derive(Clone)]
pub struct RequestLoggingMiddleware<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestLoggingMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let method = request.method().clone();
            let path = request.uri().path().to_string();
            let client = request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            let started = Instant::now();
            let response = inner.call(request).await?;
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            let status = response.status().as_u16();

            if QUIET_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
                tracing::debug!(%method, %path, status, elapsed_ms, %client, "HTTP request");
            } else {
                tracing::info!(%method, %path, status, elapsed_ms, %client, "HTTP request");
            }

            Ok(response)
        })
    }
}
