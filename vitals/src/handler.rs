//! Probe endpoint handlers
//!
//! | Route            | Success status             |
//! |------------------|----------------------------|
//! | `/health`        | 200 healthy, 503 unhealthy |
//! | `/health/live`   | 200 alive, 503 otherwise   |
//! | `/health/ready`  | 200 ready, 503 otherwise   |
//! | `/status`        | 200                        |
//! | `/metrics`       | 200 (`text/plain`)         |
//!
//! Any reporter failure is answered with 500 and `{"error": "<message>"}`.
//! Methods other than GET get 405 from the router.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;

use crate::{context::Context, error::Result, reporter::HealthReporter};

/// Content type of the metrics endpoint
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Route paths
pub mod paths {
    /// Overall health
    pub const HEALTH: &str = "/health";
    /// Liveness probe
    pub const LIVENESS: &str = "/health/live";
    /// Readiness probe
    pub const READINESS: &str = "/health/ready";
    /// Status document
    pub const STATUS: &str = "/status";
    /// Metrics exposition
    pub const METRICS: &str = "/metrics";
}

/// Binds a [`HealthReporter`] to the probe routes
///
/// Stateless apart from the shared reporter, so it is cheap to clone and
/// safe to serve any number of concurrent requests.
#[derive(Clone)]
pub struct HealthHandler {
    reporter: Arc<dyn HealthReporter>,
    request_timeout: Option<Duration>,
}

impl HealthHandler {
    /// Create a handler for `reporter`
    pub fn new(reporter: impl HealthReporter) -> Self {
        Self::from_arc(Arc::new(reporter))
    }

    /// Create a handler for an already shared reporter
    pub fn from_arc(reporter: Arc<dyn HealthReporter>) -> Self {
        Self {
            reporter,
            request_timeout: None,
        }
    }

    /// Bound every reporter call by `timeout`
    ///
    /// A zero timeout disables the bound.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Router serving the five probe routes
    ///
    /// Merge it into an application router with [`Router::merge`].
    pub fn routes<S>(self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        Router::new()
            .route(paths::HEALTH, get(health))
            .route(paths::LIVENESS, get(liveness))
            .route(paths::READINESS, get(readiness))
            .route(paths::STATUS, get(status))
            .route(paths::METRICS, get(metrics))
            .with_state(self)
    }

    fn context(&self) -> Context {
        let ctx = Context::background();
        match self.request_timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }
}

fn status_for(ok: bool) -> StatusCode {
    if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn health(State(handler): State<HealthHandler>) -> Result<Response> {
    let ctx = handler.context();
    let resp = ctx.run(handler.reporter.health(&ctx)).await??;
    Ok((status_for(resp.status.is_healthy()), Json(resp)).into_response())
}

async fn liveness(State(handler): State<HealthHandler>) -> Result<Response> {
    let ctx = handler.context();
    let resp = ctx.run(handler.reporter.liveness(&ctx)).await??;
    Ok((status_for(resp.alive), Json(resp)).into_response())
}

async fn readiness(State(handler): State<HealthHandler>) -> Result<Response> {
    let ctx = handler.context();
    let resp = ctx.run(handler.reporter.readiness(&ctx)).await??;
    Ok((status_for(resp.ready), Json(resp)).into_response())
}

async fn status(State(handler): State<HealthHandler>) -> Result<Response> {
    let ctx = handler.context();
    let resp = ctx.run(handler.reporter.status(&ctx)).await??;
    Ok((StatusCode::OK, Json(resp)).into_response())
}

async fn metrics(State(handler): State<HealthHandler>) -> Result<Response> {
    let ctx = handler.context();
    let body = ctx.run(handler.reporter.metrics(&ctx)).await??;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        body,
    )
        .into_response())
}
