//! # vitals
//!
//! Standard health, liveness, readiness, status and metrics endpoints for a
//! networked service, plus a matching client for querying them.
//!
//! ## Features
//!
//! - **Probe routes**: `/health`, `/health/live`, `/health/ready`, `/status`
//!   and `/metrics` served by axum, with Kubernetes-friendly 200/503 mapping
//! - **Pluggable backend**: implement [`HealthReporter`](reporter::HealthReporter)
//!   or configure the default [`BaseReporter`](reporter::BaseReporter) with
//!   readiness checks and a metrics renderer
//! - **Client**: typed reqwest client that mirrors the handler, including the
//!   503-is-still-a-valid-answer contract of the probe routes
//! - **Cancellation**: every operation takes a [`Context`](context::Context)
//!   carrying a cancellation token and an optional deadline
//! - **Configuration**: Figment-based layered config (files + `VITALS_` env)
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use vitals::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let reporter = BaseReporter::from_config(&config).with_check_provider(|_ctx: &Context| {
//!         HashMap::from([("database".to_string(), "connected".to_string())])
//!     });
//!
//!     let app = HealthHandler::new(reporter)
//!         .with_request_timeout(config.service.timeout())
//!         .routes();
//!
//!     Server::new(config).serve(app).await
//! }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod observability;
pub mod reporter;
pub mod server;
pub mod types;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::{Client, ClientBuilder};
    pub use crate::config::{ClientConfig, Config, ServiceConfig};
    pub use crate::context::Context;
    pub use crate::error::{Error, ErrorResponse, Result};
    pub use crate::handler::{paths, HealthHandler, METRICS_CONTENT_TYPE};
    pub use crate::observability::init_tracing;
    pub use crate::reporter::{
        BaseReporter, CheckProvider, HealthReporter, MetricsProvider, DEFAULT_METRICS,
    };
    pub use crate::server::Server;
    pub use crate::types::{
        checks_ready, Dependency, HealthResponse, HealthStatus, LivenessResponse,
        ReadinessResponse, StatusResponse, READY_CHECK_VALUES,
    };

    // Re-export commonly used external types
    pub use async_trait::async_trait;
    pub use axum::Router;
    pub use tokio_util::sync::CancellationToken;
}
