//! HTTP client for the probe endpoints
//!
//! Mirror image of [`HealthHandler`](crate::handler::HealthHandler): issues
//! the GET, validates the status code, and decodes the body.
//!
//! `/health`, `/health/live` and `/health/ready` accept both 200 and 503 as
//! success, because a failing instance still answers with a well-formed body
//! describing what is wrong. `/status` and `/metrics` accept only 200.
//!
//! ```rust,no_run
//! use vitals::prelude::*;
//!
//! # async fn example() -> vitals::Result<()> {
//! let client = Client::new("http://orders.internal:8080")?;
//! let ready = client.readiness(&Context::background()).await?;
//! if !ready.ready {
//!     for (check, outcome) in &ready.checks {
//!         println!("{check}: {outcome}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use reqwest::{header::ACCEPT, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::{
    config::ClientConfig,
    context::Context,
    error::{Error, Result},
    handler::paths,
    types::{HealthResponse, LivenessResponse, ReadinessResponse, StatusResponse},
};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ACCEPT_JSON: &str = "application/json";
const ACCEPT_TEXT: &str = "text/plain";

/// Status codes accepted by the health, liveness and readiness calls
const PROBE_STATUSES: &[StatusCode] = &[StatusCode::OK, StatusCode::SERVICE_UNAVAILABLE];
const OK_ONLY: &[StatusCode] = &[StatusCode::OK];

/// Client for a remote instance
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
}

/// Builder for [`Client`]
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    http: Option<reqwest::Client>,
    timeout: Duration,
}

impl ClientBuilder {
    /// Execute requests with `http` instead of a default client
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Per-request timeout (default 30 seconds, zero disables it)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the base URL and build the client
    pub fn build(self) -> Result<Client> {
        let url = Url::parse(&self.base_url).map_err(Error::InvalidBaseUrl)?;

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .build()
                .map_err(|e| Error::Request(Box::new(e)))?,
        };

        Ok(Client {
            base_url: url.as_str().trim_end_matches('/').to_string(),
            http,
            timeout: self.timeout,
        })
    }
}

impl Client {
    /// Client with default settings
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder(base_url).build()
    }

    /// Client for the instance named by the `client` config section
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::builder(&config.base_url)
            .timeout(config.timeout())
            .build()
    }

    /// Start building a client
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            base_url: base_url.into(),
            http: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Normalised base URL, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `GET /health`
    pub async fn health(&self, ctx: &Context) -> Result<HealthResponse> {
        self.get_json(ctx, paths::HEALTH, PROBE_STATUSES).await
    }

    /// `GET /health/live`
    pub async fn liveness(&self, ctx: &Context) -> Result<LivenessResponse> {
        self.get_json(ctx, paths::LIVENESS, PROBE_STATUSES).await
    }

    /// `GET /health/ready`
    pub async fn readiness(&self, ctx: &Context) -> Result<ReadinessResponse> {
        self.get_json(ctx, paths::READINESS, PROBE_STATUSES).await
    }

    /// `GET /status`
    pub async fn status(&self, ctx: &Context) -> Result<StatusResponse> {
        self.get_json(ctx, paths::STATUS, OK_ONLY).await
    }

    /// `GET /metrics`, returning the body unmodified
    pub async fn metrics(&self, ctx: &Context) -> Result<String> {
        let (status, body) = self.fetch(ctx, paths::METRICS, ACCEPT_TEXT).await?;
        expect_status(status, body, OK_ONLY)
    }

    async fn get_json<T>(&self, ctx: &Context, path: &str, accepted: &[StatusCode]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let (status, body) = self.fetch(ctx, path, ACCEPT_JSON).await?;
        let body = expect_status(status, body, accepted)?;
        serde_json::from_str(&body).map_err(Error::Decode)
    }

    async fn fetch(&self, ctx: &Context, path: &str, accept: &str) -> Result<(StatusCode, String)> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.get(&url).header(ACCEPT, accept);
        if !self.timeout.is_zero() {
            request = request.timeout(self.timeout);
        }
        let request = request
            .build()
            .map_err(|e| Error::Request(Box::new(e)))?;

        tracing::debug!(url = %url, "Sending probe request");

        ctx.run(async {
            let response = self
                .http
                .execute(request)
                .await
                .map_err(|e| Error::Transport(Box::new(e)))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| Error::ReadBody(Box::new(e)))?;
            Ok::<_, Error>((status, body))
        })
        .await?
    }
}

fn expect_status(status: StatusCode, body: String, accepted: &[StatusCode]) -> Result<String> {
    if accepted.contains(&status) {
        Ok(body)
    } else {
        Err(Error::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }
}
