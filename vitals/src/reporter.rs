//! Health reporting backends
//!
//! [`HealthReporter`] is the seam between the HTTP layer and whatever knows
//! the actual state of the service. [`BaseReporter`] is the default
//! implementation: it is always healthy and alive, derives readiness from an
//! optional [`CheckProvider`], reports static build information plus uptime,
//! and renders metrics through an optional [`MetricsProvider`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    config::Config,
    context::Context,
    error::Result,
    types::{
        Dependency, HealthResponse, HealthStatus, LivenessResponse, ReadinessResponse,
        StatusResponse,
    },
};

/// Placeholder exposition text served when no metrics provider is configured
pub const DEFAULT_METRICS: &str = r#"# HELP http_requests_total Total number of HTTP requests
# TYPE http_requests_total counter
http_requests_total{method="GET",status="200"} 0
# HELP http_request_duration_seconds HTTP request latency
# TYPE http_request_duration_seconds histogram
http_request_duration_seconds_bucket{le="0.005"} 0
http_request_duration_seconds_bucket{le="0.01"} 0
http_request_duration_seconds_bucket{le="0.025"} 0
http_request_duration_seconds_sum 0
http_request_duration_seconds_count 0
"#;

/// Answers the five probe queries
#[async_trait]
pub trait HealthReporter: Send + Sync + 'static {
    /// Overall health (`GET /health`)
    async fn health(&self, ctx: &Context) -> Result<HealthResponse>;

    /// Liveness (`GET /health/live`)
    async fn liveness(&self, ctx: &Context) -> Result<LivenessResponse>;

    /// Readiness (`GET /health/ready`)
    async fn readiness(&self, ctx: &Context) -> Result<ReadinessResponse>;

    /// Service status (`GET /status`)
    async fn status(&self, ctx: &Context) -> Result<StatusResponse>;

    /// Metrics exposition text (`GET /metrics`)
    async fn metrics(&self, ctx: &Context) -> Result<String>;
}

#[async_trait]
impl<R> HealthReporter for Arc<R>
where
    R: HealthReporter + ?Sized,
{
    async fn health(&self, ctx: &Context) -> Result<HealthResponse> {
        (**self).health(ctx).await
    }

    async fn liveness(&self, ctx: &Context) -> Result<LivenessResponse> {
        (**self).liveness(ctx).await
    }

    async fn readiness(&self, ctx: &Context) -> Result<ReadinessResponse> {
        (**self).readiness(ctx).await
    }

    async fn status(&self, ctx: &Context) -> Result<StatusResponse> {
        (**self).status(ctx).await
    }

    async fn metrics(&self, ctx: &Context) -> Result<String> {
        (**self).metrics(ctx).await
    }
}

/// Supplies readiness check outcomes, keyed by check name
pub trait CheckProvider: Send + Sync {
    /// Run the checks
    fn checks(&self, ctx: &Context) -> HashMap<String, String>;
}

impl<F> CheckProvider for F
where
    F: Fn(&Context) -> HashMap<String, String> + Send + Sync,
{
    fn checks(&self, ctx: &Context) -> HashMap<String, String> {
        self(ctx)
    }
}

/// Renders metrics in the Prometheus text exposition format
pub trait MetricsProvider: Send + Sync {
    /// Render the current metrics
    fn render(&self, ctx: &Context) -> Result<String>;
}

impl<F> MetricsProvider for F
where
    F: Fn(&Context) -> Result<String> + Send + Sync,
{
    fn render(&self, ctx: &Context) -> Result<String> {
        self(ctx)
    }
}

/// Default reporter
///
/// All fields are fixed at construction. `start_time` is captured once by
/// [`BaseReporter::new`] and only read afterwards.
///
/// ```rust
/// use std::collections::HashMap;
/// use vitals::prelude::*;
///
/// let reporter = BaseReporter::new("orders", "1.4.0", "production")
///     .with_git_commit("9f1c2ab")
///     .with_dependency(Dependency::new("postgres", "healthy").with_version("16.2"))
///     .with_check_provider(|_ctx: &Context| {
///         HashMap::from([("postgres".to_string(), "connected".to_string())])
///     });
/// ```
#[derive(Clone)]
pub struct BaseReporter {
    service_name: String,
    version: String,
    environment: String,
    git_commit: Option<String>,
    build_time: Option<DateTime<Utc>>,
    start_time: DateTime<Utc>,
    hostname: Option<String>,
    dependencies: Vec<Dependency>,
    checks: Option<Arc<dyn CheckProvider>>,
    metrics: Option<Arc<dyn MetricsProvider>>,
}

impl BaseReporter {
    /// Create a reporter started now
    pub fn new(
        service_name: impl Into<String>,
        version: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            version: version.into(),
            environment: environment.into(),
            git_commit: None,
            build_time: None,
            start_time: Utc::now(),
            hostname: None,
            dependencies: Vec::new(),
            checks: None,
            metrics: None,
        }
    }

    /// Create a reporter from the service section and dependency list of `config`
    pub fn from_config(config: &Config) -> Self {
        let service = &config.service;
        let mut reporter = Self::new(&service.name, &service.version, &service.environment)
            .with_dependencies(config.dependencies.clone());
        reporter.git_commit = service.git_commit.clone();
        reporter.build_time = service.build_time;
        reporter.hostname = service.hostname.clone();
        reporter
    }

    /// Set the git commit
    pub fn with_git_commit(mut self, git_commit: impl Into<String>) -> Self {
        self.git_commit = Some(git_commit.into());
        self
    }

    /// Set the build time
    pub fn with_build_time(mut self, build_time: DateTime<Utc>) -> Self {
        self.build_time = Some(build_time);
        self
    }

    /// Override the start time captured at construction
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    /// Set the hostname
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Append a dependency
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Replace the dependency list
    pub fn with_dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Derive readiness from `provider`
    pub fn with_check_provider(mut self, provider: impl CheckProvider + 'static) -> Self {
        self.checks = Some(Arc::new(provider));
        self
    }

    /// Serve metrics rendered by `provider` instead of [`DEFAULT_METRICS`]
    pub fn with_metrics_provider(mut self, provider: impl MetricsProvider + 'static) -> Self {
        self.metrics = Some(Arc::new(provider));
        self
    }

    /// Service name
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Start time
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Whole seconds since start, never negative
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds().max(0)
    }
}

impl std::fmt::Debug for BaseReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseReporter")
            .field("service_name", &self.service_name)
            .field("version", &self.version)
            .field("environment", &self.environment)
            .field("start_time", &self.start_time)
            .field("check_provider", &self.checks.is_some())
            .field("metrics_provider", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HealthReporter for BaseReporter {
    async fn health(&self, _ctx: &Context) -> Result<HealthResponse> {
        Ok(HealthResponse::now(HealthStatus::Healthy))
    }

    async fn liveness(&self, _ctx: &Context) -> Result<LivenessResponse> {
        Ok(LivenessResponse::now(true))
    }

    async fn readiness(&self, ctx: &Context) -> Result<ReadinessResponse> {
        let checks = match &self.checks {
            Some(provider) => provider.checks(ctx),
            None => HashMap::new(),
        };

        let response = ReadinessResponse::from_checks(checks);
        if !response.ready {
            tracing::warn!(checks = ?response.checks, "Readiness checks failing");
        }

        Ok(response)
    }

    async fn status(&self, _ctx: &Context) -> Result<StatusResponse> {
        Ok(StatusResponse {
            service_name: self.service_name.clone(),
            version: self.version.clone(),
            git_commit: self.git_commit.clone(),
            build_time: self.build_time,
            start_time: self.start_time,
            uptime_seconds: self.uptime_seconds(),
            environment: self.environment.clone(),
            hostname: self.hostname.clone(),
            dependencies: self.dependencies.clone(),
        })
    }

    async fn metrics(&self, ctx: &Context) -> Result<String> {
        match &self.metrics {
            Some(provider) => provider.render(ctx),
            None => Ok(DEFAULT_METRICS.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::Duration;

    fn reporter() -> BaseReporter {
        BaseReporter::new("test-service", "1.0.0", "test")
    }

    #[tokio::test]
    async fn test_health_is_healthy() {
        let before = Utc::now();
        let resp = reporter().health(&Context::background()).await.unwrap();
        assert_eq!(resp.status, HealthStatus::Healthy);
        assert!(resp.timestamp >= before);
    }

    #[tokio::test]
    async fn test_liveness_is_alive() {
        let resp = reporter().liveness(&Context::background()).await.unwrap();
        assert!(resp.alive);
    }

    #[tokio::test]
    async fn test_readiness_without_provider() {
        let resp = reporter().readiness(&Context::background()).await.unwrap();
        assert!(resp.ready);
        assert!(resp.checks.is_empty());
    }

    #[tokio::test]
    async fn test_readiness_all_checks_passing() {
        let reporter = reporter().with_check_provider(|_: &Context| {
            HashMap::from([
                ("database".to_string(), "connected".to_string()),
                ("cache".to_string(), "available".to_string()),
                ("api".to_string(), "reachable".to_string()),
                ("queue".to_string(), "healthy".to_string()),
            ])
        });

        let resp = reporter.readiness(&Context::background()).await.unwrap();
        assert!(resp.ready);
        assert_eq!(resp.checks.len(), 4);
    }

    #[tokio::test]
    async fn test_readiness_with_failing_check() {
        let reporter = reporter().with_check_provider(|_: &Context| {
            HashMap::from([
                ("database".to_string(), "connected".to_string()),
                ("cache".to_string(), "disconnected".to_string()),
            ])
        });

        let resp = reporter.readiness(&Context::background()).await.unwrap();
        assert!(!resp.ready);
        assert_eq!(resp.checks["cache"], "disconnected");
    }

    #[tokio::test]
    async fn test_readiness_empty_outcome_is_not_ready() {
        let reporter = reporter().with_check_provider(|_: &Context| {
            HashMap::from([("database".to_string(), String::new())])
        });

        let resp = reporter.readiness(&Context::background()).await.unwrap();
        assert!(!resp.ready);
    }

    #[tokio::test]
    async fn test_check_provider_receives_context() {
        let reporter = reporter().with_check_provider(|ctx: &Context| {
            let outcome = if ctx.deadline().is_some() {
                "connected"
            } else {
                "no deadline"
            };
            HashMap::from([("database".to_string(), outcome.to_string())])
        });

        let ctx = Context::background().with_timeout(std::time::Duration::from_secs(5));
        assert!(reporter.readiness(&ctx).await.unwrap().ready);
        assert!(!reporter.readiness(&Context::background()).await.unwrap().ready);
    }

    #[tokio::test]
    async fn test_status_minimal() {
        let start = Utc::now();
        let reporter = reporter().with_start_time(start);
        let resp = reporter.status(&Context::background()).await.unwrap();

        assert_eq!(resp.service_name, "test-service");
        assert_eq!(resp.version, "1.0.0");
        assert_eq!(resp.environment, "test");
        assert_eq!(resp.start_time, start);
        assert!(resp.git_commit.is_none());
        assert!(resp.build_time.is_none());
        assert!(resp.hostname.is_none());
        assert!(resp.dependencies.is_empty());
        assert!(resp.uptime_seconds <= 1);
    }

    #[tokio::test]
    async fn test_status_full() {
        let now = Utc::now();
        let build_time = now - Duration::hours(24);
        let reporter = BaseReporter::new("test-service", "1.2.3", "production")
            .with_git_commit("abc123def456")
            .with_build_time(build_time)
            .with_start_time(now - Duration::hours(1))
            .with_hostname("test-host-123")
            .with_dependency(Dependency::new("postgres", "healthy").with_version("14.5"))
            .with_dependency(Dependency::new("redis", "healthy").with_version("7.0"));

        let resp = reporter.status(&Context::background()).await.unwrap();
        assert_eq!(resp.git_commit.as_deref(), Some("abc123def456"));
        assert_eq!(resp.build_time, Some(build_time));
        assert_eq!(resp.hostname.as_deref(), Some("test-host-123"));
        assert_eq!(resp.dependencies.len(), 2);
        assert_eq!(resp.dependencies[0].name, "postgres");
        assert_eq!(resp.dependencies[1].version.as_deref(), Some("7.0"));
        assert!((resp.uptime_seconds - 3600).abs() <= 1);
    }

    #[tokio::test]
    async fn test_uptime_never_negative() {
        let reporter = reporter().with_start_time(Utc::now() + Duration::hours(1));
        assert_eq!(reporter.uptime_seconds(), 0);
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.service.name = "orders".to_string();
        config.service.version = "2.0.0".to_string();
        config.service.environment = "staging".to_string();
        config.service.hostname = Some("orders-1".to_string());
        config.service.git_commit = Some("deadbeef".to_string());
        config.dependencies = vec![Dependency::new("kafka", "reachable")];

        let reporter = BaseReporter::from_config(&config);
        assert_eq!(reporter.service_name(), "orders");
        assert_eq!(reporter.version, "2.0.0");
        assert_eq!(reporter.environment, "staging");
        assert_eq!(reporter.hostname.as_deref(), Some("orders-1"));
        assert_eq!(reporter.git_commit.as_deref(), Some("deadbeef"));
        assert_eq!(reporter.dependencies.len(), 1);
    }

    #[tokio::test]
    async fn test_default_metrics() {
        let metrics = reporter().metrics(&Context::background()).await.unwrap();
        assert_eq!(metrics, DEFAULT_METRICS);
        assert!(metrics.starts_with("# HELP http_requests_total"));
        assert!(metrics.ends_with("http_request_duration_seconds_count 0\n"));
    }

    #[tokio::test]
    async fn test_custom_metrics() {
        let reporter = reporter().with_metrics_provider(|_: &Context| {
            Ok("# custom metrics\ncustom_metric 42\n".to_string())
        });

        let metrics = reporter.metrics(&Context::background()).await.unwrap();
        assert_eq!(metrics, "# custom metrics\ncustom_metric 42\n");
    }

    #[tokio::test]
    async fn test_metrics_provider_error_propagates() {
        let reporter = reporter()
            .with_metrics_provider(|_: &Context| Err(Error::metrics("metrics collection failed")));

        let err = reporter.metrics(&Context::background()).await.unwrap_err();
        assert!(err.to_string().contains("metrics collection failed"));
    }

    #[tokio::test]
    async fn test_arc_reporter_delegates() {
        let shared: Arc<dyn HealthReporter> = Arc::new(reporter());
        let resp = shared.health(&Context::background()).await.unwrap();
        assert!(resp.status.is_healthy());
    }
}
