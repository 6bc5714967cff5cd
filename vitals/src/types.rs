//! Wire types for the probe endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Check outcomes that count as ready. Matching is exact and case-sensitive.
pub const READY_CHECK_VALUES: [&str; 4] = ["connected", "available", "reachable", "healthy"];

/// Returns true when every check outcome is one of [`READY_CHECK_VALUES`].
///
/// An empty set of checks is ready.
pub fn checks_ready(checks: &HashMap<String, String>) -> bool {
    checks
        .values()
        .all(|outcome| READY_CHECK_VALUES.contains(&outcome.as_str()))
}

/// Overall health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Service is healthy
    Healthy,
    /// Service is unhealthy
    Unhealthy,
}

impl HealthStatus {
    /// Whether this is [`HealthStatus::Healthy`]
    pub fn is_healthy(self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health check response (`GET /health`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: HealthStatus,

    /// When the status was computed
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    /// Response stamped with the current time
    pub fn now(status: HealthStatus) -> Self {
        Self {
            status,
            timestamp: Utc::now(),
        }
    }
}

/// Liveness probe response (`GET /health/live`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivenessResponse {
    /// Process is running and should not be restarted
    pub alive: bool,

    /// When the status was computed
    pub timestamp: DateTime<Utc>,
}

impl LivenessResponse {
    /// Response stamped with the current time
    pub fn now(alive: bool) -> Self {
        Self {
            alive,
            timestamp: Utc::now(),
        }
    }
}

/// Readiness probe response (`GET /health/ready`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Overall readiness
    pub ready: bool,

    /// When the checks ran
    pub timestamp: DateTime<Utc>,

    /// Check name to outcome
    #[serde(default)]
    pub checks: HashMap<String, String>,
}

impl ReadinessResponse {
    /// Build a response whose `ready` flag is derived from `checks`
    pub fn from_checks(checks: HashMap<String, String>) -> Self {
        Self {
            ready: checks_ready(&checks),
            timestamp: Utc::now(),
            checks,
        }
    }
}

/// Service status document (`GET /status`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Service name
    pub service_name: String,

    /// Service version
    pub version: String,

    /// Git commit the binary was built from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,

    /// Build timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_time: Option<DateTime<Utc>>,

    /// Process start time
    pub start_time: DateTime<Utc>,

    /// Whole seconds since `start_time`
    pub uptime_seconds: i64,

    /// Deployment environment
    pub environment: String,

    /// Host the instance runs on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// External systems this service depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
}

/// Status of an external dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Dependency name
    pub name: String,

    /// Free-form status
    pub status: String,

    /// Dependency version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Dependency {
    /// Create a dependency without a version
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            version: None,
        }
    }

    /// Set the dependency version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}
