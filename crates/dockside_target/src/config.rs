use dockside_core::constants::DEFAULT_TRACING_HEADER;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings shared by every deployment on this target.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Address under which jobs reach the platform's public API.
    pub internal_pub_url: String,
    pub docker_registry: String,
    pub registry_namespace: String,
    /// Docker network all job containers are attached to.
    pub network: String,
    /// OpenTelemetry collector. Telemetry is off when `None`.
    pub open_telemetry_endpoint: Option<String>,
    pub tracing_header_name: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            internal_pub_url: "http://pub:7005/pub".to_string(),
            docker_registry: "localhost:5000".to_string(),
            registry_namespace: "jobs".to_string(),
            network: "dockside_default".to_string(),
            open_telemetry_endpoint: None,
            tracing_header_name: DEFAULT_TRACING_HEADER.to_string(),
        }
    }
}

/// Readiness wait and discovery tuning.
#[derive(Clone, Debug)]
pub struct HealthConfig {
    /// Upper bound on how long a freshly deployed job may take to become operational.
    pub timeout: Duration,
    /// Pause between two readiness polls.
    pub interval: Duration,
    /// Per-request timeout of a single probe.
    pub quick_check_timeout: Duration,
    /// Number of jobs probed at once while listing.
    pub discovery_concurrency: usize,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15 * 60),
            interval: Duration::from_secs(2),
            quick_check_timeout: Duration::from_secs(3),
            discovery_concurrency: 8,
        }
    }
}
