/// Port every job container listens on inside the job network.
pub const JOB_INTERNAL_PORT: u16 = 7000;

/// Name under which this backend registers itself as an infrastructure target.
pub const INFRASTRUCTURE_NAME: &str = "docker";

/// Name prefix shared by all job containers, used for discovery.
pub const JOB_NAME_PREFIX: &str = "job-";

pub mod labels {
    pub const JOB_NAME: &str = "job-name";
    pub const JOB_VERSION: &str = "job-version";
}

/// Environment variables injected by the platform.
///
/// None of these may be supplied by the caller at deploy time.
pub mod env {
    pub const PUB_URL: &str = "PUB_URL";
    pub const JOB_NAME: &str = "JOB_NAME";
    pub const AUTH_TOKEN: &str = "AUTH_TOKEN";
    pub const JOB_DEPLOYMENT_TIMESTAMP: &str = "JOB_DEPLOYMENT_TIMESTAMP";
    pub const REQUEST_TRACING_HEADER: &str = "REQUEST_TRACING_HEADER";
    pub const OPENTELEMETRY_ENDPOINT: &str = "OPENTELEMETRY_ENDPOINT";
    pub const JOB_USER_MODULE_HOSTNAME: &str = "JOB_USER_MODULE_HOSTNAME";
}

/// Host port accounting range used by the port allocator.
pub mod ports {
    pub const RANGE_START: u16 = 7000;
    pub const RANGE_END: u16 = 8000;
    pub const RANGE_STEP: usize = 10;
    /// Returned when every port in the range is taken. Not unique.
    pub const OVERFLOW: u16 = 8000;
}

pub mod routes {
    pub const LIVE: &str = "/live";
    pub const READY: &str = "/ready";
    pub const METRICS: &str = "/metrics";
}

/// Metric holding the Unix time of the last call a job served.
pub const LAST_CALL_TIMESTAMP_METRIC: &str = "job_last_call_timestamp";

pub const DEFAULT_TRACING_HEADER: &str = "X-Request-Tracing-Id";
pub const HOST_GATEWAY_ALIAS: &str = "host.docker.internal:host-gateway";
