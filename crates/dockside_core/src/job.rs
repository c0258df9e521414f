use crate::constants::{INFRASTRUCTURE_NAME, JOB_INTERNAL_PORT, JOB_NAME_PREFIX};
use crate::env::EnvVars;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Name and version of a job. Unique per deployment target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobIdentity {
    pub name: String,
    pub version: String,
}

impl JobIdentity {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Deterministic resource name, stable across redeploys.
    pub fn resource_name(&self) -> String {
        job_resource_name(&self.name, &self.version)
    }

    /// Key under which per-job state (e.g. secrets) is stored.
    pub fn key(&self) -> String {
        format!("{}.{}", self.name, self.version)
    }
}

impl fmt::Display for JobIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

/// `job-<name>-<version>`, lower-cased, with anything outside `[a-z0-9-]` turned into `-`.
pub fn job_resource_name(name: &str, version: &str) -> String {
    format!("{JOB_NAME_PREFIX}{name}-{version}")
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Index 0 is the primary container; auxiliary containers get a numeric suffix.
pub fn container_name(resource_name: &str, index: usize) -> String {
    match index {
        0 => resource_name.to_string(),
        i => format!("{resource_name}-{i}"),
    }
}

/// Image reference for the container at `index` of a job.
pub fn job_image(
    registry: &str,
    namespace: &str,
    job_name: &str,
    tag: &str,
    index: usize,
) -> String {
    let repository = match index {
        0 => "job-entrypoint".to_string(),
        1 => "job-user-module".to_string(),
        i => format!("job-user-module-{i}"),
    };
    format!("{registry}/{namespace}/{repository}:{job_name}-{tag}")
}

/// `<resource_name>:<internal port>`, reachable from inside the job network.
pub fn internal_address(resource_name: &str) -> String {
    format!("{resource_name}:{JOB_INTERNAL_PORT}")
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Error,
}

/// A job as observed on the runtime. Built fresh on every call, never cached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRecord {
    pub name: String,
    pub version: String,
    pub status: JobStatus,
    /// Unix seconds.
    pub create_time: i64,
    /// Unix seconds.
    pub update_time: i64,
    /// Address of the primary container inside the job network.
    pub internal_name: String,
    pub image_tag: Option<String>,
    pub last_call_time: Option<i64>,
    pub error: Option<String>,
    pub infrastructure_target: String,
}

impl JobRecord {
    /// A `Running` record stamped with `timestamp`.
    pub fn running(identity: &JobIdentity, timestamp: i64) -> Self {
        Self {
            name: identity.name.clone(),
            version: identity.version.clone(),
            status: JobStatus::Running,
            create_time: timestamp,
            update_time: timestamp,
            internal_name: internal_address(&identity.resource_name()),
            image_tag: None,
            last_call_time: None,
            error: None,
            infrastructure_target: INFRASTRUCTURE_NAME.to_string(),
        }
    }

    pub fn identity(&self) -> JobIdentity {
        JobIdentity::new(&self.name, &self.version)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.internal_name)
    }
}

/// A request to (re)deploy a job.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub identity: JobIdentity,
    /// Family used to resolve the job's auth subject.
    pub family: String,
    /// Image tag shared by all containers of the job.
    pub tag: String,
    /// Caller-supplied runtime env vars. Must not use reserved names.
    pub runtime_env_vars: EnvVars,
    /// Number of containers: 1 for a plain job, 2 with a user-module sidecar.
    pub containers_num: usize,
}

impl DeployRequest {
    pub fn new(identity: JobIdentity, tag: impl Into<String>) -> Self {
        Self {
            family: identity.name.clone(),
            identity,
            tag: tag.into(),
            runtime_env_vars: EnvVars::new(),
            containers_num: 1,
        }
    }
}

/// Secrets attached to a job deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JobSecrets {
    pub docker_registry_secret: Option<String>,
    pub git_credentials: Option<GitCredentials>,
    pub secret_build_env: HashMap<String, String>,
    pub secret_runtime_env: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GitCredentials {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
