use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Everything needed to start one detached job container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    /// `KEY=VALUE` pairs.
    pub env: Vec<String>,
    pub network: String,
    /// `host:ip` entries added to the container's hosts file.
    pub extra_hosts: Vec<String>,
    pub labels: HashMap<String, String>,
    /// Pull the image even if present locally.
    pub always_pull: bool,
}

/// Which containers a listing should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerFilter {
    /// Containers whose name starts with the prefix.
    NamePrefix(String),
    /// The container with exactly this name.
    Exact(String),
}

impl ContainerFilter {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            ContainerFilter::NamePrefix(prefix) => name.starts_with(prefix.as_str()),
            ContainerFilter::Exact(exact) => name == exact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    /// Port published on the host, if any.
    pub host_port: Option<u16>,
    pub container_port: u16,
}

/// A container as reported by the runtime, running or stopped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub name: String,
    pub labels: HashMap<String, String>,
    pub ports: Vec<PortMapping>,
    pub running: bool,
}

impl ContainerInfo {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Host ports this container occupies. Dual-stack listings publish the
    /// same host port once per address family, so duplicates are possible.
    pub fn host_ports(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().filter_map(|p| p.host_port)
    }
}

/// How a followed log stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionExit {
    /// The session was closed on request.
    ClosedByCaller,
    /// The stream finished on its own (container stopped or removed).
    StreamEnded,
    /// The stream broke.
    Failed(String),
}
