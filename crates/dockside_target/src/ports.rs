use dockside_core::constants::{JOB_NAME_PREFIX, ports};
use dockside_core::prelude::*;

use std::collections::HashSet;

/// Lowest port of the accounting range not in `occupied`, or the overflow
/// value when the range is exhausted.
pub fn first_free_port(occupied: &HashSet<u16>) -> u16 {
    (ports::RANGE_START..ports::RANGE_END)
        .step_by(ports::RANGE_STEP)
        .find(|port| !occupied.contains(port))
        .unwrap_or(ports::OVERFLOW)
}

/// Picks host ports for jobs based on what job containers already publish.
#[derive(Clone)]
pub struct PortAllocator<R> {
    runtime: R,
}

impl<R: ContainerRuntime> PortAllocator<R> {
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    /// Host ports published by job containers.
    pub async fn occupied_ports(&self) -> Result<HashSet<u16>, RuntimeError> {
        let containers = self
            .runtime
            .list_containers(ContainerFilter::NamePrefix(JOB_NAME_PREFIX.to_string()))
            .await?;

        Ok(containers
            .iter()
            .flat_map(|c| c.host_ports())
            .collect())
    }

    /// Next unoccupied port. [`ports::OVERFLOW`] is not guaranteed to be free.
    pub async fn next_free_port(&self) -> Result<u16, RuntimeError> {
        let occupied = self.occupied_ports().await?;
        let port = first_free_port(&occupied);
        if port == ports::OVERFLOW {
            tracing::warn!(occupied = occupied.len(), "job port range exhausted");
        }
        Ok(port)
    }
}

#[cfg(test)]
#[path = "ports_tests.rs"]
mod tests;
