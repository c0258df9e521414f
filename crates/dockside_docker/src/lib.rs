//! # Dockside Docker
//!
//! [`ContainerRuntime`] backed by the Docker Engine API.
//!
//! Talks to the daemon through `bollard` instead of shelling out to the
//! `docker` CLI, so container listings arrive structured (names, labels,
//! published ports) and nothing has to be scraped from formatted text.

use dockside_core::prelude::*;

use bollard::Docker;
use bollard::config::ContainerCreateBody;
use bollard::container::LogOutput;
use bollard::errors::Error as BollardError;
use bollard::models::HostConfig;
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, ListContainersOptions, LogsOptions,
    RemoveContainerOptions,
};
use futures::{Stream, StreamExt, TryStreamExt, stream::BoxStream};
use std::collections::HashMap;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead};
use tokio_util::io::StreamReader;

#[derive(Clone)]
pub struct DockerRuntime {
    client: Docker,
}

impl DockerRuntime {
    /// Connects to the local Docker socket (defaults to /var/run/docker.sock on Linux)
    pub fn connect_local() -> Result<Self, RuntimeError> {
        let client = Docker::connect_with_local_defaults()
            .map_err(|e| RuntimeError::System(format!("Failed to connect to Docker: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Docker) -> Self {
        Self { client }
    }

    /// Verifies the daemon answers.
    pub async fn ping(&self) -> Result<(), RuntimeError> {
        self.client
            .version()
            .await
            .map_err(|e| RuntimeError::System(format!("Docker unavailable: {}", e)))?;
        Ok(())
    }

    async fn pull_image(&self, image: &str) -> Result<(), RuntimeError> {
        let options = CreateImageOptions {
            from_image: Some(image.to_string()),
            ..Default::default()
        };

        self.client
            .create_image(Some(options), None, None)
            .try_for_each(|_| async { Ok(()) })
            .await
            .map_err(|e| RuntimeError::Command(format!("Failed to pull {}: {}", image, e)))
    }
}

fn is_not_found(err: &BollardError) -> bool {
    matches!(
        err,
        BollardError::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

fn log_error(name: &str, err: BollardError) -> RuntimeError {
    if is_not_found(&err) {
        RuntimeError::NotFound(name.to_string())
    } else {
        RuntimeError::Command(format!("Failed to read logs of {}: {}", name, err))
    }
}

fn from_codec_error(err: AnyDelimiterCodecError) -> RuntimeError {
    match err {
        AnyDelimiterCodecError::Io(e) => match e.into_inner() {
            Some(inner) => match inner.downcast::<RuntimeError>() {
                Ok(runtime) => *runtime,
                Err(other) => RuntimeError::Command(other.to_string()),
            },
            None => RuntimeError::Command("log stream interrupted".to_string()),
        },
        other => RuntimeError::Command(other.to_string()),
    }
}

/// Re-frames log output into lines.
///
/// A frame from the daemon is one write by the container: it can carry
/// several lines or only part of one. Bytes are carried over until a newline
/// arrives, and an unterminated last line is flushed when the stream ends.
fn log_lines<S>(frames: S) -> impl Stream<Item = Result<String, RuntimeError>>
where
    S: Stream<Item = Result<LogOutput, RuntimeError>>,
{
    let bytes = frames.map(|frame| {
        frame
            .map(LogOutput::into_bytes)
            .map_err(std::io::Error::other)
    });
    let codec = AnyDelimiterCodec::new(b"\n".to_vec(), Vec::new());

    FramedRead::new(StreamReader::new(bytes), codec).map(|line| match line {
        Ok(line) => Ok(String::from_utf8_lossy(&line)
            .trim_end_matches('\r')
            .to_string()),
        Err(e) => Err(from_codec_error(e)),
    })
}

fn list_filters(filter: &ContainerFilter) -> HashMap<String, Vec<String>> {
    // Docker matches names as regexes against the slash-prefixed name.
    let pattern = match filter {
        ContainerFilter::NamePrefix(prefix) => format!("^/{prefix}"),
        ContainerFilter::Exact(name) => format!("^/{name}$"),
    };
    HashMap::from([("name".to_string(), vec![pattern])])
}

impl ContainerRuntime for DockerRuntime {
    async fn run_container(&self, spec: ContainerSpec) -> Result<(), RuntimeError> {
        if spec.always_pull {
            self.pull_image(&spec.image).await?;
        }

        let options = CreateContainerOptions {
            name: spec.name.clone().into(),
            ..Default::default()
        };

        let body = ContainerCreateBody {
            image: Some(spec.image),
            env: Some(spec.env),
            labels: Some(spec.labels),
            host_config: Some(HostConfig {
                network_mode: Some(spec.network),
                extra_hosts: Some(spec.extra_hosts),
                ..Default::default()
            }),
            ..Default::default()
        };

        self.client
            .create_container(Some(options), body)
            .await
            .map_err(|e| RuntimeError::Command(format!("Failed to create {}: {}", spec.name, e)))?;

        self.client
            .start_container(spec.name.as_str(), None)
            .await
            .map_err(|e| RuntimeError::Command(format!("Failed to start {}: {}", spec.name, e)))?;

        tracing::info!(container = %spec.name, "container started");
        Ok(())
    }

    async fn list_containers(
        &self,
        filter: ContainerFilter,
    ) -> Result<Vec<ContainerInfo>, RuntimeError> {
        let options = ListContainersOptions {
            all: true,
            filters: Some(list_filters(&filter)),
            ..Default::default()
        };

        let summaries = self
            .client
            .list_containers(Some(options))
            .await
            .map_err(|e| RuntimeError::System(format!("Failed to list containers: {}", e)))?;

        let containers = summaries
            .into_iter()
            .filter_map(|summary| {
                let name = summary
                    .names
                    .unwrap_or_default()
                    .into_iter()
                    .map(|n| n.trim_start_matches('/').to_string())
                    .find(|n| filter.matches(n))?;

                let ports = summary
                    .ports
                    .unwrap_or_default()
                    .into_iter()
                    .map(|p| PortMapping {
                        host_port: p.public_port,
                        container_port: p.private_port,
                    })
                    .collect();

                Some(ContainerInfo {
                    name,
                    labels: summary.labels.unwrap_or_default(),
                    ports,
                    running: summary.state.is_some_and(|s| s.to_string() == "running"),
                })
            })
            .collect();

        Ok(containers)
    }

    async fn remove_container(&self, name: &str) -> Result<(), RuntimeError> {
        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };

        match self.client.remove_container(name, Some(options)).await {
            Ok(()) => {
                tracing::info!(container = name, "container removed");
                Ok(())
            }
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(RuntimeError::Command(format!(
                "Failed to remove {}: {}",
                name, e
            ))),
        }
    }

    async fn read_logs(&self, name: &str, tail: usize) -> Result<String, RuntimeError> {
        let options = LogsOptions {
            stdout: true,
            stderr: true,
            tail: tail.to_string(),
            ..Default::default()
        };

        let frames = self
            .client
            .logs(name, Some(options))
            .map_err(|e| log_error(name, e));
        let lines: Vec<String> = log_lines(frames).try_collect().await?;

        Ok(lines.join("\n"))
    }

    fn follow_logs(
        &self,
        name: &str,
        tail: usize,
    ) -> BoxStream<'static, Result<String, RuntimeError>> {
        let options = LogsOptions {
            follow: true,
            stdout: true,
            stderr: true,
            tail: tail.to_string(),
            ..Default::default()
        };

        let name = name.to_string();
        let frames = self
            .client
            .logs(&name, Some(options))
            .map_err(move |e| log_error(&name, e));
        log_lines(frames).boxed()
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
