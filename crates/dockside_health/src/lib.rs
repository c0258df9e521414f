//! # Dockside Health
//!
//! [`HealthProbe`] over plain HTTP using `reqwest`.
//!
//! Jobs expose three endpoints on their internal port:
//!
//! - `/live`: JSON [`LivenessReport`], non-2xx with an `error` field when initialization failed.
//! - `/ready`: 2xx once the job can serve requests.
//! - `/metrics`: Prometheus text exposition, see [`metrics`].

pub mod metrics;

use dockside_core::constants::routes::{LIVE, READY};
use dockside_core::prelude::*;

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub use metrics::{read_last_call_timestamp, read_metric};

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Clone)]
pub struct HttpHealthProbe {
    client: Client,
    quick_check_timeout: Duration,
}

impl Default for HttpHealthProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

impl HttpHealthProbe {
    pub fn new(quick_check_timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            quick_check_timeout,
        }
    }

    async fn get(&self, url: &str, timeout: Option<Duration>) -> Result<Response, HealthError> {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                HealthError::Timeout(format!("{url}: {e}"))
            } else {
                HealthError::Unreachable(format!("{url}: {e}"))
            }
        })
    }
}

/// Turns a failed answer into the job's own error message when it sent one.
async fn failure(response: Response) -> HealthError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody { error: Some(error) }) => HealthError::Unhealthy(error),
        _ => HealthError::InvalidResponse(format!("status {status}: {text}")),
    }
}

impl HealthProbe for HttpHealthProbe {
    async fn quick_check(&self, base_url: &str) -> Result<(), HealthError> {
        let url = format!("{base_url}{LIVE}");
        let response = self.get(&url, Some(self.quick_check_timeout)).await?;
        if !response.status().is_success() {
            return Err(failure(response).await);
        }
        Ok(())
    }

    async fn liveness(&self, base_url: &str) -> Result<LivenessReport, HealthError> {
        let url = format!("{base_url}{LIVE}");
        let response = self.get(&url, Some(self.quick_check_timeout)).await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| HealthError::InvalidResponse(e.to_string()))?;

        let report: LivenessReport = serde_json::from_str(&text).map_err(|e| {
            HealthError::InvalidResponse(format!("status {status}, unparsable body: {e}"))
        })?;

        // A failed status without an error message still means "not live".
        if !status.is_success() && report.error.is_none() {
            return Ok(LivenessReport {
                live: false,
                ..report
            });
        }
        Ok(report)
    }

    async fn readiness(&self, base_url: &str) -> Result<bool, HealthError> {
        let url = format!("{base_url}{READY}");
        let response = self.get(&url, Some(self.quick_check_timeout)).await?;
        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::SERVICE_UNAVAILABLE => Ok(false),
            _ => Err(failure(response).await),
        }
    }

    async fn scrape_metrics(&self, url: &str) -> Result<String, HealthError> {
        let response = self.get(url, Some(self.quick_check_timeout)).await?;
        if !response.status().is_success() {
            return Err(failure(response).await);
        }
        let text = response
            .text()
            .await
            .map_err(|e| HealthError::InvalidResponse(e.to_string()))?;
        tracing::trace!(url, bytes = text.len(), "metrics scraped");
        Ok(text)
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
