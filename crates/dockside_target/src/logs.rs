//! Live log tailing sessions.
//!
//! Each session follows one job's primary container on its own Tokio task and
//! hands every line to the caller's callback. Sessions live until closed or
//! until the followed stream ends.

use dockside_core::prelude::*;

use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;

/// Which job to follow and how much history to replay first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSessionRequest {
    pub job_name: String,
    pub job_version: String,
    /// Lines of history emitted before following.
    pub tail: usize,
}

impl LogSessionRequest {
    pub fn new(identity: &JobIdentity, tail: usize) -> Self {
        Self {
            job_name: identity.name.clone(),
            job_version: identity.version.clone(),
            tail,
        }
    }
}

struct Session {
    generation: u64,
    cancel: CancellationToken,
    /// Held while a line is delivered, so closing waits for in-flight callbacks.
    delivery: Arc<Mutex<()>>,
}

type Registry = Arc<Mutex<HashMap<String, Session>>>;

#[derive(Clone)]
pub struct LogsStreamer<R> {
    runtime: R,
    sessions: Registry,
    generations: Arc<AtomicU64>,
}

impl<R: ContainerRuntime> LogsStreamer<R> {
    pub fn new(runtime: R) -> Self {
        Self {
            runtime,
            sessions: Registry::default(),
            generations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Starts streaming the job's logs to `on_next_line(session_id, line)`.
    ///
    /// Must be called from within a Tokio runtime. Fails if `session_id` is
    /// still open. Stream failures after this returns are only logged.
    pub fn create_session<F>(
        &self,
        session_id: &str,
        request: &LogSessionRequest,
        on_next_line: F,
    ) -> Result<(), LogsError>
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        let container = container_name(
            &job_resource_name(&request.job_name, &request.job_version),
            0,
        );
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let delivery = Arc::new(Mutex::new(()));

        {
            let mut sessions = self.sessions.lock();
            if sessions.contains_key(session_id) {
                return Err(LogsError::SessionExists(session_id.to_string()));
            }
            sessions.insert(
                session_id.to_string(),
                Session {
                    generation,
                    cancel: cancel.clone(),
                    delivery: delivery.clone(),
                },
            );
        }

        let mut lines = self.runtime.follow_logs(&container, request.tail);
        let sessions = self.sessions.clone();
        let session_id = session_id.to_string();
        tracing::info!(
            session_id = %session_id,
            container = %container,
            tail = request.tail,
            "log session opened"
        );

        tokio::spawn(async move {
            let exit = loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break SessionExit::ClosedByCaller,
                    next = lines.next() => match next {
                        Some(Ok(line)) => {
                            let _guard = delivery.lock();
                            if cancel.is_cancelled() {
                                break SessionExit::ClosedByCaller;
                            }
                            on_next_line(&session_id, &line);
                        }
                        Some(Err(e)) => break SessionExit::Failed(e.to_string()),
                        None => break SessionExit::StreamEnded,
                    },
                }
            };
            drop(lines);

            match &exit {
                SessionExit::ClosedByCaller => {
                    tracing::debug!(session_id = %session_id, "log session closed");
                }
                SessionExit::StreamEnded => {
                    tracing::info!(
                        session_id = %session_id,
                        container = %container,
                        "log stream ended"
                    );
                }
                SessionExit::Failed(reason) => {
                    tracing::error!(
                        session_id = %session_id,
                        container = %container,
                        reason = %reason,
                        "log stream failed"
                    );
                }
            }

            if exit != SessionExit::ClosedByCaller {
                let mut sessions = sessions.lock();
                if sessions
                    .get(&session_id)
                    .is_some_and(|s| s.generation == generation)
                {
                    sessions.remove(&session_id);
                }
            }
        });

        Ok(())
    }

    /// Stops the session. Once this returns, its callback is not invoked again.
    ///
    /// Must not be called from inside the session's own callback.
    pub fn close_session(&self, session_id: &str) -> Result<(), LogsError> {
        let session = self
            .sessions
            .lock()
            .remove(session_id)
            .ok_or_else(|| LogsError::UnknownSession(session_id.to_string()))?;

        session.cancel.cancel();
        // Wait out a delivery that raced with the cancellation.
        drop(session.delivery.lock());
        Ok(())
    }

    pub fn is_open(&self, session_id: &str) -> bool {
        self.sessions.lock().contains_key(session_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }
}

#[cfg(test)]
#[path = "logs_tests.rs"]
mod tests;
