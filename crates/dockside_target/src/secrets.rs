//! In-memory stand-in for a secrets backend.
//!
//! The store lives as long as the process does. Nothing is written to disk and
//! every secret is lost on restart, so it is only suitable for local setups.

use dockside_core::prelude::*;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Job secrets keyed by `<name>.<version>`. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct EphemeralSecretsStore {
    secrets: Arc<RwLock<HashMap<String, JobSecrets>>>,
}

impl EphemeralSecretsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&self, identity: &JobIdentity, secrets: JobSecrets) {
        tracing::warn!(job = %identity, "saving secrets in an ephemeral, in-memory store");
        self.secrets.write().insert(identity.key(), secrets);
    }

    /// Fails with [`SecretsError::Unsupported`] when nothing was saved for the job.
    pub fn get(&self, identity: &JobIdentity) -> Result<JobSecrets, SecretsError> {
        self.secrets
            .read()
            .get(&identity.key())
            .cloned()
            .ok_or_else(|| {
                SecretsError::Unsupported(
                    "managing secrets is not supported on local docker".into(),
                )
            })
    }

    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
