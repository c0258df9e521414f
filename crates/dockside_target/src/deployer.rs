use crate::config::TargetConfig;
use crate::secrets::EphemeralSecretsStore;

use dockside_core::constants::{HOST_GATEWAY_ALIAS, env, labels};
use dockside_core::prelude::*;

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

/// Container indices always torn down on delete, present or not.
const TEARDOWN_SLOTS: usize = 2;

/// Runs jobs as named containers on the local engine.
///
/// A deployment is replacing, never additive: whatever runs under the job's
/// resource name is removed before the new containers are created.
#[derive(Clone)]
pub struct Deployer<R, A> {
    runtime: R,
    auth: A,
    config: TargetConfig,
    secrets: EphemeralSecretsStore,
    env_providers: Vec<Arc<dyn EnvVarsProvider>>,
}

impl<R: ContainerRuntime, A: AuthSubjectProvider> Deployer<R, A> {
    pub fn new(runtime: R, auth: A, config: TargetConfig, secrets: EphemeralSecretsStore) -> Self {
        Self {
            runtime,
            auth,
            config,
            secrets,
            env_providers: Vec::new(),
        }
    }

    /// Registers a provider of extra runtime env vars. Providers are applied in
    /// registration order; later ones override earlier ones.
    pub fn with_env_provider(mut self, provider: impl EnvVarsProvider) -> Self {
        self.env_providers.push(Arc::new(provider));
        self
    }

    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    /// Deploys the job, replacing any previous deployment of the same name and version.
    ///
    /// Containers are created in index order. A failed creation aborts the
    /// remaining ones without rolling back what already exists; deploying
    /// again tears everything down first.
    pub async fn deploy(&self, request: DeployRequest) -> Result<JobRecord, DeployError> {
        let DeployRequest {
            identity,
            family,
            tag,
            runtime_env_vars,
            containers_num,
        } = request;
        let containers_num = containers_num.max(1);
        let resource_name = identity.resource_name();
        let deployment_timestamp = Utc::now().timestamp();

        let reserved = self
            .reserved_env_vars(&identity, &family, deployment_timestamp, containers_num)
            .await?;
        let conflicts = conflicting_keys(&reserved, &runtime_env_vars);
        if !conflicts.is_empty() {
            return Err(DeployError::ReservedEnvVars(conflicts));
        }
        let env_vars = to_env_list(&self.compose_env_vars(runtime_env_vars, &reserved));

        // A sidecar can outlive its primary, so every slot is cleared.
        self.delete(&identity).await?;

        let labels = HashMap::from([
            (labels::JOB_NAME.to_string(), identity.name.clone()),
            (labels::JOB_VERSION.to_string(), identity.version.clone()),
        ]);

        for index in 0..containers_num {
            let spec = ContainerSpec {
                name: container_name(&resource_name, index),
                image: job_image(
                    &self.config.docker_registry,
                    &self.config.registry_namespace,
                    &identity.name,
                    &tag,
                    index,
                ),
                env: env_vars.clone(),
                network: self.config.network.clone(),
                extra_hosts: vec![HOST_GATEWAY_ALIAS.to_string()],
                labels: labels.clone(),
                always_pull: true,
            };

            tracing::debug!(
                job = %identity,
                container = %spec.name,
                image = %spec.image,
                "creating container"
            );
            if let Err(e) = self.runtime.run_container(spec).await {
                tracing::error!(job = %identity, index, error = %e, "container creation failed");
                return Err(e.into());
            }
        }

        tracing::info!(job = %identity, containers = containers_num, "job deployed");

        Ok(JobRecord {
            image_tag: Some(tag),
            ..JobRecord::running(&identity, deployment_timestamp)
        })
    }

    /// Removes the job's containers. Absent containers are skipped.
    pub async fn delete(&self, identity: &JobIdentity) -> Result<(), RuntimeError> {
        let resource_name = identity.resource_name();
        for index in 0..TEARDOWN_SLOTS {
            self.runtime
                .remove_container(&container_name(&resource_name, index))
                .await?;
        }

        // Jobs with more containers than the fixed slots.
        let mut index = TEARDOWN_SLOTS;
        loop {
            let name = container_name(&resource_name, index);
            if !self.runtime.container_exists(&name).await? {
                break;
            }
            self.runtime.remove_container(&name).await?;
            index += 1;
        }

        tracing::info!(job = %identity, "job deleted");
        Ok(())
    }

    /// Whether the job's primary container exists, running or stopped.
    pub async fn exists(&self, identity: &JobIdentity) -> Result<bool, RuntimeError> {
        self.runtime
            .container_exists(&container_name(&identity.resource_name(), 0))
            .await
    }

    pub fn save_job_secrets(&self, identity: &JobIdentity, secrets: JobSecrets) {
        self.secrets.save(identity, secrets);
    }

    pub fn get_job_secrets(&self, identity: &JobIdentity) -> Result<JobSecrets, SecretsError> {
        self.secrets.get(identity)
    }

    async fn reserved_env_vars(
        &self,
        identity: &JobIdentity,
        family: &str,
        deployment_timestamp: i64,
        containers_num: usize,
    ) -> Result<EnvVars, DeployError> {
        let auth_token = self.auth.job_family_token(family).await?;

        let mut vars = EnvVars::new();
        vars.insert(env::PUB_URL.into(), self.config.internal_pub_url.clone());
        vars.insert(env::JOB_NAME.into(), identity.name.clone());
        vars.insert(env::AUTH_TOKEN.into(), auth_token);
        vars.insert(
            env::JOB_DEPLOYMENT_TIMESTAMP.into(),
            deployment_timestamp.to_string(),
        );
        vars.insert(
            env::REQUEST_TRACING_HEADER.into(),
            self.config.tracing_header_name.clone(),
        );
        if let Some(endpoint) = &self.config.open_telemetry_endpoint {
            vars.insert(env::OPENTELEMETRY_ENDPOINT.into(), endpoint.clone());
        }
        if containers_num > 1 {
            vars.insert(
                env::JOB_USER_MODULE_HOSTNAME.into(),
                container_name(&identity.resource_name(), 1),
            );
        }
        Ok(vars)
    }

    /// Caller vars, then provider vars in order, then the reserved set on top.
    fn compose_env_vars(&self, runtime_env_vars: EnvVars, reserved: &EnvVars) -> EnvVars {
        let merged = self
            .env_providers
            .iter()
            .filter_map(|provider| provider.job_runtime_env_vars())
            .fold(runtime_env_vars, |acc, vars| merge_env_vars(acc, &vars));
        merge_env_vars(merged, reserved)
    }
}

#[cfg(test)]
#[path = "deployer_tests.rs"]
mod tests;
