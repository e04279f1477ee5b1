use std::time::Instant;

use tracing::{error, info};

use crate::adapters::archive_source::ArchiveSource;
use crate::adapters::callback::CallbackSender;
use crate::adapters::cdn::CdnInvalidator;
use crate::adapters::identity::IdentityLookup;
use crate::adapters::object_store::ObjectStore;
use crate::error::DeployError;
use crate::pipeline::{archive, config_injector, publisher, purger, reporter};
use crate::runtime::contract::{
    resolve_physical_id, success_data, LifecycleOutcome, LifecycleRequest, RequestType,
    ValidationError, DEPLOYMENT_FAILED_REASON,
};
use crate::runtime::lifecycle::{step_plan, LifecycleStep};
use crate::runtime::settings::DeploymentConfig;

/// Provider handles the controller drives. Each is a narrow seam so tests can
/// substitute recording fakes.
#[derive(Clone, Copy)]
pub struct LifecycleServices<'a> {
    pub object_store: &'a dyn ObjectStore,
    pub cdn: &'a dyn CdnInvalidator,
    pub identity: &'a dyn IdentityLookup,
    pub archive_source: &'a dyn ArchiveSource,
    pub callback: &'a dyn CallbackSender,
}

/// Orchestrator-facing state machine. Every entry point reports exactly one
/// outcome through the callback before returning it.
pub struct LifecycleController<'a> {
    services: LifecycleServices<'a>,
    log_stream_name: String,
}

impl<'a> LifecycleController<'a> {
    pub fn new(services: LifecycleServices<'a>, log_stream_name: impl Into<String>) -> Self {
        Self {
            services,
            log_stream_name: log_stream_name.into(),
        }
    }

    pub fn handle(
        &self,
        request: &LifecycleRequest,
        config: &DeploymentConfig,
    ) -> LifecycleOutcome {
        log_request(request);
        let started_at = Instant::now();

        let outcome = match resolve_physical_id(request) {
            Err(validation_error) => self.failed(
                request.supplied_physical_id().map(str::to_string),
                DeployError::from(validation_error),
            ),
            Ok(physical_id) => match self.run_steps(request.request_type, config) {
                Ok(()) => {
                    info!(
                        component = "lifecycle",
                        event = "lifecycle_succeeded",
                        request_type = %request.request_type,
                        physical_resource_id = %physical_id,
                        duration_ms = started_at.elapsed().as_millis() as u64,
                    );
                    LifecycleOutcome::success(physical_id, success_data(&config.download_url))
                }
                Err(step_error) => self.failed(Some(physical_id), step_error),
            },
        };

        self.report(request, outcome)
    }

    /// Reports FAILED for a request that arrived while the environment
    /// configuration could not be read. No side effects are attempted.
    pub fn reject_misconfigured(
        &self,
        request: &LifecycleRequest,
        config_error: &ValidationError,
    ) -> LifecycleOutcome {
        log_request(request);
        error!(
            component = "lifecycle",
            event = "misconfigured",
            error = %config_error,
        );
        let outcome = LifecycleOutcome::failed(
            request.supplied_physical_id().map(str::to_string),
            DEPLOYMENT_FAILED_REASON,
        );
        self.report(request, outcome)
    }

    fn run_steps(
        &self,
        request_type: RequestType,
        config: &DeploymentConfig,
    ) -> Result<(), DeployError> {
        for step in step_plan(request_type) {
            info!(
                component = "lifecycle",
                event = "step_started",
                step = step.as_str(),
                phase = ?step.phase(),
            );
            self.execute(step, config)?;
        }
        Ok(())
    }

    fn execute(&self, step: LifecycleStep, config: &DeploymentConfig) -> Result<(), DeployError> {
        let services = &self.services;
        match step {
            LifecycleStep::CleanBucket => {
                publisher::clean_bucket(services.object_store, &config.bucket).map(drop)
            }
            LifecycleStep::FetchAndExtract => archive::fetch_and_extract(
                services.archive_source,
                &config.download_url,
                &config.scratch_dir,
            )
            .map(drop),
            LifecycleStep::InjectConfig => {
                config_injector::inject(services.identity, &config.scratch_dir, config).map(drop)
            }
            LifecycleStep::UploadAll => publisher::upload_all(
                services.object_store,
                &config.bucket,
                &config.scratch_dir,
                &config.upload_prefix,
            )
            .map(drop),
            LifecycleStep::InvalidateAll => purger::invalidate_all(
                services.cdn,
                &config.distribution_id,
                &config.invalidation_wait,
            )
            .map(drop),
        }
    }

    /// Full detail goes to the log; the orchestrator only sees validation
    /// messages or the fixed diagnostic.
    fn failed(&self, physical_id: Option<String>, deploy_error: DeployError) -> LifecycleOutcome {
        error!(
            component = "lifecycle",
            event = "lifecycle_failed",
            kind = deploy_error.kind(),
            error = %deploy_error,
        );
        let reason = match &deploy_error {
            DeployError::Validation(validation_error) => validation_error.message().to_string(),
            _ => DEPLOYMENT_FAILED_REASON.to_string(),
        };
        LifecycleOutcome::failed(physical_id, reason)
    }

    fn report(&self, request: &LifecycleRequest, outcome: LifecycleOutcome) -> LifecycleOutcome {
        reporter::send(
            self.services.callback,
            &request.response_url,
            &outcome,
            &request.correlation(),
            &self.log_stream_name,
        );
        outcome
    }
}

/// The callback URL is presigned and stays out of the log.
fn log_request(request: &LifecycleRequest) {
    info!(
        component = "lifecycle",
        event = "request_received",
        request_type = %request.request_type,
        stack_id = %request.stack_id,
        request_id = %request.request_id,
        logical_resource_id = %request.logical_resource_id,
        physical_resource_id = ?request.physical_resource_id,
        resource_type = ?request.resource_type,
    );
}
