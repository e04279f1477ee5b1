use std::thread;

use tracing::info;
use uuid::Uuid;

use crate::adapters::cdn::{CdnInvalidator, INVALIDATION_COMPLETED};
use crate::error::DeployError;
use crate::runtime::settings::WaitPolicy;

pub const INVALIDATE_ALL_PATH: &str = "/*";

/// Invalidates every cached path and blocks until the provider reports the
/// invalidation completed. Returns the invalidation id.
pub fn invalidate_all(
    cdn: &dyn CdnInvalidator,
    distribution_id: &str,
    wait: &WaitPolicy,
) -> Result<String, DeployError> {
    let caller_reference = Uuid::new_v4().to_string();
    let invalidation_id = cdn
        .create_invalidation(
            distribution_id,
            &[INVALIDATE_ALL_PATH.to_string()],
            &caller_reference,
        )
        .map_err(|error| {
            DeployError::Invalidation(format!(
                "failed to create invalidation on {distribution_id}: {error}"
            ))
        })?;
    info!(
        component = "cache_purger",
        event = "invalidation_created",
        distribution_id,
        invalidation_id = %invalidation_id,
        caller_reference = %caller_reference,
    );

    for attempt in 1..=wait.max_attempts {
        let status = cdn
            .invalidation_status(distribution_id, &invalidation_id)
            .map_err(|error| {
                DeployError::Invalidation(format!(
                    "failed to read invalidation {invalidation_id}: {error}"
                ))
            })?;
        if status == INVALIDATION_COMPLETED {
            info!(
                component = "cache_purger",
                event = "invalidation_completed",
                distribution_id,
                invalidation_id = %invalidation_id,
                attempt,
            );
            return Ok(invalidation_id);
        }
        if attempt < wait.max_attempts {
            thread::sleep(wait.interval);
        }
    }

    Err(DeployError::InvalidationTimeout {
        invalidation_id,
        attempts: wait.max_attempts,
    })
}
