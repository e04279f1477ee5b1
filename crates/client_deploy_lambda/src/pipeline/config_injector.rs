use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::adapters::identity::IdentityLookup;
use crate::error::DeployError;
use crate::runtime::client_config::{
    credential_digest, ClientConfigDocument, CLIENT_CONFIG_FILE_NAME,
};
use crate::runtime::settings::DeploymentConfig;

/// Writes the client configuration document at the root of `contents_dir`.
/// The credential digest is derived from a fresh secret lookup every time.
pub fn inject(
    identity: &dyn IdentityLookup,
    contents_dir: &Path,
    config: &DeploymentConfig,
) -> Result<PathBuf, DeployError> {
    let client_secret = identity
        .client_secret(&config.user_pool_id, &config.application_id)
        .map_err(|error| DeployError::Config(format!("failed to describe app client: {error}")))?
        .ok_or_else(|| {
            DeployError::Config(format!(
                "app client {} in user pool {} has no client secret",
                config.application_id, config.user_pool_id
            ))
        })?;

    let document = ClientConfigDocument::new(
        config,
        credential_digest(&config.application_id, &client_secret),
    );
    let body = serde_json::to_vec(&document)
        .map_err(|error| DeployError::Config(format!("failed to encode client config: {error}")))?;

    let target = contents_dir.join(CLIENT_CONFIG_FILE_NAME);
    fs::write(&target, body).map_err(|error| {
        DeployError::Config(format!("failed to write {}: {error}", target.display()))
    })?;

    info!(
        component = "config_injector",
        event = "client_config_written",
        path = %target.display(),
    );
    Ok(target)
}
