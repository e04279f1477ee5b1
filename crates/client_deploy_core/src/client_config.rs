use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::settings::DeploymentConfig;

/// Fetched by the client from the site root at startup.
pub const CLIENT_CONFIG_FILE_NAME: &str = "aws_cognito_configuration.json";

/// Configuration document read by the deployed client. Key names are part of
/// the client contract and must not change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfigDocument {
    #[serde(rename = "AWS_REGION")]
    pub region: String,
    #[serde(rename = "COGNITO_IDENTITHY_POOL_ID")]
    pub identity_pool_id: String,
    #[serde(rename = "COGNITO_USER_POOL_ID")]
    pub user_pool_id: String,
    #[serde(rename = "COGNITO_USER_POOL_CUSTOM_DOMAIN")]
    pub user_pool_custom_domain: String,
    #[serde(rename = "COGNITO_USER_POOL_APPLICATION_ID")]
    pub application_id: String,
    #[serde(rename = "COGNITO_USER_POOL_APPLICATION_AUTHENTICATION")]
    pub application_authentication: String,
}

impl ClientConfigDocument {
    pub fn new(config: &DeploymentConfig, credential_digest: String) -> Self {
        Self {
            region: config.region.clone(),
            identity_pool_id: config.identity_pool_id.clone(),
            user_pool_id: config.user_pool_id.clone(),
            user_pool_custom_domain: config.user_pool_custom_domain.clone(),
            application_id: config.application_id.clone(),
            application_authentication: credential_digest,
        }
    }
}

/// HTTP basic credential pair for the client's token endpoint calls.
pub fn credential_digest(application_id: &str, client_secret: &str) -> String {
    STANDARD.encode(format!("{application_id}:{client_secret}"))
}
