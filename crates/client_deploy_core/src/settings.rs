use std::path::PathBuf;
use std::time::Duration;

use crate::contract::ValidationError;

pub const DOWNLOAD_URL_VAR: &str = "BRClientDownloadUrl";
pub const TARGET_BUCKET_VAR: &str = "TargetBucketName";
pub const DISTRIBUTION_ID_VAR: &str = "DistributionId";
pub const IDENTITY_POOL_ID_VAR: &str = "CognitoIdentityPoolId";
/// Spelling used by the deployed stack templates.
pub const USER_POOL_ID_VAR: &str = "CongitoUserPoolId";
pub const USER_POOL_ID_VAR_CORRECTED: &str = "CognitoUserPoolId";
pub const USER_POOL_CUSTOM_DOMAIN_VAR: &str = "CognitoUserPoolCustomDomain";
pub const APPLICATION_ID_VAR: &str = "CognitoUserPoolApplicationId";
pub const REGION_VAR: &str = "AWS_REGION";
pub const SCRATCH_DIR_VAR: &str = "CLIENT_SCRATCH_DIR";
pub const UPLOAD_PREFIX_VAR: &str = "CLIENT_UPLOAD_PREFIX";
pub const POLL_INTERVAL_VAR: &str = "INVALIDATION_POLL_INTERVAL_SECS";
pub const MAX_ATTEMPTS_VAR: &str = "INVALIDATION_MAX_ATTEMPTS";

pub const DEFAULT_SCRATCH_DIR: &str = "/tmp/brclient";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// How long to wait for a CDN invalidation to settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Environment-sourced parameters, read once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    pub download_url: String,
    pub bucket: String,
    pub distribution_id: String,
    pub identity_pool_id: String,
    pub user_pool_id: String,
    pub user_pool_custom_domain: String,
    pub application_id: String,
    pub region: String,
    pub scratch_dir: PathBuf,
    pub upload_prefix: String,
    pub invalidation_wait: WaitPolicy,
}

impl DeploymentConfig {
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ValidationError> {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &str| optional(name).ok_or_else(|| missing(name));

        let user_pool_id = optional(USER_POOL_ID_VAR)
            .or_else(|| optional(USER_POOL_ID_VAR_CORRECTED))
            .ok_or_else(|| missing(USER_POOL_ID_VAR))?;

        let mut invalidation_wait = WaitPolicy::default();
        if let Some(raw) = optional(POLL_INTERVAL_VAR) {
            let seconds = match raw.parse::<u64>() {
                Ok(value) => value,
                Err(_) => return Err(malformed(POLL_INTERVAL_VAR, "a whole number of seconds")),
            };
            invalidation_wait.interval = Duration::from_secs(seconds);
        }
        if let Some(raw) = optional(MAX_ATTEMPTS_VAR) {
            invalidation_wait.max_attempts = match raw.parse::<u32>() {
                Ok(value) if value > 0 => value,
                _ => return Err(malformed(MAX_ATTEMPTS_VAR, "a positive integer")),
            };
        }

        Ok(Self {
            download_url: required(DOWNLOAD_URL_VAR)?,
            bucket: required(TARGET_BUCKET_VAR)?,
            distribution_id: required(DISTRIBUTION_ID_VAR)?,
            identity_pool_id: required(IDENTITY_POOL_ID_VAR)?,
            user_pool_id,
            user_pool_custom_domain: required(USER_POOL_CUSTOM_DOMAIN_VAR)?,
            application_id: required(APPLICATION_ID_VAR)?,
            region: required(REGION_VAR)?,
            scratch_dir: optional(SCRATCH_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRATCH_DIR)),
            upload_prefix: optional(UPLOAD_PREFIX_VAR).unwrap_or_default(),
            invalidation_wait,
        })
    }
}

fn missing(name: &str) -> ValidationError {
    ValidationError::new(format!("{name} must be configured"))
}

fn malformed(name: &str, expectation: &str) -> ValidationError {
    ValidationError::new(format!("{name} must be {expectation}"))
}
