use client_deploy_core::contract::ValidationError;

/// Failure of one pipeline step. Every variant ends the invocation with a
/// FAILED outcome.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("upload error: {0}")]
    Upload(String),

    #[error("invalidation error: {0}")]
    Invalidation(String),

    #[error("invalidation {invalidation_id} not completed after {attempts} checks")]
    InvalidationTimeout { invalidation_id: String, attempts: u32 },
}

impl DeployError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Fetch(_) => "fetch",
            Self::Config(_) => "config",
            Self::Upload(_) => "upload",
            Self::Invalidation(_) => "invalidation",
            Self::InvalidationTimeout { .. } => "invalidation_timeout",
        }
    }
}

/// Callback delivery failure. Logged, never propagated.
#[derive(Debug, thiserror::Error)]
pub enum CallbackTransportError {
    #[error("failed to serialize callback body: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to deliver callback: {0}")]
    Delivery(String),
}
