use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PHYSICAL_ID_PREFIX: &str = "BRClientDeployment-";
pub const DOWNLOAD_URL_DATA_KEY: &str = "BRClientDownloadUrl";
pub const DEPLOYMENT_FAILED_REASON: &str = "failed, please check cloudwatch log";
pub const LOG_STREAM_REASON_PREFIX: &str = "See the details in CloudWatch Log Stream: ";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl RequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Custom-resource event delivered by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleRequest {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

impl LifecycleRequest {
    pub fn correlation(&self) -> Correlation {
        Correlation {
            stack_id: self.stack_id.clone(),
            request_id: self.request_id.clone(),
            logical_resource_id: self.logical_resource_id.clone(),
        }
    }

    /// Supplied physical id, ignoring blank values.
    pub fn supplied_physical_id(&self) -> Option<&str> {
        self.physical_resource_id
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutcomeStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleOutcome {
    pub status: OutcomeStatus,
    pub reason: Option<String>,
    pub physical_resource_id: Option<String>,
    pub data: BTreeMap<String, String>,
    pub no_echo: bool,
}

impl LifecycleOutcome {
    pub fn success(
        physical_resource_id: impl Into<String>,
        data: BTreeMap<String, String>,
    ) -> Self {
        Self {
            status: OutcomeStatus::Success,
            reason: None,
            physical_resource_id: Some(physical_resource_id.into()),
            data,
            no_echo: false,
        }
    }

    pub fn failed(physical_resource_id: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            reason: Some(reason.into()),
            physical_resource_id,
            data: BTreeMap::new(),
            no_echo: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Wire body of the callback PUT.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CallbackBody {
    pub status: OutcomeStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: BTreeMap<String, String>,
}

/// Builds the callback body, substituting the log stream name for a missing
/// reason or physical id.
pub fn callback_body(
    outcome: &LifecycleOutcome,
    correlation: &Correlation,
    log_stream_name: &str,
) -> CallbackBody {
    let reason = outcome
        .reason
        .clone()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| format!("{LOG_STREAM_REASON_PREFIX}{log_stream_name}"));
    let physical_resource_id = outcome
        .physical_resource_id
        .clone()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| log_stream_name.to_string());

    CallbackBody {
        status: outcome.status,
        reason,
        physical_resource_id,
        stack_id: correlation.stack_id.clone(),
        request_id: correlation.request_id.clone(),
        logical_resource_id: correlation.logical_resource_id.clone(),
        no_echo: outcome.no_echo,
        data: outcome.data.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn mint_physical_id() -> String {
    format!("{PHYSICAL_ID_PREFIX}{}", Uuid::new_v4())
}

/// Create always mints a new identity; Update and Delete must name the
/// deployment they act on.
pub fn resolve_physical_id(request: &LifecycleRequest) -> Result<String, ValidationError> {
    match request.request_type {
        RequestType::Create => Ok(mint_physical_id()),
        RequestType::Update | RequestType::Delete => request
            .supplied_physical_id()
            .map(str::to_string)
            .ok_or_else(|| {
                ValidationError::new(format!(
                    "invalid request: request type is '{}' but 'PhysicalResourceId' is not defined",
                    request.request_type
                ))
            }),
    }
}

pub fn success_data(download_url: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(DOWNLOAD_URL_DATA_KEY.into(), download_url.into())])
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn sample_request(request_type: RequestType, physical_id: Option<&str>) -> LifecycleRequest {
        LifecycleRequest {
            request_type,
            response_url: "https://cb.example/x".to_string(),
            stack_id: "s1".to_string(),
            request_id: "r1".to_string(),
            logical_resource_id: "L1".to_string(),
            physical_resource_id: physical_id.map(str::to_string),
            resource_type: None,
        }
    }

    #[test]
    fn parses_cloudformation_event_shape() {
        let request: LifecycleRequest = serde_json::from_value(json!({
            "RequestType": "Update",
            "ResponseURL": "https://cb.example/x",
            "StackId": "s1",
            "RequestId": "r1",
            "LogicalResourceId": "L1",
            "PhysicalResourceId": "BRClientDeployment-abc",
            "ResourceType": "Custom::BRClientDeployment",
            "ResourceProperties": {"ServiceToken": "arn"}
        }))
        .expect("event should parse");

        assert_eq!(request.request_type, RequestType::Update);
        assert_eq!(
            request.supplied_physical_id(),
            Some("BRClientDeployment-abc")
        );
        assert_eq!(request.correlation().logical_resource_id, "L1");
    }

    #[test]
    fn create_mints_prefixed_distinct_ids() {
        let request = sample_request(RequestType::Create, Some("supplied"));
        let first = resolve_physical_id(&request).expect("create should mint");
        let second = resolve_physical_id(&request).expect("create should mint");

        assert!(first.starts_with(PHYSICAL_ID_PREFIX));
        assert_ne!(first, second);
        assert_ne!(first, "supplied");
    }

    #[test]
    fn update_and_delete_require_physical_id() {
        for request_type in [RequestType::Update, RequestType::Delete] {
            let error = resolve_physical_id(&sample_request(request_type, None))
                .expect_err("missing id should fail");
            let message = error.message();
            assert!(message.contains("'PhysicalResourceId' is not defined"));
            assert!(message.contains(request_type.as_str()));

            let blank = resolve_physical_id(&sample_request(request_type, Some("  ")));
            assert!(blank.is_err());
        }
    }

    #[test]
    fn update_keeps_supplied_physical_id() {
        let request = sample_request(RequestType::Update, Some("BRClientDeployment-1"));
        let physical_id = resolve_physical_id(&request).expect("update should resolve");
        assert_eq!(physical_id, "BRClientDeployment-1");
    }

    #[test]
    fn callback_body_uses_wire_field_names() {
        let outcome = LifecycleOutcome::success("pid-1", success_data("https://example/app.zip"));
        let body = callback_body(
            &outcome,
            &sample_request(RequestType::Create, None).correlation(),
            "2026/10/18/[$LATEST]abc",
        );
        let value: Value = serde_json::to_value(&body).expect("body should serialize");

        assert_eq!(value["Status"], "SUCCESS");
        assert_eq!(value["PhysicalResourceId"], "pid-1");
        assert_eq!(value["StackId"], "s1");
        assert_eq!(value["RequestId"], "r1");
        assert_eq!(value["LogicalResourceId"], "L1");
        assert_eq!(value["NoEcho"], false);
        assert_eq!(
            value["Data"]["BRClientDownloadUrl"],
            "https://example/app.zip"
        );
        assert_eq!(
            value["Reason"],
            "See the details in CloudWatch Log Stream: 2026/10/18/[$LATEST]abc"
        );
    }

    #[test]
    fn callback_body_falls_back_to_log_stream_for_physical_id() {
        let outcome = LifecycleOutcome::failed(None, DEPLOYMENT_FAILED_REASON);
        let body = callback_body(
            &outcome,
            &sample_request(RequestType::Delete, None).correlation(),
            "stream-7",
        );

        assert_eq!(body.status, OutcomeStatus::Failed);
        assert_eq!(body.physical_resource_id, "stream-7");
        assert_eq!(body.reason, DEPLOYMENT_FAILED_REASON);
        assert!(body.data.is_empty());
    }
}
