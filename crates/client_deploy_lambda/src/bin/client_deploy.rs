use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, Error as S3Error, ObjectIdentifier};
use client_deploy_lambda::adapters::archive_source::ArchiveSource;
use client_deploy_lambda::adapters::callback::CallbackSender;
use client_deploy_lambda::adapters::cdn::CdnInvalidator;
use client_deploy_lambda::adapters::identity::IdentityLookup;
use client_deploy_lambda::adapters::object_store::{ObjectPage, ObjectStore};
use client_deploy_lambda::handlers::lifecycle::{LifecycleController, LifecycleServices};
use client_deploy_lambda::runtime::contract::{LifecycleOutcome, LifecycleRequest};
use client_deploy_lambda::runtime::settings::DeploymentConfig;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

struct S3ObjectStore {
    s3_client: aws_sdk_s3::Client,
}

impl ObjectStore for S3ObjectStore {
    fn put_file(
        &self,
        bucket: &str,
        key: &str,
        source: &Path,
        content_type: &str,
    ) -> Result<(), String> {
        block_on(async {
            let body = ByteStream::from_path(source)
                .await
                .map_err(|error| format!("failed to read {}: {error}", source.display()))?;
            self.s3_client
                .put_object()
                .bucket(bucket)
                .key(key)
                .content_type(content_type)
                .body(body)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    format!(
                        "failed to write object to s3: {}",
                        aws_sdk_s3::error::DisplayErrorContext(&error)
                    )
                })
        })
    }

    fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, String> {
        block_on(async {
            let output = self
                .s3_client
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(continuation_token.map(str::to_string))
                .send()
                .await
                .map_err(|error| {
                    format!(
                        "failed to list objects in s3: {}",
                        aws_sdk_s3::error::DisplayErrorContext(&error)
                    )
                })?;

            let keys = output
                .contents()
                .iter()
                .filter_map(|object| object.key())
                .map(str::to_string)
                .collect();
            let next_token = if output.is_truncated().unwrap_or(false) {
                output.next_continuation_token().map(str::to_string)
            } else {
                None
            };
            Ok(ObjectPage { keys, next_token })
        })
    }

    fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), String> {
        let identifiers = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| format!("invalid object key: {error}"))?;
        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(true)
            .build()
            .map_err(|error| format!("invalid delete request: {error}"))?;

        block_on(async {
            let output = self
                .s3_client
                .delete_objects()
                .bucket(bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|error| {
                    format!(
                        "failed to delete objects from s3: {}",
                        aws_sdk_s3::error::DisplayErrorContext(&error)
                    )
                })?;

            delete_errors_to_result(output.errors())
        })
    }
}

/// `DeleteObjects` reports per-key failures inside a successful response.
fn delete_errors_to_result(errors: &[S3Error]) -> Result<(), String> {
    match errors.first() {
        Some(first) => Err(format!(
            "{} objects were not deleted, first {}: {}",
            errors.len(),
            first.key().unwrap_or("<unknown>"),
            first.message().unwrap_or("unknown error")
        )),
        None => Ok(()),
    }
}

struct CloudFrontInvalidator {
    cloudfront_client: aws_sdk_cloudfront::Client,
}

impl CdnInvalidator for CloudFrontInvalidator {
    fn create_invalidation(
        &self,
        distribution_id: &str,
        paths: &[String],
        caller_reference: &str,
    ) -> Result<String, String> {
        let paths = Paths::builder()
            .quantity(paths.len() as i32)
            .set_items(Some(paths.to_vec()))
            .build()
            .map_err(|error| format!("invalid invalidation paths: {error}"))?;
        let batch = InvalidationBatch::builder()
            .paths(paths)
            .caller_reference(caller_reference)
            .build()
            .map_err(|error| format!("invalid invalidation batch: {error}"))?;

        block_on(async {
            let output = self
                .cloudfront_client
                .create_invalidation()
                .distribution_id(distribution_id)
                .invalidation_batch(batch)
                .send()
                .await
                .map_err(|error| {
                    format!(
                        "failed to create cloudfront invalidation: {}",
                        aws_sdk_cloudfront::error::DisplayErrorContext(&error)
                    )
                })?;

            output
                .invalidation()
                .map(|invalidation| invalidation.id().to_string())
                .ok_or_else(|| "create_invalidation response has no invalidation".to_string())
        })
    }

    fn invalidation_status(
        &self,
        distribution_id: &str,
        invalidation_id: &str,
    ) -> Result<String, String> {
        block_on(async {
            let output = self
                .cloudfront_client
                .get_invalidation()
                .distribution_id(distribution_id)
                .id(invalidation_id)
                .send()
                .await
                .map_err(|error| {
                    format!(
                        "failed to read cloudfront invalidation: {}",
                        aws_sdk_cloudfront::error::DisplayErrorContext(&error)
                    )
                })?;

            output
                .invalidation()
                .map(|invalidation| invalidation.status().to_string())
                .ok_or_else(|| "get_invalidation response has no invalidation".to_string())
        })
    }
}

struct CognitoIdentityLookup {
    cognito_client: aws_sdk_cognitoidentityprovider::Client,
}

impl IdentityLookup for CognitoIdentityLookup {
    fn client_secret(&self, user_pool_id: &str, client_id: &str) -> Result<Option<String>, String> {
        block_on(async {
            let output = self
                .cognito_client
                .describe_user_pool_client()
                .user_pool_id(user_pool_id)
                .client_id(client_id)
                .send()
                .await
                .map_err(|error| {
                    format!(
                        "failed to describe user pool client: {}",
                        aws_sdk_cognitoidentityprovider::error::DisplayErrorContext(&error)
                    )
                })?;

            Ok(output
                .user_pool_client()
                .and_then(|client| client.client_secret())
                .map(str::to_string))
        })
    }
}

struct HttpArchiveSource {
    http_client: reqwest::Client,
}

impl ArchiveSource for HttpArchiveSource {
    fn download(&self, url: &str, destination: &Path) -> Result<(), String> {
        block_on(async {
            let mut response = self
                .http_client
                .get(url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|error| format!("failed to download archive: {error}"))?;

            let mut file = std::fs::File::create(destination)
                .map_err(|error| format!("failed to create {}: {error}", destination.display()))?;
            while let Some(chunk) = response
                .chunk()
                .await
                .map_err(|error| format!("failed to read archive body: {error}"))?
            {
                file.write_all(&chunk)
                    .map_err(|error| format!("failed to write archive: {error}"))?;
            }
            file.flush()
                .map_err(|error| format!("failed to flush archive: {error}"))
        })
    }
}

struct HttpCallbackSender {
    http_client: reqwest::Client,
}

impl CallbackSender for HttpCallbackSender {
    fn put(&self, url: &str, body: &[u8]) -> Result<u16, String> {
        block_on(async {
            // Presigned callback URLs are signed without a content type.
            let response = self
                .http_client
                .put(url)
                .header(reqwest::header::CONTENT_TYPE, "")
                .body(body.to_vec())
                .send()
                .await
                // The presigned URL is a credential; keep it out of the error text.
                .map_err(|error| format!("callback request failed: {}", error.without_url()))?;

            callback_status_result(response.status())
        })
    }
}

fn callback_status_result(status: StatusCode) -> Result<u16, String> {
    if status.is_success() {
        Ok(status.as_u16())
    } else {
        Err(format!("callback rejected with status {status}"))
    }
}

#[derive(Clone)]
struct RuntimeDependencies {
    s3_client: aws_sdk_s3::Client,
    cloudfront_client: aws_sdk_cloudfront::Client,
    cognito_client: aws_sdk_cognitoidentityprovider::Client,
    http_client: reqwest::Client,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<Value, Error> {
    let LambdaEvent { payload, context } = event;
    let request = parse_request(payload)?;
    let log_stream_name = context.env_config.log_stream.clone();

    let object_store = S3ObjectStore {
        s3_client: deps.s3_client.clone(),
    };
    let cdn = CloudFrontInvalidator {
        cloudfront_client: deps.cloudfront_client.clone(),
    };
    let identity = CognitoIdentityLookup {
        cognito_client: deps.cognito_client.clone(),
    };
    let archive_source = HttpArchiveSource {
        http_client: deps.http_client.clone(),
    };
    let callback = HttpCallbackSender {
        http_client: deps.http_client.clone(),
    };

    let outcome = tokio::task::block_in_place(|| {
        let controller = LifecycleController::new(
            LifecycleServices {
                object_store: &object_store,
                cdn: &cdn,
                identity: &identity,
                archive_source: &archive_source,
                callback: &callback,
            },
            log_stream_name,
        );
        match DeploymentConfig::from_env() {
            Ok(config) => controller.handle(&request, &config),
            Err(config_error) => controller.reject_misconfigured(&request, &config_error),
        }
    });

    Ok(invocation_response(&outcome))
}

/// Without a parsable event there is no callback URL to report to, so the
/// invocation itself fails.
fn parse_request(payload: Value) -> Result<LifecycleRequest, Error> {
    serde_json::from_value(payload)
        .map_err(|error| Error::from(format!("invalid custom resource event: {error}")))
}

fn invocation_response(outcome: &LifecycleOutcome) -> Value {
    json!({
        "Status": outcome.status,
        "PhysicalResourceId": outcome.physical_resource_id,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        s3_client: aws_sdk_s3::Client::new(&aws_config),
        cloudfront_client: aws_sdk_cloudfront::Client::new(&aws_config),
        cognito_client: aws_sdk_cognitoidentityprovider::Client::new(&aws_config),
        http_client: reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?,
    };

    lambda_runtime::run(service_fn(|event| handle_request(event, &deps))).await
}
