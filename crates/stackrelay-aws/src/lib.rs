//! CloudFormation-backed [`StackApi`]
//!
//! Region, endpoint and profile come from [`AwsConfig`]; credentials are
//! resolved by the standard aws-config provider chain.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudformation::types::Capability as SdkCapability;
use aws_sdk_cloudformation::Client as CfnClient;
use stackrelay_config::AwsConfig;
use stackrelay_core::{ApiError, StackApi, StackRequest, StackSnapshot, StackStatus};
use std::collections::BTreeMap;
use tracing::debug;

pub struct CloudFormationApi {
    client: CfnClient,
}

impl CloudFormationApi {
    pub fn new(client: CfnClient) -> Self {
        Self { client }
    }

    /// Build a client from explicit configuration
    pub async fn from_config(config: &AwsConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        debug!(
            region = %config.region,
            endpoint = ?config.endpoint,
            profile = ?config.profile,
            "Loaded AWS SDK config"
        );

        Self::new(CfnClient::new(&sdk_config))
    }
}

#[async_trait]
impl StackApi for CloudFormationApi {
    async fn create_stack(&self, request: &StackRequest) -> Result<Option<String>, ApiError> {
        let capabilities = request
            .capabilities()
            .iter()
            .map(|c| SdkCapability::from(c.as_str()))
            .collect::<Vec<_>>();

        let output = self
            .client
            .create_stack()
            .stack_name(request.name())
            .template_body(request.template_body())
            .set_capabilities(Some(capabilities))
            .send()
            .await
            .map_err(|e| classify(&e, request.name()))?;

        Ok(output.stack_id().map(str::to_string))
    }

    async fn describe_stack(&self, stack_name: &str) -> Result<StackSnapshot, ApiError> {
        let output = self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| classify(&e, stack_name))?;

        let stack = output.stacks().first().ok_or_else(|| ApiError::NotFound {
            stack_name: stack_name.to_string(),
        })?;

        let status = stack
            .stack_status()
            .ok_or_else(|| ApiError::MalformedResponse {
                message: format!("stack '{}' has no status", stack_name),
            })?;

        let mut outputs = BTreeMap::new();
        for output in stack.outputs() {
            if let (Some(key), Some(value)) = (output.output_key(), output.output_value()) {
                outputs.insert(key.to_string(), value.to_string());
            }
        }

        Ok(StackSnapshot {
            status: StackStatus::from(status.as_str()),
            status_reason: stack.stack_status_reason().map(str::to_string),
            stack_id: stack.stack_id().map(str::to_string),
            outputs,
        })
    }
}

/// Map an SDK failure onto [`ApiError`]
fn classify<E, R>(err: &SdkError<E, R>, stack_name: &str) -> ApiError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::ServiceError(_) => from_service_error(err.code(), err.message(), stack_name),
        _ => ApiError::Transport {
            message: DisplayErrorContext(err).to_string(),
        },
    }
}

/// Map a CloudFormation error code and message onto [`ApiError`].
///
/// DescribeStacks reports a missing stack as a generic `ValidationError`
/// ("Stack with id X does not exist"), so the message decides that case.
fn from_service_error(code: Option<&str>, message: Option<&str>, stack_name: &str) -> ApiError {
    let message = message.unwrap_or_default().to_string();

    match code {
        Some("AlreadyExistsException") => ApiError::AlreadyExists {
            stack_name: stack_name.to_string(),
        },
        Some("InsufficientCapabilitiesException") => ApiError::InsufficientCapabilities { message },
        Some("LimitExceededException") => ApiError::LimitExceeded { message },
        Some("ValidationError") if message.contains("does not exist") => ApiError::NotFound {
            stack_name: stack_name.to_string(),
        },
        Some(code) => ApiError::Service {
            code: code.to_string(),
            message,
        },
        None => ApiError::Service {
            code: "Unknown".to_string(),
            message,
        },
    }
}
