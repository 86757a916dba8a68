// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

/// Longest stack name CloudFormation accepts
const MAX_STACK_NAME_LEN: usize = 128;
/// Lambda's hard ceiling on function timeout
const MAX_FUNCTION_TIMEOUT_SECS: u32 = 900;

pub fn validate_config(config: &DeployConfig) -> Result<()> {
    validate_stack_config(&config.stack)?;
    validate_aws_config(&config.aws)?;
    validate_poll_config(&config.poll)?;
    validate_function_config(&config.function)?;

    Ok(())
}

fn validate_stack_config(config: &StackConfig) -> Result<()> {
    validate_stack_name(&config.name).map_err(|e| anyhow::anyhow!("stack.name: {}", e))?;

    for bucket in [config.source_bucket(), config.destination_bucket()] {
        validate_bucket_name(&bucket).map_err(|e| {
            anyhow::anyhow!(
                "stack.name '{}' produces invalid bucket name '{}': {}",
                config.name,
                bucket,
                e
            )
        })?;
    }

    if config.capabilities.is_empty() {
        bail!("stack.capabilities must not be empty; the template creates a named IAM role");
    }

    if !config.capabilities.contains(&Capability::NamedIam) {
        warn!(
            capabilities = ?config.capabilities,
            "stack.capabilities lacks CAPABILITY_NAMED_IAM; CloudFormation may reject the IAM role"
        );
    }

    Ok(())
}

fn validate_aws_config(config: &AwsConfig) -> Result<()> {
    if config.region.is_empty() {
        bail!("aws.region must not be empty");
    }

    if let Some(endpoint) = &config.endpoint {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            bail!("aws.endpoint must start with http:// or https://");
        }
    }

    Ok(())
}

fn validate_poll_config(config: &PollConfig) -> Result<()> {
    if config.interval_secs == 0 {
        bail!("poll.interval_secs must be greater than 0");
    }

    if config.strategy == PollStrategy::Exponential && config.max_interval_secs < config.interval_secs
    {
        bail!("poll.max_interval_secs must be at least poll.interval_secs");
    }

    if config.max_attempts == Some(0) {
        bail!("poll.max_attempts must be greater than 0 when set");
    }

    if config.timeout_secs == Some(0) {
        bail!("poll.timeout_secs must be greater than 0 when set");
    }

    // Warn about aggressive polling against the control plane
    if config.interval_secs < 5 {
        warn!(
            interval_secs = config.interval_secs,
            "poll.interval_secs is very small; DescribeStacks may be throttled"
        );
    }

    Ok(())
}

fn validate_function_config(config: &FunctionConfig) -> Result<()> {
    if config.runtime.is_empty() {
        bail!("function.runtime must not be empty");
    }

    if !config.runtime.starts_with("python3") {
        bail!(
            "function.runtime '{}' is not a Python 3 runtime; the copy function is written in Python",
            config.runtime
        );
    }

    if config.timeout_secs == 0 || config.timeout_secs > MAX_FUNCTION_TIMEOUT_SECS {
        bail!(
            "function.timeout_secs must be between 1 and {}",
            MAX_FUNCTION_TIMEOUT_SECS
        );
    }

    Ok(())
}

/// Check a CloudFormation stack name: starts with a letter, then letters, digits and hyphens.
pub fn validate_stack_name(input: &str) -> Result<(), String> {
    if input.is_empty() {
        return Err("Stack name cannot be empty".to_string());
    }
    if input.len() > MAX_STACK_NAME_LEN {
        return Err(format!(
            "Stack name must be at most {} characters",
            MAX_STACK_NAME_LEN
        ));
    }
    if !input.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err("Stack name must start with a letter".to_string());
    }
    if !input.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err("Stack name must contain only letters, numbers, and hyphens".to_string());
    }
    Ok(())
}

pub fn validate_bucket_name(input: &str) -> Result<(), String> {
    if input.is_empty() {
        return Err("Bucket name cannot be empty".to_string());
    }
    if input.len() < 3 || input.len() > 63 {
        return Err("Bucket name must be 3-63 characters".to_string());
    }
    if !input
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(
            "Bucket name must contain only lowercase letters, numbers, and hyphens".to_string(),
        );
    }
    if input.starts_with('-') || input.ends_with('-') {
        return Err("Bucket name cannot start or end with a hyphen".to_string());
    }
    Ok(())
}
