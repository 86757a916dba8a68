use super::{Capability, DeployConfig, LogFormat, PollStrategy};
use anyhow::{anyhow, Context, Result};

pub const ENV_PREFIX: &str = "STACKRELAY_";

/// Abstraction over environment-variable lookups so tests can supply
/// their own source of overrides.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;

    /// Get an environment variable WITHOUT the STACKRELAY_ prefix
    /// Used for AWS standard variables (AWS_REGION, AWS_PROFILE, etc.)
    fn get_raw(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority below CLI flags).
pub fn apply_env_overrides<E: EnvSource>(config: &mut DeployConfig, env: &E) -> Result<()> {
    // Stack
    if let Some(name) = get_env_string(env, "STACK_NAME")? {
        config.stack.name = name;
    }
    if let Some(raw) = get_env_string(env, "CAPABILITIES")? {
        config.stack.capabilities = raw
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<Capability>())
            .collect::<Result<Vec<_>>>()
            .context("Invalid STACKRELAY_CAPABILITIES value")?;
    }

    // AWS standard variables first, prefixed ones win
    if let Some(region) = get_raw_env_string(env, "AWS_REGION")? {
        config.aws.region = region;
    }
    if let Some(region) = get_env_string(env, "REGION")? {
        config.aws.region = region;
    }
    if let Some(profile) = get_raw_env_string(env, "AWS_PROFILE")? {
        config.aws.profile = Some(profile);
    }
    if let Some(profile) = get_env_string(env, "PROFILE")? {
        config.aws.profile = Some(profile);
    }
    if let Some(endpoint) = get_raw_env_string(env, "AWS_ENDPOINT_URL")? {
        config.aws.endpoint = Some(endpoint);
    }
    if let Some(endpoint) = get_env_string(env, "ENDPOINT")? {
        config.aws.endpoint = Some(endpoint);
    }

    // Polling
    if let Some(strategy) = get_env_string(env, "POLL_STRATEGY")? {
        config.poll.strategy = strategy
            .parse::<PollStrategy>()
            .context("Invalid STACKRELAY_POLL_STRATEGY value")?;
    }
    if let Some(val) = get_env_u64(env, "POLL_INTERVAL_SECS")? {
        config.poll.interval_secs = val;
    }
    if let Some(val) = get_env_u64(env, "POLL_MAX_INTERVAL_SECS")? {
        config.poll.max_interval_secs = val;
    }
    if let Some(val) = get_env_u64(env, "POLL_MAX_ATTEMPTS")? {
        let attempts = u32::try_from(val)
            .map_err(|_| anyhow!("STACKRELAY_POLL_MAX_ATTEMPTS is out of range: {}", val))?;
        config.poll.max_attempts = Some(attempts);
    }
    if let Some(val) = get_env_u64(env, "POLL_TIMEOUT_SECS")? {
        config.poll.timeout_secs = Some(val);
    }

    // Copy function
    if let Some(runtime) = get_env_string(env, "FUNCTION_RUNTIME")? {
        config.function.runtime = runtime;
    }
    if let Some(val) = get_env_u64(env, "FUNCTION_TIMEOUT_SECS")? {
        config.function.timeout_secs = u32::try_from(val)
            .map_err(|_| anyhow!("STACKRELAY_FUNCTION_TIMEOUT_SECS is out of range: {}", val))?;
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL")? {
        config.log.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT")? {
        config.log.format = format
            .parse::<LogFormat>()
            .context("Invalid STACKRELAY_LOG_FORMAT value")?;
    }

    Ok(())
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Result<Option<String>> {
    Ok(env.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
}

fn get_raw_env_string<E: EnvSource>(env: &E, key: &str) -> Result<Option<String>> {
    Ok(env
        .get_raw(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

fn get_env_u64<E: EnvSource>(env: &E, key: &str) -> Result<Option<u64>> {
    match get_env_string(env, key)? {
        Some(val) => val
            .parse::<u64>()
            .map(Some)
            .map_err(|e| anyhow!("Invalid {}{} value '{}': {}", ENV_PREFIX, key, val, e)),
        None => Ok(None),
    }
}
