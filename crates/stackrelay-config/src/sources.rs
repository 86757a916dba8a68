// Configuration source loading.
//
// Priority order:
// 1. Environment variables (STACKRELAY_* prefix, plus AWS_REGION/AWS_PROFILE/AWS_ENDPOINT_URL)
// 2. Config file path from STACKRELAY_CONFIG
// 3. Inline config content from STACKRELAY_CONFIG_CONTENT
// 4. Default config files (./stackrelay.toml, ./.stackrelay.toml)
// 5. Built-in defaults

use crate::env_overrides::{self, EnvSource, ENV_PREFIX};
use crate::DeployConfig;
use anyhow::{Context, Result};
use std::env;
use std::path::Path;

const DEFAULT_PATHS: &[&str] = &["./stackrelay.toml", "./.stackrelay.toml"];

/// Load configuration using native environment/file access.
///
/// Not validated here: callers layer CLI flags on top and validate once.
pub fn load_config() -> Result<DeployConfig> {
    let mut config = load_from_file()?.unwrap_or_default();

    env_overrides::apply_env_overrides(&mut config, &StdEnvSource)?;
    Ok(config)
}

fn load_from_file() -> Result<Option<DeployConfig>> {
    if let Ok(path) = env::var("STACKRELAY_CONFIG") {
        return read_file(&path).map(Some);
    }

    if let Ok(content) = env::var("STACKRELAY_CONFIG_CONTENT") {
        let config: DeployConfig = toml::from_str(&content)
            .context("Failed to parse inline config from STACKRELAY_CONFIG_CONTENT")?;
        return Ok(Some(config));
    }

    for path in DEFAULT_PATHS {
        if Path::new(path).exists() {
            return read_file(path).map(Some);
        }
    }

    Ok(None)
}

fn read_file(path: impl AsRef<Path>) -> Result<DeployConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration from a specific file path (for CLI --config flag).
/// Returns error if file doesn't exist or can't be parsed.
/// Environment overrides still apply on top of the file. Not validated.
pub fn load_from_file_path(path: impl AsRef<Path>) -> Result<DeployConfig> {
    let mut config = read_file(path)?;

    env_overrides::apply_env_overrides(&mut config, &StdEnvSource)?;
    Ok(config)
}

struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}
