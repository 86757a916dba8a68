// stackrelay-config - Configuration for the stack deployer
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from STACKRELAY_CONFIG env var
// 3. Config file contents from STACKRELAY_CONFIG_CONTENT env var
// 4. Default config file locations (./stackrelay.toml, ./.stackrelay.toml)
// 5. Built-in defaults (lowest priority)
//
// CLI flags are applied on top by the binary.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};
pub use validation::{validate_bucket_name, validate_stack_name};

/// Suffix appended to the stack name for the bucket new objects land in
pub const SOURCE_BUCKET_SUFFIX: &str = "-source";
/// Suffix appended to the stack name for the bucket objects are copied to
pub const DESTINATION_BUCKET_SUFFIX: &str = "-destination";

/// Main deployer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub stack: StackConfig,

    #[serde(default)]
    pub aws: AwsConfig,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub function: FunctionConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Stack identity and create-request options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    pub name: String,
    pub capabilities: Vec<Capability>,
}

fn default_capabilities() -> Vec<Capability> {
    vec![Capability::NamedIam]
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            name: "demos3".to_string(),
            capabilities: default_capabilities(),
        }
    }
}

impl StackConfig {
    pub fn source_bucket(&self) -> String {
        format!("{}{}", self.name, SOURCE_BUCKET_SUFFIX)
    }

    pub fn destination_bucket(&self) -> String {
        format!("{}{}", self.name, DESTINATION_BUCKET_SUFFIX)
    }
}

/// Acknowledgements CloudFormation requires before creating privileged resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "CAPABILITY_IAM")]
    Iam,
    #[serde(rename = "CAPABILITY_NAMED_IAM")]
    NamedIam,
    #[serde(rename = "CAPABILITY_AUTO_EXPAND")]
    AutoExpand,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Iam => "CAPABILITY_IAM",
            Capability::NamedIam => "CAPABILITY_NAMED_IAM",
            Capability::AutoExpand => "CAPABILITY_AUTO_EXPAND",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_uppercase();
        let name = upper.strip_prefix("CAPABILITY_").unwrap_or(&upper);
        match name {
            "IAM" => Ok(Capability::Iam),
            "NAMED_IAM" => Ok(Capability::NamedIam),
            "AUTO_EXPAND" => Ok(Capability::AutoExpand),
            _ => anyhow::bail!(
                "Unsupported capability: {}. Supported: CAPABILITY_IAM, CAPABILITY_NAMED_IAM, CAPABILITY_AUTO_EXPAND",
                s
            ),
        }
    }
}

/// AWS client configuration, passed explicitly to the client builder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint: None,
            profile: None,
        }
    }
}

/// Status polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub strategy: PollStrategy,
    pub interval_secs: u64,
    pub max_interval_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            strategy: PollStrategy::Fixed,
            interval_secs: 10,
            max_interval_secs: 60,
            max_attempts: None,
            timeout_secs: None,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_secs(self.max_interval_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// True when polling stops on its own even if the stack never settles
    pub fn is_bounded(&self) -> bool {
        self.max_attempts.is_some() || self.timeout_secs.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStrategy {
    #[default]
    Fixed,
    Exponential,
}

impl std::fmt::Display for PollStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollStrategy::Fixed => write!(f, "fixed"),
            PollStrategy::Exponential => write!(f, "exponential"),
        }
    }
}

impl std::str::FromStr for PollStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fixed" | "interval" => Ok(PollStrategy::Fixed),
            "exponential" | "backoff" => Ok(PollStrategy::Exponential),
            _ => anyhow::bail!("Unsupported poll strategy: {}. Supported: fixed, exponential", s),
        }
    }
}

/// Settings for the copy function declared in the template
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionConfig {
    pub runtime: String,
    pub timeout_secs: u32,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            runtime: "python3.12".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

impl DeployConfig {
    /// Load configuration from all sources with priority.
    /// The result is not validated; call [`DeployConfig::validate`] once
    /// every override has been applied.
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Load configuration from an explicit file path (CLI --config flag), unvalidated
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    /// Parse a TOML document on top of the built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
