//! Command-line interface and config resolution

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use stackrelay_config::{DeployConfig, PollStrategy};
use std::path::PathBuf;

/// Deploy the S3 copy stack with CloudFormation and wait for it to settle
#[derive(Parser, Debug)]
#[command(name = "stackrelay")]
#[command(version)]
#[command(about = "Deploy the S3 copy stack with CloudFormation and wait for it to settle", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// CloudFormation stack name (also prefixes both bucket names)
    #[arg(short, long, value_name = "NAME", global = true)]
    pub stack_name: Option<String>,

    /// AWS region
    #[arg(short, long, value_name = "REGION", global = true)]
    pub region: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the stack and poll until it completes (default if no subcommand given)
    Deploy(DeployArgs),
    /// Print or write the rendered CloudFormation template
    Template(TemplateArgs),
    /// Show the stack's current status once
    Status(StatusArgs),
}

#[derive(Args, Debug, Default)]
pub struct DeployArgs {
    /// Seconds between status polls
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Poll strategy: fixed or exponential
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<PollStrategy>,

    /// Give up after this many polls
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Give up after waiting this many seconds in total
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug, Default)]
pub struct TemplateArgs {
    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Load config from file/env, then layer CLI flags on top.
    /// Validation is left to the caller so its warnings reach the log.
    pub fn resolve_config(&self) -> Result<DeployConfig> {
        let mut config = match &self.config {
            Some(path) => DeployConfig::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => DeployConfig::load().context("Failed to load configuration")?,
        };

        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut DeployConfig) {
        if let Some(name) = &self.stack_name {
            config.stack.name = name.clone();
        }
        if let Some(region) = &self.region {
            config.aws.region = region.clone();
        }
        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }

        if let Some(Commands::Deploy(args)) = &self.command {
            if let Some(interval) = args.interval {
                config.poll.interval_secs = interval;
            }
            if let Some(strategy) = args.strategy {
                config.poll.strategy = strategy;
            }
            if let Some(max_attempts) = args.max_attempts {
                config.poll.max_attempts = Some(max_attempts);
            }
            if let Some(timeout) = args.timeout {
                config.poll.timeout_secs = Some(timeout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["stackrelay"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.stack_name.is_none());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stackrelay",
            "deploy",
            "--stack-name",
            "photos",
            "--region",
            "eu-west-1",
            "--strategy",
            "exponential",
            "--max-attempts",
            "12",
        ])
        .unwrap();

        let mut config = DeployConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.stack.name, "photos");
        assert_eq!(config.aws.region, "eu-west-1");
        assert_eq!(config.poll.strategy, PollStrategy::Exponential);
        assert_eq!(config.poll.max_attempts, Some(12));
        assert_eq!(config.poll.interval_secs, 10);
    }

    #[test]
    fn flag_replaces_invalid_loaded_value() {
        let cli = Cli::try_parse_from(["stackrelay", "--stack-name", "good"]).unwrap();

        let mut config = DeployConfig::default();
        config.stack.name = "Bad_Name".to_string();
        assert!(config.validate().is_err());

        cli.apply_overrides(&mut config);
        assert_eq!(config.stack.name, "good");
        config.validate().unwrap();
    }

    #[test]
    fn poll_flags_only_apply_to_deploy() {
        let cli = Cli::try_parse_from(["stackrelay", "status", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Status(StatusArgs { json: true }))));

        assert!(Cli::try_parse_from(["stackrelay", "status", "--interval", "5"]).is_err());
    }

    #[test]
    fn rejects_unknown_strategy() {
        assert!(Cli::try_parse_from(["stackrelay", "deploy", "--strategy", "random"]).is_err());
    }

    #[test]
    fn template_output_flags() {
        let cli =
            Cli::try_parse_from(["stackrelay", "template", "-o", "stack.yaml", "--force"]).unwrap();
        match cli.command {
            Some(Commands::Template(args)) => {
                assert_eq!(args.output, Some(PathBuf::from("stack.yaml")));
                assert!(args.force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
