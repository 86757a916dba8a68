//! `stackrelay deploy`

use anyhow::{Context, Result};
use stackrelay_aws::CloudFormationApi;
use stackrelay_config::DeployConfig;
use stackrelay_core::{
    template, wait, ConsoleProgress, Deployer, DeploymentOutcome, ProgressSink, StackApi,
    StackRequest, TemplateParams,
};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{info, warn};

pub async fn run(config: &DeployConfig) -> Result<()> {
    let api = CloudFormationApi::from_config(&config.aws).await;
    let outcome = execute(Arc::new(api), config, Arc::new(ConsoleProgress::stdout())).await?;

    report(&mut io::stdout().lock(), &outcome).context("Failed to write deployment summary")?;
    Ok(())
}

/// Print the success line followed by the stack ID and outputs
pub fn report(out: &mut impl Write, outcome: &DeploymentOutcome) -> io::Result<()> {
    writeln!(out, "CloudFormation stack created successfully.")?;
    if let Some(stack_id) = &outcome.stack_id {
        writeln!(out, "  Stack ID: {}", stack_id)?;
    }
    for (key, value) in &outcome.snapshot.outputs {
        writeln!(out, "  {}: {}", key, value)?;
    }
    Ok(())
}

/// Build the request from config and drive it to completion against `api`
pub async fn execute(
    api: Arc<dyn StackApi>,
    config: &DeployConfig,
    progress: Arc<dyn ProgressSink>,
) -> Result<DeploymentOutcome> {
    let body = template::render(&TemplateParams::from(&config.function));
    let request = StackRequest::new(
        &config.stack.name,
        body,
        config.stack.capabilities.iter().copied(),
    )?;

    if !config.poll.is_bounded() {
        warn!(
            stack_name = %config.stack.name,
            "Polling has no attempt limit or timeout; a stuck stack will be polled indefinitely"
        );
    }

    info!(
        stack_name = %config.stack.name,
        region = %config.aws.region,
        source_bucket = %config.stack.source_bucket(),
        destination_bucket = %config.stack.destination_bucket(),
        strategy = %config.poll.strategy,
        "Deploying stack"
    );

    Deployer::new(api)
        .with_wait_strategy(wait::from_config(&config.poll))
        .with_progress(progress)
        .deploy(&request)
        .await
        .with_context(|| format!("Failed to deploy stack '{}'", config.stack.name))
}
