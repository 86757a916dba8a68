//! `stackrelay status`

use crate::cli::StatusArgs;
use anyhow::{Context, Result};
use stackrelay_aws::CloudFormationApi;
use stackrelay_config::DeployConfig;
use stackrelay_core::{Deployer, StackSnapshot};
use std::sync::Arc;

pub async fn run(config: &DeployConfig, args: &StatusArgs) -> Result<()> {
    let api = CloudFormationApi::from_config(&config.aws).await;
    let snapshot = Deployer::new(Arc::new(api))
        .describe(&config.stack.name)
        .await
        .with_context(|| format!("Failed to read status of stack '{}'", config.stack.name))?;

    if args.json {
        println!("{}", to_json(&config.stack.name, &snapshot));
    } else {
        print_human(&config.stack.name, &snapshot);
    }

    Ok(())
}

fn to_json(stack_name: &str, snapshot: &StackSnapshot) -> serde_json::Value {
    serde_json::json!({
        "stack_name": stack_name,
        "stack_id": snapshot.stack_id,
        "status": snapshot.status.as_str(),
        "phase": format!("{:?}", snapshot.status.phase()),
        "status_reason": snapshot.status_reason,
        "outputs": snapshot.outputs,
    })
}

fn print_human(stack_name: &str, snapshot: &StackSnapshot) {
    println!("Stack: {}", stack_name);
    println!("Stack status: {}", snapshot.status);
    if let Some(reason) = &snapshot.status_reason {
        println!("Reason: {}", reason);
    }
    if !snapshot.outputs.is_empty() {
        println!("Outputs:");
        for (key, value) in &snapshot.outputs {
            println!("  {}: {}", key, value);
        }
    }
}
