//! `stackrelay template`

use crate::cli::TemplateArgs;
use anyhow::{bail, Context, Result};
use stackrelay_config::DeployConfig;
use stackrelay_core::{template, TemplateParams};
use std::fs;

pub fn run(config: &DeployConfig, args: &TemplateArgs) -> Result<()> {
    let content = template::render(&TemplateParams::from(&config.function));

    let Some(path) = &args.output else {
        print!("{}", content);
        return Ok(());
    };

    if path.exists() && !args.force {
        bail!(
            "{} already exists. Re-run with --force to overwrite.",
            path.display()
        );
    }

    fs::write(path, &content).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Created {} for stack {}", path.display(), config.stack.name);
    println!();
    println!("Buckets:");
    println!("  source:      {}", config.stack.source_bucket());
    println!("  destination: {}", config.stack.destination_bucket());

    Ok(())
}
