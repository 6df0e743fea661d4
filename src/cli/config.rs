//! Config command handlers

use crate::cli::ConfigInitArgs;
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../querygate.example.toml");

/// Handle `querygate config init` command
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    fs::write(&args.output, EXAMPLE_CONFIG)?;

    println!("✓ Configuration file created: {}", args.output.display());
    println!("  Set the gateway launch commands and credentials before serving.");

    Ok(())
}
