// Copyright (c) 2025 - Cowboy AI, Inc.
//! VPC Template Generator
//!
//! Builds the VPC stack, checks its structural invariants and writes the
//! CloudFormation JSON the deployment pipeline applies.
//!
//! Run with: cargo run --bin vpc-template
//!
//! Environment:
//! - `VPC_TEMPLATE_OUTPUT` overrides the output file
//! - `RUST_LOG` controls log filtering

use anyhow::{Context, Result};
use tracing::info;
use vpc_template::{build_vpc_template, validate_template, write_template, GeneratorConfig};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = GeneratorConfig::from_env();
    info!("📋 Output: {}", config.output_path.display());
    info!("  - Network: {}", config.layout.network);
    info!("  - Zones: {}", config.layout.zones.len());

    let template = build_vpc_template(&config.layout).context("Failed to build VPC template")?;
    validate_template(&template).context("Generated template is malformed")?;

    write_template(&template, &config.output_path).with_context(|| {
        format!(
            "Failed to write template to {}",
            config.output_path.display()
        )
    })?;

    info!("✅ Template generated with {} resources", template.len());
    Ok(())
}
