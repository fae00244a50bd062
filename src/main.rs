/* Copyright (C) 2025 Pedro Henrique / phkaiser13
 * File: src/main.rs
 * Entry point for the `eks_context_setup` CI step. Parses the inputs
 * (flags or INPUT_* environment variables), initializes tracing, and runs
 * the workflow on a Tokio runtime. Any fatal workflow failure is reported
 * and mapped to a non-zero exit status for the CI platform.
 * SPDX-License-Identifier: Apache-2.0
 */

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod cluster;
mod credentials;
mod error;
mod executor;
mod kubeconfig;
mod outputs;
mod workflow;

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = cli::RunConfig::resolve(cli::Cli::parse(), cli::ambient_runner_debug())?;
    init_tracing(config.debug);

    workflow::run(config)
        .await
        .context("failed to configure the EKS cluster context")?;

    Ok(())
}
