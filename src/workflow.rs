/* Copyright (C) 2025 Pedro Henrique / phkaiser13
 * File: src/workflow.rs
 * The linear workflow of the step, with its per-step failure policy:
 * assuming the role is fatal, describing the cluster is best-effort, the
 * real kubeconfig update is fatal unless `allow-error` is set, activating
 * the context is always fatal, and the diagnostic dry-run and config-view
 * steps never escalate beyond a log line.
 * SPDX-License-Identifier: Apache-2.0
 */

use tracing::{error, info, warn};

use crate::cli::RunConfig;
use crate::cluster;
use crate::credentials;
use crate::error::Result;
use crate::executor::ProcessRunner;
use crate::kubeconfig;
use crate::outputs::OutputSink;

/// Runs the whole step. Consumes one immutable `RunConfig`; all child
/// processes execute sequentially, each step awaiting the previous one.
pub async fn run(config: RunConfig) -> Result<()> {
    let runner = ProcessRunner::from_ambient_env();
    let outputs = OutputSink::from_env();

    let overlay = match &config.role {
        Some(role) => {
            info!("assuming role {}", role);
            match credentials::assume_role(&runner, role).await {
                Ok(overlay) => Some(overlay),
                Err(err) => {
                    error!("aws sts assume-role failed: {}", err);
                    return Err(err);
                }
            }
        }
        None => None,
    };

    let described =
        cluster::describe_cluster(&runner, &config.cluster, overlay.as_ref(), &outputs).await?;

    // The descriptor name is authoritative when available; otherwise the
    // configure step falls back to the requested name.
    let cluster_name = described
        .as_ref()
        .map(|c| c.name.as_str())
        .unwrap_or(&config.cluster);

    if config.debug {
        let dry_run = kubeconfig::update_kubeconfig(
            &runner,
            cluster_name,
            Some(&config.context),
            config.role.as_deref(),
            overlay.as_ref(),
            true,
        )
        .await;
        match dry_run {
            Ok(output) => info!("update-kubeconfig dry run:\n{}", output.trim_end()),
            Err(err) => warn!("update-kubeconfig dry run failed: {}", err),
        }
    }

    let configured = kubeconfig::update_kubeconfig(
        &runner,
        cluster_name,
        Some(&config.context),
        config.role.as_deref(),
        overlay.as_ref(),
        false,
    )
    .await;
    match configured {
        Ok(output) => {
            let output = output.trim_end();
            if !output.is_empty() {
                info!("{}", output);
            }
        }
        Err(err) => {
            error!("aws eks update-kubeconfig failed: {}", err);
            if !config.allow_error {
                return Err(err);
            }
        }
    }

    // Published regardless of the configure outcome when allow-error let the
    // run continue; the alias is the requested one either way.
    outputs.set_output("context", &config.context)?;

    if config.activate {
        let command = kubeconfig::use_context_command(&config.context);
        match runner.run(&command, None).await {
            Ok(output) => info!("{}", output.trim_end()),
            Err(err) => {
                error!("kubectl config use-context failed: {}", err);
                return Err(err);
            }
        }
    }

    if config.debug {
        match runner.run(&kubeconfig::view_command(), None).await {
            Ok(output) => info!("kubectl config view:\n{}", output.trim_end()),
            Err(err) => warn!("kubectl config view failed: {}", err),
        }
    }

    Ok(())
}
