/* Copyright (C) 2025 Pedro Henrique / phkaiser13
 * File: src/cli.rs
 * This file defines the command-line and CI-input surface of the step using
 * the `clap` crate. Every flag is backed by the corresponding GitHub-Actions
 * style `INPUT_*` environment variable, so the same binary works as an
 * action step (inputs via environment) and as a plain CLI (inputs via
 * flags). `RunConfig` is the resolved, immutable configuration the workflow
 * consumes.
 * SPDX-License-Identifier: Apache-2.0
 */

use clap::Parser;

/// Configures a local kubeconfig context for an Amazon EKS cluster.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name of the EKS cluster to configure a context for.
    #[arg(long, env = "INPUT_CLUSTER")]
    pub cluster: String,

    /// Alias under which the context is stored in the kubeconfig.
    /// Defaults to the cluster name.
    #[arg(long, env = "INPUT_CONTEXT")]
    pub context: Option<String>,

    /// IAM role ARN to assume before talking to the cluster.
    #[arg(long, env = "INPUT_ROLE")]
    pub role: Option<String>,

    /// Activate the context with `kubectl config use-context` afterwards.
    /// Accepts an optional true/false value; an empty value counts as unset.
    #[arg(
        long,
        env = "INPUT_ACTIVATE",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub activate: Option<String>,

    /// Continue even if updating the kubeconfig fails.
    /// Accepts an optional true/false value; an empty value counts as unset.
    #[arg(
        long = "allow-error",
        env = "INPUT_ALLOW_ERROR",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub allow_error: Option<String>,

    /// Emit diagnostic steps (dry-run configure, kubeconfig view).
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

/// The resolved configuration for one invocation. Immutable once built.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub cluster: String,
    /// Resolved context alias; falls back to the cluster name.
    pub context: String,
    pub role: Option<String>,
    pub activate: bool,
    pub allow_error: bool,
    pub debug: bool,
}

impl RunConfig {
    /// Resolves CLI inputs into the run configuration. A CI runner passes
    /// empty strings for optional inputs it was not given, so empty values
    /// are treated as absent. `runner_debug` carries the ambient
    /// `RUNNER_DEBUG=1` convention from the execution environment.
    pub fn resolve(cli: Cli, runner_debug: bool) -> anyhow::Result<Self> {
        let cluster = cli.cluster.trim().to_string();
        if cluster.is_empty() {
            anyhow::bail!("the `cluster` input is required and must not be empty");
        }

        let context = non_empty(cli.context).unwrap_or_else(|| cluster.clone());
        let role = non_empty(cli.role);

        Ok(Self {
            cluster,
            context,
            role,
            activate: bool_input("activate", cli.activate)?,
            allow_error: bool_input("allow-error", cli.allow_error)?,
            debug: cli.debug || runner_debug,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Interprets a boolean input the way a CI runner delivers it: absent and
/// empty both mean false, otherwise the value must spell true or false
/// (case-insensitive).
fn bool_input(name: &str, value: Option<String>) -> anyhow::Result<bool> {
    let Some(value) = non_empty(value) else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => anyhow::bail!(
            "the `{}` input must be `true` or `false`, got {:?}",
            name,
            other
        ),
    }
}

/// Reads the ambient debug convention used by GitHub Actions runners.
pub fn ambient_runner_debug() -> bool {
    std::env::var("RUNNER_DEBUG").map(|v| v == "1").unwrap_or(false)
}
