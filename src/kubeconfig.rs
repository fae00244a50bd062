/* Copyright (C) 2025 Pedro Henrique / phkaiser13
 * File: src/kubeconfig.rs
 * Kubeconfig manipulation commands. The builders are pure functions from the
 * run configuration to fixed argument vectors, so the conditional inclusion
 * of the alias, role and dry-run arguments is testable without spawning
 * anything. The async wrappers delegate to the shared process runner.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::Result;
use crate::executor::{CommandLine, EnvOverlay, ProcessRunner};

/// Builds `aws eks update-kubeconfig` for `name`. The alias, role and
/// dry-run arguments are included only when supplied.
pub fn update_kubeconfig_command(
    name: &str,
    context: Option<&str>,
    role_arn: Option<&str>,
    dry_run: bool,
) -> CommandLine {
    let mut args = vec![
        "eks".to_string(),
        "update-kubeconfig".to_string(),
        "--name".to_string(),
        name.to_string(),
    ];

    if let Some(context) = context {
        args.push("--alias".to_string());
        args.push(context.to_string());
    }
    if let Some(role_arn) = role_arn {
        args.push("--role-arn".to_string());
        args.push(role_arn.to_string());
    }
    if dry_run {
        args.push("--dry-run".to_string());
    }

    CommandLine::new("aws", args)
}

/// Builds `kubectl config use-context` for the resolved alias.
pub fn use_context_command(context: &str) -> CommandLine {
    CommandLine::new("kubectl", ["config", "use-context", context])
}

/// Builds the diagnostic `kubectl config view` invocation.
pub fn view_command() -> CommandLine {
    CommandLine::new("kubectl", ["config", "view"])
}

/// Runs the kubeconfig update under the given credential environment and
/// returns the tool's output. A dry run reports what would change without
/// persisting anything; its outcome never feeds into the real invocation.
pub async fn update_kubeconfig(
    runner: &ProcessRunner,
    name: &str,
    context: Option<&str>,
    role_arn: Option<&str>,
    overlay: Option<&EnvOverlay>,
    dry_run: bool,
) -> Result<String> {
    let command = update_kubeconfig_command(name, context, role_arn, dry_run);
    runner.run(&command, overlay).await
}
