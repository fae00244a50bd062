/* Copyright (C) 2025 Pedro Henrique / phkaiser13
 * File: src/credentials.rs
 * Cross-account credential provisioning. Exchanges an IAM role ARN for
 * short-lived credentials via `aws sts assume-role` and projects them into
 * the environment overlay the AWS CLI expects. The credentials live only in
 * memory for the duration of the run and are never written to disk.
 * SPDX-License-Identifier: Apache-2.0
 */

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::executor::{CommandLine, EnvOverlay, ProcessRunner};

/// Fixed session name recorded in CloudTrail for credentials issued to
/// this step.
const SESSION_NAME: &str = "eks-context-setup";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleResponse {
    credentials: AssumedRoleCredentials,
}

/// The temporary identity returned by STS. Opaque strings; only ever
/// materialized into an environment overlay.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssumedRoleCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
}

impl AssumedRoleCredentials {
    /// Projects the credentials into the three variables the AWS CLI reads.
    pub fn into_overlay(self) -> EnvOverlay {
        EnvOverlay::from([
            ("AWS_ACCESS_KEY_ID".to_string(), self.access_key_id),
            ("AWS_SECRET_ACCESS_KEY".to_string(), self.secret_access_key),
            ("AWS_SESSION_TOKEN".to_string(), self.session_token),
        ])
    }
}

fn assume_role_command(role_arn: &str) -> CommandLine {
    CommandLine::new(
        "aws",
        [
            "sts",
            "assume-role",
            "--role-arn",
            role_arn,
            "--role-session-name",
            SESSION_NAME,
            "--output",
            "json",
        ],
    )
}

fn parse_credentials(output: &str) -> Result<AssumedRoleCredentials> {
    let response: AssumeRoleResponse =
        serde_json::from_str(output).map_err(|source| Error::Parse {
            what: "aws sts assume-role",
            source,
        })?;
    Ok(response.credentials)
}

/// Assumes `role_arn` using the ambient credentials already available to the
/// process and returns the overlay for subsequent invocations. Any failure
/// here, execution or parse, is fatal to the run: without resolvable
/// credentials there is no safe default identity to continue with.
pub async fn assume_role(runner: &ProcessRunner, role_arn: &str) -> Result<EnvOverlay> {
    let output = runner.run(&assume_role_command(role_arn), None).await?;
    Ok(parse_credentials(&output)?.into_overlay())
}
