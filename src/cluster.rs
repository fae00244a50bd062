/* Copyright (C) 2025 Pedro Henrique / phkaiser13
 * File: src/cluster.rs
 * Cluster inspection. Queries `aws eks describe-cluster` under the resolved
 * credential environment, parses the descriptor, and publishes its fields as
 * step outputs. Describing the cluster is diagnostic: execution and parse
 * failures are logged and swallowed so the configure step can still run with
 * the originally requested name. A present but undecodable certificate
 * authority bundle is the one hard error here.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::executor::{CommandLine, EnvOverlay, ProcessRunner};
use crate::outputs::OutputSink;

#[derive(Debug, Deserialize)]
struct DescribeClusterResponse {
    cluster: ClusterDescriptor,
}

/// Read-only snapshot of the cluster metadata, built once per invocation
/// from the describe-cluster payload. Only the consumed fields are modeled.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDescriptor {
    pub name: String,
    pub arn: String,
    pub version: String,
    pub platform_version: String,
    pub endpoint: String,
    pub status: String,
    #[serde(default)]
    pub certificate_authority: Option<CertificateAuthority>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateAuthority {
    #[serde(default)]
    pub data: Option<String>,
}

fn describe_cluster_command(name: &str) -> CommandLine {
    CommandLine::new(
        "aws",
        ["eks", "describe-cluster", "--name", name, "--output", "json"],
    )
}

fn parse_descriptor(output: &str) -> Result<ClusterDescriptor> {
    let response: DescribeClusterResponse =
        serde_json::from_str(output).map_err(|source| Error::Parse {
            what: "aws eks describe-cluster",
            source,
        })?;
    Ok(response.cluster)
}

/// Decodes the base64 certificate-authority bundle into text. Decoded bytes
/// that are not strict UTF-8 are rendered lossily, matching what a PEM
/// bundle tolerates; invalid base64 is a hard error.
fn decode_certificate(data: &str) -> Result<String> {
    let bytes = B64.decode(data)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn publish(descriptor: &ClusterDescriptor, outputs: &OutputSink) -> Result<()> {
    outputs.set_output("cluster_name", &descriptor.name)?;
    outputs.set_output("cluster_arn", &descriptor.arn)?;
    outputs.set_output("cluster_status", &descriptor.status)?;
    outputs.set_output("cluster_endpoint", &descriptor.endpoint)?;

    let tags = serde_json::to_string(&descriptor.tags).map_err(|source| Error::Parse {
        what: "cluster tags",
        source,
    })?;
    outputs.set_output("cluster_tags", &tags)?;

    outputs.set_output("kubernetes_version", &descriptor.version)?;
    outputs.set_output("platform_version", &descriptor.platform_version)?;

    if let Some(data) = descriptor
        .certificate_authority
        .as_ref()
        .and_then(|ca| ca.data.as_deref())
    {
        outputs.set_output("certificate_authority", &decode_certificate(data)?)?;
    }

    Ok(())
}

/// Describes `name` under the given credential environment and publishes the
/// descriptor fields as step outputs. Returns `None` when the cluster could
/// not be described; the caller proceeds with the requested name.
pub async fn describe_cluster(
    runner: &ProcessRunner,
    name: &str,
    overlay: Option<&EnvOverlay>,
    outputs: &OutputSink,
) -> Result<Option<ClusterDescriptor>> {
    let described = match runner.run(&describe_cluster_command(name), overlay).await {
        Ok(output) => parse_descriptor(&output),
        Err(err) => Err(err),
    };

    let descriptor = match described {
        Ok(descriptor) => descriptor,
        Err(err) => {
            warn!("failed to describe EKS cluster {:?}: {}", name, err);
            return Ok(None);
        }
    };

    publish(&descriptor, outputs)?;
    Ok(Some(descriptor))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "cluster": {
            "name": "prod",
            "arn": "arn:aws:eks:us-east-1:123:cluster/prod",
            "createdAt": "2024-03-01T12:00:00Z",
            "version": "1.29",
            "platformVersion": "eks.4",
            "endpoint": "https://ABC.gr7.us-east-1.eks.amazonaws.com",
            "status": "ACTIVE",
            "certificateAuthority": { "data": "aGVsbG8=" },
            "tags": { "team": "platform" }
        }
    }"#;

    #[test]
    fn builds_the_fixed_describe_command() {
        let cmd = describe_cluster_command("prod");
        assert_eq!(cmd.program(), "aws");
        assert_eq!(
            cmd.args(),
            ["eks", "describe-cluster", "--name", "prod", "--output", "json"]
        );
    }

    #[test]
    fn parses_the_wrapped_cluster_object() {
        let descriptor = parse_descriptor(PAYLOAD).unwrap();
        assert_eq!(descriptor.name, "prod");
        assert_eq!(descriptor.status, "ACTIVE");
        assert_eq!(descriptor.platform_version, "eks.4");
        assert_eq!(
            descriptor.tags.get("team").map(String::as_str),
            Some("platform")
        );
    }

    #[test]
    fn missing_tags_and_certificate_default_cleanly() {
        let payload = r#"{
            "cluster": {
                "name": "bare",
                "arn": "arn:aws:eks:us-east-1:123:cluster/bare",
                "version": "1.29",
                "platformVersion": "eks.4",
                "endpoint": "https://example",
                "status": "CREATING"
            }
        }"#;
        let descriptor = parse_descriptor(payload).unwrap();
        assert!(descriptor.tags.is_empty());
        assert!(descriptor.certificate_authority.is_none());
    }

    #[test]
    fn decodes_the_certificate_authority_exactly() {
        assert_eq!(decode_certificate("aGVsbG8=").unwrap(), "hello");
    }

    #[test]
    fn invalid_base64_is_a_hard_error() {
        match decode_certificate("not//valid==base64!!") {
            Err(Error::CertificateDecode(_)) => {}
            other => panic!("expected CertificateDecode, got {:?}", other),
        }
    }

    #[test]
    fn publishes_all_descriptor_fields() {
        let descriptor = parse_descriptor(PAYLOAD).unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.into_temp_path();
        let sink = OutputSink::new(Some(path.to_path_buf()));

        publish(&descriptor, &sink).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("cluster_name=prod\n"));
        assert!(contents.contains("cluster_arn=arn:aws:eks:us-east-1:123:cluster/prod\n"));
        assert!(contents.contains("cluster_status=ACTIVE\n"));
        assert!(contents.contains("cluster_endpoint=https://ABC.gr7.us-east-1.eks.amazonaws.com\n"));
        assert!(contents.contains(r#"cluster_tags={"team":"platform"}"#));
        assert!(contents.contains("kubernetes_version=1.29\n"));
        assert!(contents.contains("platform_version=eks.4\n"));
        assert!(contents.contains("certificate_authority=hello\n"));
    }

    #[test]
    fn publication_skips_an_absent_certificate() {
        let payload = PAYLOAD.replace(r#""certificateAuthority": { "data": "aGVsbG8=" },"#, "");
        let descriptor = parse_descriptor(&payload).unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.into_temp_path();
        let sink = OutputSink::new(Some(path.to_path_buf()));

        publish(&descriptor, &sink).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("certificate_authority"));
    }
}
