/* Copyright (C) 2025 Pedro Henrique / phkaiser13
 * File: src/error.rs
 * Classified failure taxonomy for the EKS context setup step. Every external
 * command invocation resolves to one of these variants; the workflow decides
 * per step whether a variant is fatal or merely logged.
 * SPDX-License-Identifier: Apache-2.0
 */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The child process could not be started at all (binary missing from
    /// PATH, permission denied, and similar spawn-time failures).
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The child process was terminated by a signal before exiting.
    #[error("`{command}` process exited from signal {signal}")]
    Signal { command: String, signal: i32 },

    /// The child process ran to completion but reported a non-zero status.
    #[error("`{command}` process exited with status {status}")]
    NonZeroExit { command: String, status: i32 },

    /// Captured output was not the JSON shape the caller expected.
    #[error("failed to parse {what} output: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The certificate-authority bundle was present but not valid base64.
    #[error("cluster certificate authority is not valid base64: {0}")]
    CertificateDecode(#[from] base64::DecodeError),

    /// A step output could not be written to the output file.
    #[error("failed to write step output: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
