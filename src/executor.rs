/* Copyright (C) 2025 Pedro Henrique / phkaiser13
 * File: src/executor.rs
 * The shared process runner for the EKS context setup step. Every external
 * tool invocation in this crate goes through `ProcessRunner::run`: spawn a
 * fixed argument vector, discard stdin, capture stdout, let stderr flow
 * through to the CI log, and classify the exit. The environment handed to a
 * child is always a fresh merge of an immutable ambient snapshot and an
 * optional overlay; the process-wide environment is never mutated.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::HashMap;
use std::fmt;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Extra environment variables layered on top of the ambient snapshot for a
/// single invocation. The overlay wins on key collision.
pub type EnvOverlay = HashMap<String, String>;

/// A fixed argument vector. The first element is the executable name; the
/// rest are passed verbatim, never joined into a shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    /// Space-joined rendering for log lines only. The command is always
    /// executed from the argument vector, never from this string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Merges an overlay on top of an ambient environment snapshot. Right-biased:
/// the overlay value wins wherever both sides define a key. Pure; neither
/// input is modified.
pub fn merge_environment(
    ambient: &HashMap<String, String>,
    overlay: &EnvOverlay,
) -> HashMap<String, String> {
    let mut merged = ambient.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Runs external commands against one immutable snapshot of the ambient
/// environment, taken when the runner is constructed. Holds no other state,
/// so concurrent `run` calls never interfere with each other.
pub struct ProcessRunner {
    ambient: HashMap<String, String>,
}

impl ProcessRunner {
    /// Snapshots the current process environment.
    pub fn from_ambient_env() -> Self {
        Self {
            ambient: std::env::vars().collect(),
        }
    }

    /// Builds a runner over an explicit snapshot, to exercise the merge
    /// behavior without touching the real environment.
    #[cfg(test)]
    pub fn with_ambient(ambient: HashMap<String, String>) -> Self {
        Self { ambient }
    }

    /// Spawns `command`, waits for it to terminate, and returns the captured
    /// stdout as text. stderr is inherited so tool diagnostics land in the
    /// CI log unmodified; stdin is closed.
    ///
    /// With an overlay the child sees the merged view of the ambient
    /// snapshot and the overlay; without one it sees the snapshot as-is.
    pub async fn run(&self, command: &CommandLine, overlay: Option<&EnvOverlay>) -> Result<String> {
        debug!("running: {}", command);

        let mut child = Command::new(command.program());
        child
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        child.env_clear();
        match overlay {
            Some(overlay) => child.envs(merge_environment(&self.ambient, overlay)),
            None => child.envs(self.ambient.clone()),
        };

        let output = child.output().await.map_err(|source| Error::Launch {
            program: command.program().to_string(),
            source,
        })?;

        if let Some(signal) = termination_signal(&output.status) {
            return Err(Error::Signal {
                command: command.to_string(),
                signal,
            });
        }

        match output.status.code() {
            Some(0) | None => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
            Some(status) => Err(Error::NonZeroExit {
                command: command.to_string(),
                status,
            }),
        }
    }
}

#[cfg(unix)]
fn termination_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}
