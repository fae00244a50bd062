/* Copyright (C) 2025 Pedro Henrique / phkaiser13
 * File: src/outputs.rs
 * Step-output publication. On a CI runner the sink appends `name=value`
 * records to the file named by `GITHUB_OUTPUT`, using the heredoc form for
 * multi-line values. Without that variable (local runs) outputs are logged
 * instead so the step stays usable as a plain CLI.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::info;

use crate::error::Result;

// Delimiter for multi-line values. A value that contains this line itself
// cannot be framed and is rejected instead of corrupting the output file.
const HEREDOC_DELIMITER: &str = "__EKS_CONTEXT_SETUP_EOF__";

pub struct OutputSink {
    path: Option<PathBuf>,
}

impl OutputSink {
    /// Binds to the output file advertised by the CI runner, if any.
    pub fn from_env() -> Self {
        Self {
            path: std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from),
        }
    }

    /// Binds to an explicit file, or to the log-only fallback when `None`.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Publishes one named output.
    pub fn set_output(&self, name: &str, value: &str) -> Result<()> {
        let Some(path) = &self.path else {
            info!("output {}={}", name, value);
            return Ok(());
        };

        let record = format_record(name, value)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(record.as_bytes())?;
        Ok(())
    }
}

fn format_record(name: &str, value: &str) -> io::Result<String> {
    if !value.contains('\n') && !value.contains('\r') {
        return Ok(format!("{}={}\n", name, value));
    }

    if value.lines().any(|line| line == HEREDOC_DELIMITER) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("output {} contains the heredoc delimiter", name),
        ));
    }

    Ok(format!(
        "{name}<<{delim}\n{value}\n{delim}\n",
        name = name,
        delim = HEREDOC_DELIMITER,
        value = value,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink_and_path() -> (OutputSink, tempfile::TempPath) {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.into_temp_path();
        (OutputSink::new(Some(path.to_path_buf())), path)
    }

    #[test]
    fn writes_single_line_outputs() {
        let (sink, path) = sink_and_path();
        sink.set_output("context", "prod").unwrap();
        sink.set_output("cluster_status", "ACTIVE").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "context=prod\ncluster_status=ACTIVE\n");
    }

    #[test]
    fn frames_multi_line_outputs_as_heredoc() {
        let (sink, path) = sink_and_path();
        sink.set_output("certificate_authority", "line one\nline two")
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            format!(
                "certificate_authority<<{d}\nline one\nline two\n{d}\n",
                d = HEREDOC_DELIMITER
            )
        );
    }

    #[test]
    fn rejects_values_containing_the_delimiter() {
        let (sink, _path) = sink_and_path();
        let hostile = format!("a\n{}\nb", HEREDOC_DELIMITER);
        assert!(sink.set_output("context", &hostile).is_err());
    }

    #[test]
    fn without_a_file_outputs_are_only_logged() {
        let sink = OutputSink::new(None);
        sink.set_output("context", "prod").unwrap();
    }
}
