//! Invocation of the external TTS command.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use artifact_mcp_common::error::{Error, Result};
use tokio::process::Command;
use tracing::{debug, error};

use crate::handler::AudioFormat;

/// Runs `<program> <input> <output> --voice <voice> --format <format>` with the
/// model directory as working directory.
#[derive(Debug, Clone)]
pub struct EngineRunner {
    program: String,
    working_dir: PathBuf,
    timeout: Option<Duration>,
}

impl EngineRunner {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.into(),
            timeout: None,
        }
    }

    /// Kill the engine and fail with `Error::Timeout` after `timeout`.
    /// A zero duration means no timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|limit| !limit.is_zero());
        self
    }

    /// Convert the text in `input` to audio in `output`.
    ///
    /// # Errors
    /// - `Error::EngineExecution` if the engine cannot be started, exits
    ///   non-zero (carrying its stderr), or exits zero without writing `output`
    /// - `Error::Timeout` if the configured timeout elapses
    pub async fn synthesize(&self, input: &Path, output: &Path, voice: &str, format: AudioFormat) -> Result<()> {
        let mut command = Command::new(&self.program);
        command
            .arg(input)
            .arg(output)
            .args(["--voice", voice, "--format", format.as_str()])
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            program = %self.program,
            voice,
            format = format.as_str(),
            cwd = %self.working_dir.display(),
            "Running TTS engine"
        );

        let run = command.output();
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| Error::timeout(limit.as_secs()))?,
            None => run.await,
        };

        let output_status = result
            .map_err(|e| Error::engine(format!("could not start '{}': {}", self.program, e)))?;

        if !output_status.status.success() {
            let stderr = String::from_utf8_lossy(&output_status.stderr).trim().to_string();
            error!(status = %output_status.status, stderr = %stderr, "TTS engine failed");
            if stderr.is_empty() {
                return Err(Error::engine(format!("engine {}", output_status.status)));
            }
            return Err(Error::engine(stderr));
        }

        if !tokio::fs::try_exists(output).await? {
            return Err(Error::engine("TTS command succeeded but output file was not created"));
        }

        Ok(())
    }
}
