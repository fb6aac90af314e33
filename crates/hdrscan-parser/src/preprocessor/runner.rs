//! Preprocessor Runner
//!
//! Executes a normalized invocation as a blocking subprocess.

use hdrscan_core::{Error, NormalizedInvocation, Result};
use std::process::{Command, Stdio};
use tracing::debug;

/// Captured output of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    /// Standard output, decoded lossily
    pub stdout: String,
    /// Standard error, decoded lossily
    pub stderr: String,
}

/// Something that can execute a normalized invocation
pub trait CommandRunner {
    /// Run to completion; a non-zero exit is an error
    fn run(&self, invocation: &NormalizedInvocation) -> Result<RunOutput>;
}

/// Runs invocations as child processes, without a shell
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &NormalizedInvocation) -> Result<RunOutput> {
        let program = invocation.program();

        let mut cmd = Command::new(program);
        cmd.args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &invocation.directory {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| Error::Spawn {
            program: program.to_string(),
            source,
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(Error::SubprocessFailure {
                program: program.to_string(),
                status: output.status,
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            "`{}` produced {} bytes of output",
            program,
            stdout.len()
        );

        Ok(RunOutput { stdout, stderr })
    }
}
