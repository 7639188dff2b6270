//! Command execution
//!
//! Allowed commands run through the configured shell so pipes and
//! redirections in the command text keep working. stderr is folded into
//! stdout at shell level, which keeps the two streams interleaved in the
//! order the command wrote them.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::types::{ExecutionResult, LimitsConfig, PolicyConfig, ShellError};

const READ_CHUNK: usize = 4096;

/// Runs an allowed command and captures its merged output
///
/// This is the seam between connection handling and process spawning.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion
    ///
    /// Returns [`ShellError::Launch`] when no process could be started and
    /// [`ShellError::Wait`] when its exit status could not be collected. A
    /// command that starts and exits non-zero is still a success here.
    async fn run(&self, command: &str) -> Result<ExecutionResult, ShellError>;
}

/// Production runner: `<shell> -c <command>`
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
    output_buffer_bytes: usize,
}

impl ShellExecutor {
    pub fn new(policy: &PolicyConfig, limits: &LimitsConfig) -> Self {
        Self {
            shell: policy.shell.clone(),
            output_buffer_bytes: limits.output_buffer_bytes,
        }
    }

    fn build_command(&self, command: &str) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(merged_script(command))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl CommandRunner for ShellExecutor {
    #[instrument(skip(self), fields(shell = %self.shell))]
    async fn run(&self, command: &str) -> Result<ExecutionResult, ShellError> {
        let mut child = self
            .build_command(command)
            .spawn()
            .map_err(ShellError::Launch)?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Anything the shell reports before the redirect takes effect still
        // lands on stderr, so it is drained alongside and appended.
        let ((mut output, truncated), (late, late_truncated)) = tokio::join!(
            read_bounded(stdout, self.output_buffer_bytes),
            read_bounded(stderr, self.output_buffer_bytes),
        );

        let room = self.output_buffer_bytes.saturating_sub(output.len());
        let late_cut = late.len() > room;
        output.extend_from_slice(&late[..late.len().min(room)]);

        let status = child.wait().await.map_err(ShellError::Wait)?;
        debug!(
            exit_code = ?status.code(),
            bytes = output.len(),
            "Command finished"
        );

        Ok(ExecutionResult::new(
            output,
            status.code(),
            truncated || late_truncated || late_cut,
        ))
    }
}

/// Shell script that redirects stderr into stdout before running `command`
fn merged_script(command: &str) -> String {
    format!("exec 2>&1\n{}", command)
}

/// Read a stream to EOF, keeping at most `capacity` bytes
///
/// The excess is read and dropped so the child never blocks on a full pipe.
async fn read_bounded<R>(stream: Option<R>, capacity: usize) -> (Vec<u8>, bool)
where
    R: AsyncRead + Unpin,
{
    let Some(mut stream) = stream else {
        return (Vec::new(), false);
    };

    let mut kept = Vec::new();
    let mut truncated = false;
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Failed to read command output: {}", e);
                break;
            }
        };

        let room = capacity.saturating_sub(kept.len());
        if n > room {
            truncated = true;
        }
        kept.extend_from_slice(&chunk[..n.min(room)]);
    }

    (kept, truncated)
}
