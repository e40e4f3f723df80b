use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::contract::{ProcessRunner, ToolInvocation, ToolStatus};
use crate::error::TaskError;

/// Where a spawned tool's standard output and error go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Share the caller's streams so tool progress and reports are visible live.
    #[default]
    Inherit,
    Discard,
}

impl OutputMode {
    fn stdio(self) -> Stdio {
        match self {
            OutputMode::Inherit => Stdio::inherit(),
            OutputMode::Discard => Stdio::null(),
        }
    }
}

/// Runs tools as real child processes.
///
/// The child is killed if the future awaiting it is dropped, so cancelling an
/// orchestration run also stops the tool it is waiting on.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    output: OutputMode,
}

impl SystemRunner {
    pub fn new(output: OutputMode) -> Self {
        Self { output }
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolStatus> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(self.output.stdio())
            .stderr(self.output.stdio())
            .kill_on_drop(true)
            .status()
            .await?;
        Ok(status.into())
    }
}

/// Runs one invocation and turns anything but a clean exit into a [`TaskError`].
pub(crate) async fn dispatch<R>(runner: &R, invocation: &ToolInvocation) -> Result<(), TaskError>
where
    R: ProcessRunner + ?Sized,
{
    let status = match runner.run(invocation).await {
        Ok(status) => status,
        Err(e) => {
            tracing::error!(tool = %invocation.program, error = %e, "Failed to launch tool process");
            return Err(TaskError::Spawn {
                tool: invocation.program.clone(),
                source: e,
            });
        }
    };

    if status.success() {
        tracing::debug!(tool = %invocation.program, "Tool finished successfully");
        Ok(())
    } else {
        tracing::error!(tool = %invocation.program, %status, "Tool exited with failure");
        Err(TaskError::ToolFailed {
            tool: invocation.program.clone(),
            status,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_exit_code_of_child() {
        let runner = SystemRunner::new(OutputMode::Discard);
        let ok = ToolInvocation::new("sh").args(["-c", "exit 0"]);
        let failing = ToolInvocation::new("sh").args(["-c", "exit 3"]);

        assert_eq!(runner.run(&ok).await.unwrap(), ToolStatus::Success);
        assert_eq!(runner.run(&failing).await.unwrap(), ToolStatus::Failed(Some(3)));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let runner = SystemRunner::new(OutputMode::Discard);
        let inv = ToolInvocation::new("proto-tasks-definitely-not-installed");

        let err = dispatch(&runner, &inv).await.unwrap_err();
        assert!(matches!(err, TaskError::Spawn { ref tool, .. } if tool == "proto-tasks-definitely-not-installed"));
    }

    #[tokio::test]
    async fn non_zero_exit_is_tool_failure() {
        let runner = SystemRunner::new(OutputMode::Discard);
        let inv = ToolInvocation::new("sh").args(["-c", "exit 1"]);

        let err = dispatch(&runner, &inv).await.unwrap_err();
        assert!(matches!(
            err,
            TaskError::ToolFailed {
                status: ToolStatus::Failed(Some(1)),
                ..
            }
        ));
    }
}
