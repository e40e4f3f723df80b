//! # contract: the process boundary between orchestrators and external tools
//!
//! Orchestrators never spawn processes themselves. They build a [`ToolInvocation`]
//! and hand it to a [`ProcessRunner`], which blocks until the tool exits and
//! reports a [`ToolStatus`]. Output of the tool is never inspected; whatever it
//! printed went to the runner's output streams.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so tests can assert on the exact
//!   arguments and the number and order of invocations without launching anything.
//! - `MockProcessRunner` is exported behind the `test-export-mocks` feature
//!   (on by default) for use from dependent crates' tests.

use std::ffi::{OsStr, OsString};
use std::fmt;

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// One call of an external command-line tool: the program and its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<OsString>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Arguments rendered lossily, for logging and assertions.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Exit status of a finished tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    Success,
    /// Non-zero exit. `None` when the process was terminated by a signal.
    Failed(Option<i32>),
}

impl ToolStatus {
    pub fn success(&self) -> bool {
        matches!(self, ToolStatus::Success)
    }
}

impl From<std::process::ExitStatus> for ToolStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        if status.success() {
            ToolStatus::Success
        } else {
            ToolStatus::Failed(status.code())
        }
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolStatus::Success => write!(f, "exit status 0"),
            ToolStatus::Failed(Some(code)) => write!(f, "exit status {code}"),
            ToolStatus::Failed(None) => write!(f, "termination by signal"),
        }
    }
}

/// Runs external tools synchronously from the caller's point of view.
///
/// Implementations must not return before the process has exited. An `Err`
/// means the process could not be started; a started process always yields a
/// [`ToolStatus`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let inv = ToolInvocation::new("buf").arg("lint");
        assert_eq!(inv.to_string(), "buf lint");
        assert_eq!(inv.arg_strings(), vec!["lint".to_string()]);
    }

    #[test]
    fn status_rendering() {
        assert_eq!(ToolStatus::Failed(Some(2)).to_string(), "exit status 2");
        assert_eq!(ToolStatus::Failed(None).to_string(), "termination by signal");
        assert!(ToolStatus::Success.success());
        assert!(!ToolStatus::Failed(Some(1)).success());
    }
}
