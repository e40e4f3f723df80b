use std::path::PathBuf;

use thiserror::Error;

use crate::contract::ToolStatus;

/// Every way an orchestration run can fail.
///
/// Orchestrators stop at the first error and return it unchanged; the only
/// cleanup performed on the way out is removal of the temporary build workspace.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The schema directory walk could not complete.
    #[error("failed to discover schema files under {}: {source}", root.display())]
    Discovery {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The external tool could not be started at all.
    #[error("failed to start `{tool}`: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool ran and reported failure.
    #[error("`{tool}` failed with {status}")]
    ToolFailed { tool: String, status: ToolStatus },

    /// Creating, populating or removing the temporary build workspace failed.
    #[error("temporary build workspace error at {}: {source}", path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("interrupted")]
    Interrupted,
}
