//! Build verification: compile the schemas for every target language into a
//! throwaway workspace.
//!
//! Nothing generated here is kept. Each language gets its own subdirectory of one
//! temporary workspace, the compiler runs with warnings as errors, and the first
//! failing language ends the run. The workspace is removed on every way out of
//! [`verify_build`]: success, failure, or the future being dropped on interrupt.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, error, info, info_span, Instrument};

use crate::config::{BuildConfig, TargetLanguage};
use crate::contract::{ProcessRunner, ToolInvocation};
use crate::discover::{SchemaDiscoverer, SchemaFileSet};
use crate::error::TaskError;
use crate::logging::LogContext;
use crate::runner::dispatch;

const WORKSPACE_PREFIX: &str = "proto-build";

/// Temporary directory tree owned by one verification run.
///
/// Dropping it removes the tree; [`BuildWorkspace::close`] does the same but
/// reports removal errors.
#[derive(Debug)]
pub struct BuildWorkspace {
    dir: TempDir,
}

impl BuildWorkspace {
    /// Creates a uniquely named workspace under `parent`, or the system temp dir.
    pub fn create(parent: Option<&Path>) -> Result<Self, TaskError> {
        let created = match parent {
            Some(parent) => tempfile::Builder::new()
                .prefix(WORKSPACE_PREFIX)
                .tempdir_in(parent),
            None => tempfile::Builder::new().prefix(WORKSPACE_PREFIX).tempdir(),
        };

        match created {
            Ok(dir) => {
                debug!(path = %dir.path().display(), "Created temporary build workspace");
                Ok(Self { dir })
            }
            Err(e) => {
                let path = parent
                    .map(Path::to_path_buf)
                    .unwrap_or_else(std::env::temp_dir);
                error!(error = %e, path = %path.display(), "Failed to create temporary build workspace");
                Err(TaskError::Workspace { path, source: e })
            }
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Creates the output directory for `lang`.
    pub fn language_dir(&self, lang: &TargetLanguage) -> Result<PathBuf, TaskError> {
        let dir = self.dir.path().join(lang.as_str());
        std::fs::create_dir(&dir).map_err(|e| {
            error!(error = %e, path = %dir.display(), "Failed to create language output directory");
            TaskError::Workspace {
                path: dir.clone(),
                source: e,
            }
        })?;
        Ok(dir)
    }

    /// Removes the workspace tree.
    pub fn close(self) -> Result<(), TaskError> {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => {
                debug!(path = %path.display(), "Removed temporary build workspace");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, path = %path.display(), "Failed to remove temporary build workspace");
                Err(TaskError::Workspace { path, source: e })
            }
        }
    }
}

/// `<protoc> --fatal_warnings --<lang>_out <out_dir> -I <project_root> <file>...`
pub fn protoc_invocation(
    config: &BuildConfig,
    lang: &TargetLanguage,
    out_dir: &Path,
    project_root: &Path,
    files: &SchemaFileSet,
) -> ToolInvocation {
    ToolInvocation::new(&config.protoc)
        .arg("--fatal_warnings")
        .arg(lang.out_flag())
        .arg(out_dir)
        .arg("-I")
        .arg(project_root)
        .args(files)
}

/// Compiles the discovered schemas once per configured language, in order.
///
/// Discovery runs once and its result is shared by every language. If a language
/// fails, the remaining ones are not attempted. A compile failure takes precedence
/// over a failure to remove the workspace afterwards.
pub async fn verify_build<R>(
    config: &BuildConfig,
    project_root: &Path,
    discoverer: &SchemaDiscoverer,
    runner: &R,
    log: &LogContext,
) -> Result<(), TaskError>
where
    R: ProcessRunner + ?Sized,
{
    log.scope(async {
        run_verification(config, project_root, discoverer, runner)
            .instrument(info_span!("test"))
            .await
    })
    .await
}

async fn run_verification<R>(
    config: &BuildConfig,
    project_root: &Path,
    discoverer: &SchemaDiscoverer,
    runner: &R,
) -> Result<(), TaskError>
where
    R: ProcessRunner + ?Sized,
{
    let files = discoverer.discover()?;
    let workspace = BuildWorkspace::create(config.temp_root())?;

    let compiled = compile_all(config, project_root, &files, &workspace, runner).await;
    let cleanup = workspace.close();
    compiled.and(cleanup)?;

    info!(
        languages = config.languages.len(),
        "Schemas compiled for every target language"
    );
    Ok(())
}

async fn compile_all<R>(
    config: &BuildConfig,
    project_root: &Path,
    files: &SchemaFileSet,
    workspace: &BuildWorkspace,
    runner: &R,
) -> Result<(), TaskError>
where
    R: ProcessRunner + ?Sized,
{
    for lang in &config.languages {
        let out_dir = workspace.language_dir(lang)?;
        let protoc = protoc_invocation(config, lang, &out_dir, project_root, files);

        info!(lang = %lang, args = ?protoc.arg_strings(), "Running protoc");
        dispatch(runner, &protoc).await?;
    }
    Ok(())
}
