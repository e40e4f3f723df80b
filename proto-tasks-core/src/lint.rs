//! Lint orchestration: `api-linter` over the discovered schemas, then `buf lint`.
//!
//! The two linters have unrelated rule sets and report formats, so there is no
//! attempt to merge their findings. Each prints to the inherited streams and the
//! run is pass/fail: the first linter to fail ends the run, and `buf` is never
//! started after an `api-linter` failure.

use tracing::{info, info_span, Instrument};

use crate::config::LintConfig;
use crate::contract::{ProcessRunner, ToolInvocation};
use crate::discover::{SchemaDiscoverer, SchemaFileSet};
use crate::error::TaskError;
use crate::logging::LogContext;
use crate::runner::dispatch;

/// `<api-linter> --set-exit-status --config <config> -I . <file>...`
pub fn api_linter_invocation(config: &LintConfig, files: &SchemaFileSet) -> ToolInvocation {
    ToolInvocation::new(&config.api_linter)
        .arg("--set-exit-status")
        .arg("--config")
        .arg(&config.api_linter_config)
        .args(["-I", "."])
        .args(files)
}

/// `<buf> lint`; buf finds its inputs through its own configuration.
pub fn buf_lint_invocation(config: &LintConfig) -> ToolInvocation {
    ToolInvocation::new(&config.buf).arg("lint")
}

/// Runs both linters in sequence, stopping at the first failure.
///
/// Discovery errors are returned unchanged. Zero schema files is not an error here:
/// `api-linter` is still invoked, with no file arguments.
pub async fn lint<R>(
    config: &LintConfig,
    discoverer: &SchemaDiscoverer,
    runner: &R,
    log: &LogContext,
) -> Result<(), TaskError>
where
    R: ProcessRunner + ?Sized,
{
    log.scope(async {
        run_linters(config, discoverer, runner)
            .instrument(info_span!("lint"))
            .await
    })
    .await
}

async fn run_linters<R>(
    config: &LintConfig,
    discoverer: &SchemaDiscoverer,
    runner: &R,
) -> Result<(), TaskError>
where
    R: ProcessRunner + ?Sized,
{
    let files = discoverer.discover()?;

    let api_linter = api_linter_invocation(config, &files);
    info!(args = ?api_linter.arg_strings(), "[LINT] Running api-linter");
    dispatch(runner, &api_linter).await?;

    let buf = buf_lint_invocation(config);
    info!("[LINT] Running buf lint");
    dispatch(runner, &buf).await?;

    info!("[LINT] All linters passed");
    Ok(())
}
