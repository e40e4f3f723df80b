use tracing::{info, info_span, Instrument};

use crate::config::{Dependency, InstallConfig};
use crate::contract::{ProcessRunner, ToolInvocation};
use crate::error::TaskError;
use crate::logging::LogContext;
use crate::runner::dispatch;

/// `<installer> install <module@version>`
pub fn install_invocation(config: &InstallConfig, dep: &Dependency) -> ToolInvocation {
    ToolInvocation::new(&config.installer)
        .arg("install")
        .arg(dep.to_string())
}

/// Installs every pinned dependency in list order, one at a time.
///
/// Stops at the first failed install; later entries are never attempted. There are
/// no retries, and re-running relies on the installer itself being idempotent.
pub async fn install_deps<R>(
    config: &InstallConfig,
    runner: &R,
    log: &LogContext,
) -> Result<(), TaskError>
where
    R: ProcessRunner + ?Sized,
{
    log.scope(async {
        async {
            for dep in &config.dependencies {
                info!(dep = %dep, "Installing dependency");
                dispatch(runner, &install_invocation(config, dep)).await?;
            }
            info!(count = config.dependencies.len(), "All dependencies installed");
            Ok::<(), TaskError>(())
        }
        .instrument(info_span!("install_deps"))
        .await
    })
    .await
}
