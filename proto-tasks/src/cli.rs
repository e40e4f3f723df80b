///
/// This module implements the CLI interface for proto-tasks: command parsing, the shared
/// logging flags, and dispatch to the orchestrators.
///
/// All discovery and orchestration logic lives in the [`proto-tasks-core`] crate.
/// This module is strictly CLI glue: building the logger, loading configuration,
/// racing the selected task against Ctrl-C and logging fatal errors.
///
/// ## How To Use
/// - For command-line users: `proto-tasks <lint|test|install-deps> [--log-level ..] [--log-format ..]`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`], or
///   [`execute`] with an explicit config, runner and log context.
///
/// [`proto-tasks-core`]: ../../proto-tasks-core/
use crate::load_config::{load_config, resolve_project_root};
use anyhow::Result;
use std::future::Future;
use clap::{Args, Parser, Subcommand};
use proto_tasks_core::config::TasksConfig;
use proto_tasks_core::contract::ProcessRunner;
use proto_tasks_core::logging::{LogContext, LogFormat, LogOptions};
use proto_tasks_core::runner::SystemRunner;
use proto_tasks_core::{install, lint, verify, TaskError};
use tracing_subscriber::filter::LevelFilter;

/// Scripts for linting, test-building and bootstrapping the protocol-schema repository.
#[derive(Debug, Parser)]
#[clap(
    name = "proto-tasks",
    version,
    about = "Scripts for the Nexus API protocol-schema repository"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Lint proto files with api-linter and buf
    Lint {
        #[clap(flatten)]
        logging: LoggingArgs,
    },
    /// Test build proto files for every target language
    Test {
        #[clap(flatten)]
        logging: LoggingArgs,
    },
    /// Install tool dependencies
    InstallDeps {
        #[clap(flatten)]
        logging: LoggingArgs,
    },
}

impl Commands {
    pub fn logging(&self) -> &LoggingArgs {
        match self {
            Commands::Lint { logging }
            | Commands::Test { logging }
            | Commands::InstallDeps { logging } => logging,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Commands::Lint { .. } => "lint",
            Commands::Test { .. } => "test",
            Commands::InstallDeps { .. } => "install-deps",
        }
    }
}

/// Logging flags accepted by every command.
#[derive(Debug, Clone, Args)]
pub struct LoggingArgs {
    /// Minimum level to log (off, error, warn, info, debug, trace)
    #[clap(long, default_value = "info")]
    pub log_level: LevelFilter,
    /// Log output format (text or json)
    #[clap(long, default_value = "text")]
    pub log_format: LogFormat,
}

impl Default for LoggingArgs {
    fn default() -> Self {
        let options = LogOptions::default();
        Self {
            log_level: options.level,
            log_format: options.format,
        }
    }
}

impl From<&LoggingArgs> for LogOptions {
    fn from(args: &LoggingArgs) -> Self {
        LogOptions {
            level: args.log_level,
            format: args.log_format,
        }
    }
}

/// Runs one command against an explicit configuration, runner and logger.
pub async fn execute<R>(
    command: &Commands,
    config: &TasksConfig,
    runner: &R,
    log: &LogContext,
) -> Result<(), TaskError>
where
    R: ProcessRunner + ?Sized,
{
    match command {
        Commands::Lint { .. } => lint::lint(&config.lint, &config.discoverer(), runner, log).await,
        Commands::Test { .. } => {
            verify::verify_build(
                &config.build,
                &config.project_root,
                &config.discoverer(),
                runner,
                log,
            )
            .await
        }
        Commands::InstallDeps { .. } => install::install_deps(&config.install, runner, log).await,
    }
}

/// Runs one command like [`execute`], abandoning it as soon as `cancel` resolves.
///
/// Abandoning drops the in-flight task: running tools are killed and any build
/// workspace is removed before [`TaskError::Interrupted`] is returned.
pub async fn execute_until<R, C>(
    command: &Commands,
    config: &TasksConfig,
    runner: &R,
    log: &LogContext,
    cancel: C,
) -> Result<(), TaskError>
where
    R: ProcessRunner + ?Sized,
    C: Future<Output = ()>,
{
    tokio::select! {
        result = execute(command, config, runner, log) => result,
        _ = cancel => {
            log.in_scope(|| tracing::warn!(command = command.name(), "Interrupted"));
            Err(TaskError::Interrupted)
        }
    }
}

/// Resolves when the process receives Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for interrupts");
        std::future::pending::<()>().await;
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
///
/// Errors are logged as fatal through `log` before being returned; the caller only
/// has to map them to an exit status.
pub async fn run(cli: Cli, log: &LogContext) -> Result<()> {
    let command = cli.command.name();
    log.in_scope(|| tracing::info!(command, "trace_initialised"));

    let result = run_command(&cli.command, log).await;

    if let Err(e) = &result {
        log.in_scope(|| tracing::error!(command, error = %format!("{e:#}"), "Fatal error"));
    }
    result
}

async fn run_command(command: &Commands, log: &LogContext) -> Result<()> {
    let config = log.in_scope(|| resolve_project_root().and_then(load_config))?;
    let runner = SystemRunner::default();

    execute_until(command, &config, &runner, log, log.scope(interrupted()))
        .await
        .map_err(anyhow::Error::from)
}
