use clap::Parser;
use proto_tasks::cli::{run, Cli};
use proto_tasks_core::logging::{LogContext, LogOptions};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let log = LogContext::new(LogOptions::from(cli.command.logging()));

    // `run` has already logged the failure as fatal.
    match run(cli, &log).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
