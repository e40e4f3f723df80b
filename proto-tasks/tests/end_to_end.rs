// End-to-end command scenarios driven through `execute` with a mocked process runner,
// so no real linter, compiler or installer is needed.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use proto_tasks::cli::{execute, execute_until, Commands, LoggingArgs};
use proto_tasks::load_config::load_config;
use proto_tasks_core::contract::{MockProcessRunner, ProcessRunner, ToolInvocation, ToolStatus};
use proto_tasks_core::logging::LogContext;
use proto_tasks_core::TaskError;
use tempfile::{tempdir, TempDir};

type Calls = Arc<Mutex<Vec<ToolInvocation>>>;

fn recording_runner(statuses: Vec<ToolStatus>) -> (MockProcessRunner, Calls) {
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = calls.clone();
    let mut runner = MockProcessRunner::new();
    runner
        .expect_run()
        .times(statuses.len())
        .returning(move |inv: &ToolInvocation| {
            let mut calls = recorded.lock().unwrap();
            calls.push(inv.clone());
            Ok(statuses[calls.len() - 1])
        });
    (runner, calls)
}

/// A tool that starts but never exits, remembering the output dir it was given.
#[derive(Default)]
struct StuckRunner {
    out_dirs: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl ProcessRunner for StuckRunner {
    async fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolStatus> {
        self.out_dirs
            .lock()
            .unwrap()
            .push(PathBuf::from(&invocation.args[2]));
        std::future::pending().await
    }
}

/// A project with two schema files and one unrelated file.
fn project(extra_yaml: &str) -> TempDir {
    let project = tempdir().expect("temp dir");
    let nexus = project.path().join("nexus/v1");
    fs::create_dir_all(&nexus).unwrap();
    fs::write(nexus.join("payments.proto"), b"syntax = \"proto3\";\n").unwrap();
    fs::write(nexus.join("accounts.proto"), b"syntax = \"proto3\";\n").unwrap();
    fs::write(nexus.join("NOTES.md"), b"# notes\n").unwrap();
    if !extra_yaml.is_empty() {
        fs::write(project.path().join("proto-tasks.yaml"), extra_yaml).unwrap();
    }
    project
}

#[tokio::test]
async fn discovery_sees_exactly_the_two_schemas() {
    let project = project("");
    let config = load_config(project.path()).unwrap();

    let files = config.discoverer().discover().unwrap();

    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["accounts.proto", "payments.proto"]);
}

#[tokio::test]
async fn test_command_succeeds_and_leaves_no_temp_dirs() {
    let temp_root = tempdir().expect("temp dir");
    let project = project(&format!(
        "build:\n  languages: [go, java]\n  temp_root: {:?}\n",
        temp_root.path()
    ));
    let config = load_config(project.path()).unwrap();
    let (runner, calls) = recording_runner(vec![ToolStatus::Success, ToolStatus::Success]);

    let result = execute(
        &Commands::Test {
            logging: LoggingArgs::default(),
        },
        &config,
        &runner,
        &LogContext::disabled(),
    )
    .await;

    assert!(result.is_ok(), "test command should succeed: {result:?}");
    let calls = calls.lock().unwrap();
    let out_flags: Vec<String> = calls.iter().map(|c| c.arg_strings()[1].clone()).collect();
    assert_eq!(out_flags, vec!["--go_out", "--java_out"]);
    assert!(calls.iter().all(|c| c.program == "protoc"));
    assert!(
        fs::read_dir(temp_root.path()).unwrap().next().is_none(),
        "temporary build workspace should be gone"
    );
}

#[tokio::test]
async fn lint_command_stops_when_api_linter_fails() {
    let project = project("");
    let config = load_config(project.path()).unwrap();
    let (runner, calls) = recording_runner(vec![ToolStatus::Failed(Some(1))]);

    let err = execute(
        &Commands::Lint {
            logging: LoggingArgs::default(),
        },
        &config,
        &runner,
        &LogContext::disabled(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, TaskError::ToolFailed { ref tool, .. } if tool == "api-linter"));
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(!calls.iter().any(|c| c.program == "buf"));
}

#[tokio::test]
async fn install_deps_command_uses_pinned_list() {
    let project = project("");
    let config = load_config(project.path()).unwrap();
    let (runner, calls) = recording_runner(vec![ToolStatus::Success; 3]);

    execute(
        &Commands::InstallDeps {
            logging: LoggingArgs::default(),
        },
        &config,
        &runner,
        &LogContext::disabled(),
    )
    .await
    .unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(
        calls[1].to_string(),
        "go install github.com/googleapis/api-linter/cmd/api-linter@v1.55.2"
    );
}

#[tokio::test]
async fn interrupted_test_command_fails_and_removes_workspace() {
    let temp_root = tempdir().expect("temp dir");
    let project = project(&format!("build:\n  temp_root: {:?}\n", temp_root.path()));
    let config = load_config(project.path()).unwrap();
    let runner = StuckRunner::default();

    let err = execute_until(
        &Commands::Test {
            logging: LoggingArgs::default(),
        },
        &config,
        &runner,
        &LogContext::disabled(),
        tokio::time::sleep(std::time::Duration::from_millis(100)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, TaskError::Interrupted), "unexpected error {err:?}");
    let out_dirs = runner.out_dirs.lock().unwrap();
    assert_eq!(out_dirs.len(), 1, "protoc should have been started once");
    assert!(!out_dirs[0].exists());
    assert!(
        fs::read_dir(temp_root.path()).unwrap().next().is_none(),
        "temporary build workspace should be gone"
    );
}

#[tokio::test]
async fn finished_command_ignores_later_cancel() {
    let project = project("");
    let config = load_config(project.path()).unwrap();
    let (runner, calls) = recording_runner(vec![ToolStatus::Success; 2]);

    execute_until(
        &Commands::Lint {
            logging: LoggingArgs::default(),
        },
        &config,
        &runner,
        &LogContext::disabled(),
        std::future::pending(),
    )
    .await
    .unwrap();

    assert_eq!(calls.lock().unwrap().len(), 2);
}
