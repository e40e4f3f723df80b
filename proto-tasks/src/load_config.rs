/// `load_config` module: resolves the project root and loads the optional task overrides file
/// into the core [`TasksConfig`].
///
/// # Responsibilities
/// - Pick the project root: `PROTO_TASKS_ROOT` when set, otherwise the repository this tool
///   lives in.
/// - Read `<project_root>/proto-tasks.yaml` if it exists and layer it over the built-in defaults.
/// - Fail with a clear diagnostic before any tool runs when the overrides file is unreadable
///   or invalid.
///
/// Commands never take paths from the command line; everything is rooted here.
use anyhow::{Context, Result};
use proto_tasks_core::config::TasksConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Environment variable overriding the project root.
pub const ROOT_ENV: &str = "PROTO_TASKS_ROOT";

/// Name of the optional overrides file at the project root.
pub const CONFIG_FILE: &str = "proto-tasks.yaml";

/// The repository containing this crate.
pub fn default_project_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// `PROTO_TASKS_ROOT` if set and non-empty, else [`default_project_root`]; made absolute.
pub fn resolve_project_root() -> Result<PathBuf> {
    let root = match std::env::var_os(ROOT_ENV) {
        Some(value) if !value.is_empty() => {
            info!(env = ROOT_ENV, root = ?value, "Using project root from environment");
            PathBuf::from(value)
        }
        _ => default_project_root(),
    };
    std::path::absolute(&root)
        .with_context(|| format!("Failed to resolve project root {}", root.display()))
}

/// Loads the configuration for `project_root`, defaults plus the overrides file if present.
pub fn load_config<P: AsRef<Path>>(project_root: P) -> Result<TasksConfig> {
    let project_root = project_root.as_ref();
    let config_path = project_root.join(CONFIG_FILE);

    let config = if config_path.exists() {
        info!(config_path = ?config_path, "Loading task overrides from file");
        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) => {
                error!(error = ?e, config_path = ?config_path, "Failed to read config file");
                return Err(anyhow::anyhow!(
                    "Failed to read config file {:?}: {}",
                    config_path,
                    e
                ));
            }
        };
        match serde_yaml::from_str::<TasksConfig>(&content) {
            Ok(conf) => conf,
            Err(e) => {
                error!(error = ?e, config_path = ?config_path, "Failed to parse config YAML");
                return Err(anyhow::anyhow!(
                    "Failed to parse config YAML {:?}: {e}",
                    config_path
                ));
            }
        }
    } else {
        info!(config_path = ?config_path, "No overrides file, using built-in defaults");
        TasksConfig::default()
    };

    let config = config.with_project_root(project_root);
    config.trace_loaded();
    Ok(config)
}
