use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::discover::SchemaDiscoverer;

/// Tool versions installed by `install-deps`, in installation order.
pub const DEFAULT_DEPENDENCIES: &[&str] = &[
    "github.com/bufbuild/buf/cmd/buf@v1.25.1",
    "github.com/googleapis/api-linter/cmd/api-linter@v1.55.2",
    "google.golang.org/protobuf/cmd/protoc-gen-go@v1.31.0",
];

/// Languages the schemas are test-built for, in order.
pub const DEFAULT_LANGUAGES: &[&str] = &["go", "java"];

/// Everything the orchestrators need to know about the project and its tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TasksConfig {
    /// Resolved at the CLI boundary, never read from the overrides file.
    #[serde(skip)]
    pub project_root: PathBuf,
    pub schemas: SchemaConfig,
    pub lint: LintConfig,
    pub build: BuildConfig,
    pub install: InstallConfig,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            schemas: SchemaConfig::default(),
            lint: LintConfig::default(),
            build: BuildConfig::default(),
            install: InstallConfig::default(),
        }
    }
}

impl TasksConfig {
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    /// Discoverer rooted at the schema directory of this project.
    pub fn discoverer(&self) -> SchemaDiscoverer {
        SchemaDiscoverer::new(
            self.project_root.join(&self.schemas.dir),
            self.schemas.extension.clone(),
        )
    }

    pub fn trace_loaded(&self) {
        info!(
            project_root = %self.project_root.display(),
            schema_dir = %self.schemas.dir.display(),
            languages = self.build.languages.len(),
            dependencies = self.install.dependencies.len(),
            "Loaded tasks config"
        );
        debug!(config = ?self, "Tasks config loaded (full debug)");
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    /// Directory holding the schema sources, relative to the project root.
    pub dir: PathBuf,
    /// File extension without the leading dot.
    pub extension: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("nexus"),
            extension: "proto".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LintConfig {
    pub api_linter: String,
    /// Passed verbatim to `--config`.
    pub api_linter_config: PathBuf,
    pub buf: String,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            api_linter: "api-linter".to_string(),
            api_linter_config: PathBuf::from("./api-linter.yaml"),
            buf: "buf".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub protoc: String,
    pub languages: Vec<TargetLanguage>,
    /// Parent directory for the temporary workspace; the system temp dir when unset.
    pub temp_root: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            protoc: "protoc".to_string(),
            languages: DEFAULT_LANGUAGES
                .iter()
                .map(|l| TargetLanguage(l.to_string()))
                .collect(),
            temp_root: None,
        }
    }
}

impl BuildConfig {
    pub fn temp_root(&self) -> Option<&Path> {
        self.temp_root.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallConfig {
    pub installer: String,
    pub dependencies: Vec<Dependency>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            installer: "go".to_string(),
            dependencies: DEFAULT_DEPENDENCIES
                .iter()
                .map(|d| Dependency::from_str(d))
                .collect::<Result<_, _>>()
                .expect("static dependency list"),
        }
    }
}

/// Rejected values in the tasks configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid dependency {0:?}: expected <module>@<version>")]
    InvalidDependency(String),
    #[error("invalid target language {0:?}: expected lowercase letters, digits or '_'")]
    InvalidLanguage(String),
}

/// A pinned tool, `module@version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dependency {
    module: String,
    version: String,
}

impl Dependency {
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl FromStr for Dependency {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('@') {
            Some((module, version)) if !module.is_empty() && !version.is_empty() => Ok(Self {
                module: module.to_string(),
                version: version.to_string(),
            }),
            _ => Err(ConfigError::InvalidDependency(s.to_string())),
        }
    }
}

impl TryFrom<String> for Dependency {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dependency> for String {
    fn from(dep: Dependency) -> Self {
        dep.to_string()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.module, self.version)
    }
}

fn language_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("static regex"))
}

/// A compiler output language, as in `--<lang>_out`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetLanguage(String);

impl TargetLanguage {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The compiler flag selecting this language's output directory.
    pub fn out_flag(&self) -> String {
        format!("--{}_out", self.0)
    }
}

impl FromStr for TargetLanguage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if language_pattern().is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ConfigError::InvalidLanguage(s.to_string()))
        }
    }
}

impl TryFrom<String> for TargetLanguage {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TargetLanguage> for String {
    fn from(lang: TargetLanguage) -> Self {
        lang.0
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
