#![doc = "proto-tasks-core: discovery and orchestration logic for proto-tasks."]

//! This crate contains everything the `proto-tasks` command runs: locating schema
//! files, building invocations for the external linters, compiler and installer,
//! sequencing them fail-fast, and cleaning up the temporary build workspace.
//!
//! External tools are only ever reached through the [`contract::ProcessRunner`]
//! capability, so every orchestrator can be driven by a mock in tests.
//!
//! # Usage
//! Build a [`config::TasksConfig`], a [`logging::LogContext`] and a runner, then call
//! [`lint::lint`], [`verify::verify_build`] or [`install::install_deps`].

pub mod config;
pub mod contract;
pub mod discover;
pub mod error;
pub mod install;
pub mod lint;
pub mod logging;
pub mod runner;
pub mod verify;

pub use error::TaskError;
