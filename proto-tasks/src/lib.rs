pub mod cli;
pub mod load_config;

pub use cli::{execute, execute_until, run, Cli, Commands};
