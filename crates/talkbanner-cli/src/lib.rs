//! talkbanner command line
//!
//! Configuration loading, logging setup, login and the `run`, `closure`
//! and `check` subcommands.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;

pub use cli::build_cli;
pub use commands::{connect, execute, Args, Invocation, Status};
pub use config::{AppConfig, RunOverrides, PASSWORD_ENV};
