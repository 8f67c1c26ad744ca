//! Command line definition

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

/// Build the `talkbanner` command
#[must_use]
pub fn build_cli() -> Command {
    Command::new("talkbanner")
        .version(talkbanner_core::VERSION)
        .about("Adds a WikiProject banner to the talk pages of categorised articles")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log filter directive, e.g. `debug` or `talkbanner_core=trace`"),
        )
        .subcommand(
            Command::new("run")
                .about("Banner every eligible page under the seed categories")
                .arg(
                    Arg::new("category")
                        .long("category")
                        .action(ArgAction::Append)
                        .help("Seed category; replaces the configured list when given"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Evaluate and log edits without saving them"),
                )
                .arg(
                    Arg::new("max-concurrent")
                        .long("max-concurrent")
                        .value_parser(value_parser!(usize))
                        .help("Maximum pages processed at once"),
                ),
        )
        .subcommand(
            Command::new("closure")
                .about("List the talk pages reachable from a category")
                .arg(Arg::new("category").required(true)),
        )
        .subcommand(
            Command::new("check")
                .about("Show the eligibility breakdown for one talk page")
                .arg(Arg::new("page").required(true)),
        )
}
