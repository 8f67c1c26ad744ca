use std::process::ExitCode;

use anyhow::{Context, Result};
use talkbanner_cli::{build_cli, connect, execute, logging, AppConfig, Args, Status};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let matches = build_cli().get_matches();

    let args = match Args::from_matches(&matches) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(args.log_level.as_deref());

    match run(args).await {
        Ok(status) => status.into(),
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<Status> {
    let config = AppConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    let wiki = connect(&config).await?;

    let mut stdout = std::io::stdout().lock();
    execute(wiki, config, &args.invocation, &mut stdout).await
}
