mod args;
mod commands;
mod config;
mod render;

use std::process::ExitCode;

use clap::Parser;

use crate::args::Cli;
use crate::commands::App;
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so views stay pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "saveplate=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let mut app = App::open(config)?;
    match app.run(cli.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            app.report(&e);
            Ok(ExitCode::FAILURE)
        }
    }
}
