use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use crossedge::adapter::inbound::cli::command::{Cli, Commands, ConfigCommand};
use crossedge::adapter::inbound::cli::{self, output};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let name = command_name(&cli);
    cli::execute(cli)
        .await
        .with_context(|| format!("crossedge {name} failed"))
}

fn command_name(cli: &Cli) -> &'static str {
    match cli.command {
        Commands::Migrate => "migrate",
        Commands::Ingest(_) => "ingest",
        Commands::Match => "match",
        Commands::Detect(_) => "detect",
        Commands::CloseExpired(_) => "close-expired",
        Commands::Opportunities(_) => "opportunities",
        Commands::Config(ConfigCommand::Show) => "config show",
        Commands::Config(ConfigCommand::Validate) => "config validate",
    }
}
