//! Command-line adapter.

pub mod catalog;
pub mod command;
pub mod config;
pub mod context;
pub mod database;
pub mod detect;
pub mod opportunities;
pub mod output;
pub mod paths;

use command::{Cli, Commands, ConfigCommand};
use output::OutputConfig;

use crate::error::Result;

/// Configure output and logging, then run the selected command.
///
/// # Errors
/// Returns the command's error; the caller reports it and sets the exit code.
pub async fn execute(cli: Cli) -> Result<()> {
    let output_config = OutputConfig::new(cli.json, cli.quiet, cli.verbose);
    output::configure(output_config);

    let settings = context::load_config(cli.config.as_deref())?;
    match output_config.log_level() {
        Some(level) => settings.logging.init_with_level(level),
        None => settings.init_logging(),
    }

    match cli.command {
        Commands::Migrate => database::execute_migrate(&settings),
        Commands::Ingest(args) => catalog::execute_ingest(&settings, &args.file).await,
        Commands::Match => catalog::execute_match(&settings).await,
        Commands::Detect(args) => detect::execute(&settings, &args).await,
        Commands::CloseExpired(args) => catalog::execute_close_expired(&settings, args.today).await,
        Commands::Opportunities(args) => opportunities::execute(&settings, args.limit).await,
        Commands::Config(ConfigCommand::Show) => config::execute_show(&settings),
        Commands::Config(ConfigCommand::Validate) => config::execute_validate(&settings),
    }
}
