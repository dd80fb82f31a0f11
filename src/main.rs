//! audioflow CLI
//!
//! Command-line front end for running effect chains over audio files.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use audioflow::cli::{commands, Cli, Commands};
use audioflow::{Config, Session};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("audioflow v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    config.apply_env()?;

    let Some(command) = cli.command else {
        println!("audioflow v{}", env!("CARGO_PKG_VERSION"));
        println!("Use --help for available commands");
        return Ok(());
    };

    let session = Session::native(&config).context("failed to start the processing engine")?;
    let outcome = handle_command(&session, command);
    session.quit()?;
    outcome
}

fn handle_command(session: &Session, cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Sox { args } => {
            commands::sox(session, &args).context("sox command failed")?;
        }
        Commands::Info { path } => commands::info(session, &path)?,
        Commands::Effects => commands::effects(session)?,
        Commands::Run {
            input,
            output,
            chain,
            precision,
        } => {
            commands::run(session, &input, &output, &chain, precision)
                .with_context(|| format!("failed to process {}", input.display()))?;
        }
    }
    Ok(())
}
