// Basher - Host Reconnaissance
//
// Walks a fixed sequence of read-only discovery checks on the current host,
// printing each under a banner, with an optional root-password step and an
// optional history wipe at the end.

mod checks;
mod cli;
mod config;
mod console;
mod credentials;
mod error;
mod exec;
mod logger;
mod runner;
mod safety;
mod utils;

use checks::CheckContext;
use clap::Parser;
use cli::{Cli, Commands};
use config::{load_config, HostProfile, ReconConfig};
use console::{Console, TerminalPrompter};
use error::ReconError;
use log::{error, info};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The config is read first so its log level can shape the logger.
    let config = match cli.command {
        Some(Commands::List) => None,
        None => match load_config(cli.config.as_deref()) {
            Ok(config) => Some(config),
            Err(e) => {
                logger::init_logger(cli.debug, None);
                error!("Basher failed: {e}");
                process::exit(1);
            }
        },
    };

    logger::init_logger(cli.debug, config.as_ref().and_then(|c| c.log_level.as_deref()));

    info!("Starting Basher v{}", env!("CARGO_PKG_VERSION"));

    match run_command(cli, config).await {
        Ok(_) => {
            info!("Basher v{} completed", env!("CARGO_PKG_VERSION"));
            process::exit(0);
        }
        Err(e) => {
            error!("Basher failed: {e}");
            process::exit(1);
        }
    }
}

async fn run_command(cli: Cli, config: Option<ReconConfig>) -> Result<(), ReconError> {
    match (cli.command, config) {
        (Some(Commands::List), _) => runner::list_checks(),
        (None, None) => Err(ReconError::Config("no configuration loaded".to_string())),
        (None, Some(mut config)) => {
            if let Some(endpoint) = cli.ip_endpoint {
                config.ip_endpoint = endpoint;
            }

            safety::check_environment(&config).await;

            let mut ctx = CheckContext {
                host: HostProfile::from_env(),
                config,
                console: Console::stdout(),
                prompter: Box::new(TerminalPrompter),
                dry_run: cli.dry_run,
            };
            runner::run_recon(&mut ctx).await?;
            Ok(())
        }
    }
}
