mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::commands::Outcome;
use crate::config::PartialAppConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use clap::Parser;
use tracing::{debug, error, info, warn};

fn main() {
    let cli = Cli::parse();
    let code = match run_app(cli) {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run_app(cli: Cli) -> Result<Outcome> {
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("🚀 foldqc v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let mut config = PartialAppConfig::load(cli.config.as_deref())?;
    config.apply_set_values(&cli.set_values)?;

    let progress = if cli.quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };

    let command_result = match cli.command {
        Commands::Predict(args) => {
            info!("Dispatching to 'predict' command.");
            commands::predict::run(args, &config, progress)
        }
        Commands::Qc(args) => {
            info!("Dispatching to 'qc' command.");
            commands::qc::run(args, &config, progress)
        }
        Commands::Scan(args) => {
            info!("Dispatching to 'scan' command.");
            commands::scan::run(args, &config)
        }
        Commands::Metrics(args) => {
            info!("Dispatching to 'metrics' command.");
            commands::metrics::run(args, &config)
        }
    };

    match &command_result {
        Ok(Outcome::Completed) => info!("✅ Command completed successfully."),
        Ok(outcome) => warn!("Command finished with outcome {:?}.", outcome),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
