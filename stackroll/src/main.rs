//! stackroll - Entry Point
//!
//! Rolls a Portainer stack to a new image and waits for its containers to
//! report healthy, restoring the previous stack file when they do not.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use stackroll::app::options::{AppOptions, Cli};
use stackroll::app::render::render;
use stackroll::app::run::run;
use stackroll::logs::init_logging;
use stackroll::utils::version_info;

/// Exit status of runs that stopped before anything was submitted
const SETUP_FAILURE: u8 = 4;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Print version and exit
    if cli.version {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{}", version),
            Err(e) => eprintln!("{}", e),
        }
        return ExitCode::SUCCESS;
    }

    // Merge the settings file and the command line
    let options = match AppOptions::load(cli).await {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::from(SETUP_FAILURE);
        }
    };

    // Initialize logging
    if let Err(e) = init_logging(&options.logging) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!("stackroll {} deploying {}", version_info().version, options.target.stack);
    match run(&options).await {
        Ok(summary) => {
            render(&summary);
            ExitCode::from(summary.report.outcome.exit_code())
        }
        Err(e) => {
            error!("Deployment aborted before any change: {}", e);
            ExitCode::from(SETUP_FAILURE)
        }
    }
}
