use clap::Parser;
use drivewatch_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Initialize logging as early as possible; a broken state dir must not stop the watcher.
    if cli.log_stderr {
        logging::init_logging_stderr();
    } else if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", err);
    }

    if let Err(err) = cli.run() {
        tracing::error!("{:#}", err);
        eprintln!("drivewatch error: {:#}", err);
        std::process::exit(1);
    }
}
