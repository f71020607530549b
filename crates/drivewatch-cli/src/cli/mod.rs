//! CLI for drivewatch.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use drivewatch_core::config::{self, WatchConfig};
use std::path::PathBuf;

use commands::{run_check, run_config, run_download, run_watch};

/// Top-level CLI for drivewatch.
#[derive(Debug, Parser)]
#[command(name = "drivewatch")]
#[command(about = "Watch a page for a new shared-drive file link and download it", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/drivewatch/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log to stderr instead of the state-dir log file.
    #[arg(long, global = true)]
    pub log_stderr: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Poll the source page and download each newly published file.
    Watch {
        /// Run a single cycle and exit.
        #[arg(long)]
        once: bool,
        /// Seconds between polls (overrides poll_interval_secs).
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
        /// Destination directory (overrides destination_dir).
        #[arg(long, value_name = "DIR")]
        dest: Option<PathBuf>,
        /// Page to watch (overrides source_url).
        #[arg(long, value_name = "URL")]
        source_url: Option<String>,
    },

    /// Read the current link once and print its direct-download URL.
    Check {
        /// Page to read (overrides source_url).
        #[arg(long, value_name = "URL")]
        source_url: Option<String>,
    },

    /// Download one direct-download URL (must contain `id=`).
    Download {
        url: String,
        /// Destination directory (overrides destination_dir).
        #[arg(long, value_name = "DIR")]
        dest: Option<PathBuf>,
    },

    /// Show the config file path and the effective configuration.
    Config,
}

impl Cli {
    fn load_config(&self) -> Result<WatchConfig> {
        match &self.config {
            Some(path) => config::load_from_path(path),
            None => config::load_or_init(),
        }
    }

    pub fn run(self) -> Result<()> {
        let mut cfg = self.load_config()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Watch {
                once,
                interval,
                dest,
                source_url,
            } => {
                if let Some(secs) = interval {
                    cfg.poll_interval_secs = secs;
                }
                if let Some(dest) = dest {
                    cfg.destination_dir = dest;
                }
                if let Some(url) = source_url {
                    cfg.source_url = url;
                }
                run_watch(&cfg, once)?;
            }
            CliCommand::Check { source_url } => {
                if let Some(url) = source_url {
                    cfg.source_url = url;
                }
                run_check(&cfg)?;
            }
            CliCommand::Download { url, dest } => {
                if let Some(dest) = dest {
                    cfg.destination_dir = dest;
                }
                run_download(&cfg, &url)?;
            }
            CliCommand::Config => run_config(&cfg, self.config.as_deref())?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
