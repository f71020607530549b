//! `drivewatch download <url>` – fetch one direct-download URL.

use anyhow::Result;
use drivewatch_core::config::WatchConfig;

use super::downloader;

pub fn run_download(cfg: &WatchConfig, url: &str) -> Result<()> {
    cfg.ensure_destination()?;
    let path = downloader(cfg)?.download(url, &cfg.destination_dir)?;
    println!("Saved {}", path.display());
    Ok(())
}
