//! CLI command handlers, one per file.

mod check;
mod config;
mod download;
mod watch;

pub use check::run_check;
pub use config::run_config;
pub use download::run_download;
pub use watch::run_watch;

use anyhow::{Context, Result};
use drivewatch_core::config::WatchConfig;
use drivewatch_core::downloader::FileDownloader;
use drivewatch_core::link::{ChromePageFetcher, LinkExtractor};
use drivewatch_core::transfer::CurlTransferClient;

fn extractor(cfg: &WatchConfig) -> LinkExtractor<ChromePageFetcher> {
    LinkExtractor::new(
        ChromePageFetcher::new(cfg.browser()),
        &cfg.source_url,
        &cfg.link_pattern,
        cfg.element_wait(),
    )
}

fn downloader(cfg: &WatchConfig) -> Result<FileDownloader<CurlTransferClient>> {
    let client = CurlTransferClient::new(&cfg.http()).context("failed to set up HTTP client")?;
    Ok(FileDownloader::new(client)
        .with_chunk_size(cfg.chunk_size)
        .with_confirm_marker(&cfg.confirm_marker))
}
