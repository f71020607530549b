//! `drivewatch watch` – run the change monitor.

use anyhow::Result;
use drivewatch_core::config::WatchConfig;
use drivewatch_core::monitor::ChangeMonitor;

use super::{downloader, extractor};

pub fn run_watch(cfg: &WatchConfig, once: bool) -> Result<()> {
    cfg.validate()?;
    cfg.ensure_destination()?;

    let mut monitor = ChangeMonitor::new(
        extractor(cfg),
        downloader(cfg)?,
        &cfg.destination_dir,
        cfg.poll_interval(),
    );
    monitor.run(once.then_some(1));

    if let Some(id) = monitor.state().last_file_id() {
        println!("Last downloaded file: {id}");
    }
    Ok(())
}
