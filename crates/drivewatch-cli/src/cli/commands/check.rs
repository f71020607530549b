//! `drivewatch check` – read the current link once.

use anyhow::Result;
use drivewatch_core::config::WatchConfig;

use super::extractor;

pub fn run_check(cfg: &WatchConfig) -> Result<()> {
    cfg.validate()?;
    let link = extractor(cfg).try_current_link()?;
    println!("{}  {}", link.file_id(), link.url());
    Ok(())
}
