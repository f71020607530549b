//! `drivewatch config` – show where the configuration comes from and its values.

use anyhow::Result;
use drivewatch_core::config::{self, WatchConfig};
use std::path::Path;

pub fn run_config(cfg: &WatchConfig, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("# {}", path.display());
    print!("{}", cfg.to_toml_string()?);
    Ok(())
}
