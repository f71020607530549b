use anyhow::{Context, Result};
use crate::downloader::{DEFAULT_CHUNK_SIZE, DEFAULT_CONFIRM_MARKER};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Page watched when no config file sets `source_url`.
pub const DEFAULT_SOURCE_URL: &str =
    "https://epaperwave.com/hindustan-times-epaper-pdf-today/#google_vignette";

/// Href prefix of a shared-drive file link on the source page.
pub const DEFAULT_LINK_PATTERN: &str = "https://drive.google.com/file/d/";

/// Browser launch parameters (optional `[browser]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run Chromium without a window.
    pub headless: bool,
    /// Keep the Chromium sandbox on. Off by default so it runs in containers.
    pub sandbox: bool,
    /// Extra command-line switches passed to Chromium (e.g. "--disable-gpu").
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: false,
            args: vec![
                "--disable-dev-shm-usage".to_string(),
                "--disable-gpu".to_string(),
            ],
        }
    }
}

/// HTTP transfer parameters (optional `[http]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    /// Upper bound for a whole transfer, including the confirmation request.
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 3600,
            user_agent: None,
        }
    }
}

/// Global configuration loaded from `~/.config/drivewatch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Page that publishes the daily link.
    pub source_url: String,
    /// Directory new files are written to; created at startup if missing.
    pub destination_dir: PathBuf,
    /// Seconds to sleep between two polling cycles.
    pub poll_interval_secs: u64,
    /// Seconds to wait for the link element to become visible and clickable.
    pub element_wait_secs: u64,
    /// Href substring identifying the link element.
    #[serde(default = "default_link_pattern")]
    pub link_pattern: String,
    /// Substring that marks a "confirm download" interstitial page.
    #[serde(default = "default_confirm_marker")]
    pub confirm_marker: String,
    /// Write chunk size in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default)]
    pub browser: Option<BrowserConfig>,
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

fn default_link_pattern() -> String {
    DEFAULT_LINK_PATTERN.to_string()
}

fn default_confirm_marker() -> String {
    DEFAULT_CONFIRM_MARKER.to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            destination_dir: PathBuf::from("./downloaded_pdfs"),
            poll_interval_secs: 300,
            element_wait_secs: 60,
            link_pattern: default_link_pattern(),
            confirm_marker: default_confirm_marker(),
            chunk_size: default_chunk_size(),
            browser: None,
            http: None,
        }
    }
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn element_wait(&self) -> Duration {
        Duration::from_secs(self.element_wait_secs)
    }

    pub fn browser(&self) -> BrowserConfig {
        self.browser.clone().unwrap_or_default()
    }

    pub fn http(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }

    /// Reject values the monitor cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.source_url.trim().is_empty() {
            anyhow::bail!("source_url must not be empty");
        }
        if self.link_pattern.trim().is_empty() {
            anyhow::bail!("link_pattern must not be empty");
        }
        if self.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be at least 1");
        }
        if self.element_wait_secs == 0 {
            anyhow::bail!("element_wait_secs must be at least 1");
        }
        if self.chunk_size == 0 {
            anyhow::bail!("chunk_size must be at least 1");
        }
        Ok(())
    }

    /// Serialize as the TOML written to the config file.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Create the destination directory if it does not exist yet.
    pub fn ensure_destination(&self) -> Result<()> {
        fs::create_dir_all(&self.destination_dir).with_context(|| {
            format!(
                "failed to create destination directory {}",
                self.destination_dir.display()
            )
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("drivewatch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<WatchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = WatchConfig::default();
        let toml = default_cfg.to_toml_string()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load configuration from an explicit file (e.g. `--config`).
pub fn load_from_path(path: &Path) -> Result<WatchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: WatchConfig = toml::from_str(&data)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(cfg)
}
