//! Change monitor: poll the source page, download a file only when its
//! identifier differs from the last one written to disk.
//!
//! One cycle runs to completion before the next begins; between cycles the
//! thread sleeps. Nothing here is shared or global: the state lives in the
//! `ChangeMonitor` value and the capabilities are injected.

use crate::downloader::FileDownloader;
use crate::link::{LinkExtractor, PageFetcher};
use crate::transfer::TransferClient;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Identifier of the most recent file actually written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorState {
    last_file_id: Option<String>,
}

impl MonitorState {
    pub fn last_file_id(&self) -> Option<&str> {
        self.last_file_id.as_deref()
    }
}

/// What one polling cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The link could not be read; state unchanged.
    FetchFailed,
    /// Same identifier as the last download; nothing to do.
    Unchanged { file_id: String },
    /// A new file was written.
    Downloaded { file_id: String, path: PathBuf },
    /// A new identifier was seen but the download failed; it is retried next cycle.
    DownloadFailed { file_id: String },
}

pub struct ChangeMonitor<F, T> {
    extractor: LinkExtractor<F>,
    downloader: FileDownloader<T>,
    destination_dir: PathBuf,
    poll_interval: Duration,
    state: MonitorState,
}

impl<F: PageFetcher, T: TransferClient> ChangeMonitor<F, T> {
    pub fn new(
        extractor: LinkExtractor<F>,
        downloader: FileDownloader<T>,
        destination_dir: &Path,
        poll_interval: Duration,
    ) -> Self {
        Self {
            extractor,
            downloader,
            destination_dir: destination_dir.to_path_buf(),
            poll_interval,
            state: MonitorState::default(),
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn downloader(&self) -> &FileDownloader<T> {
        &self.downloader
    }

    /// Run a single extract / compare / download cycle.
    pub fn poll_once(&mut self) -> CycleOutcome {
        let Some(link) = self.extractor.current_link() else {
            return CycleOutcome::FetchFailed;
        };
        let file_id = link.file_id().to_string();

        if self.state.last_file_id() == Some(file_id.as_str()) {
            tracing::info!(file_id = %file_id, "no new file published");
            return CycleOutcome::Unchanged { file_id };
        }

        tracing::info!(file_id = %file_id, url = %link, "new file found");
        match self.downloader.download(link.url(), &self.destination_dir) {
            Ok(path) => {
                self.state.last_file_id = Some(file_id.clone());
                CycleOutcome::Downloaded { file_id, path }
            }
            Err(e) => {
                tracing::error!(file_id = %file_id, "download failed: {}", e);
                CycleOutcome::DownloadFailed { file_id }
            }
        }
    }

    /// Poll, sleep, repeat. `None` runs until the process is terminated;
    /// `Some(n)` stops after `n` cycles without sleeping after the last one.
    pub fn run(&mut self, max_cycles: Option<u64>) {
        tracing::info!(
            source = %self.extractor.source_url(),
            dest = %self.destination_dir.display(),
            interval_secs = self.poll_interval.as_secs(),
            "monitor started"
        );
        let mut cycle = 0u64;
        loop {
            cycle += 1;
            let outcome = self.poll_once();
            tracing::debug!(cycle, ?outcome, "cycle finished");
            if max_cycles.is_some_and(|max| cycle >= max) {
                break;
            }
            std::thread::sleep(self.poll_interval);
        }
    }
}
