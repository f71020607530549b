//! File download: fetch a direct-download URL and write it to
//! `<dest>/<file id>.pdf`, passing through a large-file confirmation page
//! when the first response is one.

mod confirm;
mod writer;

pub use confirm::{confirmation_url, needs_confirmation, MARKER_SCAN_BYTES};
pub use writer::{temp_path, ChunkWriter, TEMP_SUFFIX};

use crate::link::is_valid_file_id;
use crate::transfer::{TransferClient, TransferError, TransferResponse};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default write chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default marker text of the confirmation interstitial.
pub const DEFAULT_CONFIRM_MARKER: &str = "Confirm";

const FILE_EXTENSION: &str = ".pdf";

#[derive(Debug, Error)]
pub enum DownloadError {
    /// The URL has no usable `id=` value to name the file after.
    #[error("no file id in URL: {0}")]
    BadUrl(String),
    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),
    #[error("HTTP status {0}")]
    Status(u32),
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

impl DownloadError {
    pub fn status(&self) -> Option<u32> {
        match self {
            DownloadError::Status(code) => Some(*code),
            _ => None,
        }
    }
}

/// Everything after the last `id=` of a direct-download URL.
///
/// Rejects values that would escape the destination directory.
pub fn file_id_from_direct_url(url: &str) -> Result<&str, DownloadError> {
    let (_, id) = url
        .rsplit_once("id=")
        .ok_or_else(|| DownloadError::BadUrl(url.to_string()))?;
    if !is_valid_file_id(id) {
        return Err(DownloadError::BadUrl(url.to_string()));
    }
    Ok(id)
}

/// File name a direct-download URL is saved under: `<id>.pdf`.
pub fn target_file_name(url: &str) -> Result<String, DownloadError> {
    Ok(format!("{}{}", file_id_from_direct_url(url)?, FILE_EXTENSION))
}

pub struct FileDownloader<T> {
    client: T,
    chunk_size: usize,
    confirm_marker: String,
}

impl<T: TransferClient> FileDownloader<T> {
    pub fn new(client: T) -> Self {
        Self {
            client,
            chunk_size: DEFAULT_CHUNK_SIZE,
            confirm_marker: DEFAULT_CONFIRM_MARKER.to_string(),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_confirm_marker(mut self, marker: &str) -> Self {
        self.confirm_marker = marker.to_string();
        self
    }

    pub fn client(&self) -> &T {
        &self.client
    }

    /// Download `direct_url` into `dest_dir` (which must exist).
    /// Returns the path of the written file.
    pub fn download(&mut self, direct_url: &str, dest_dir: &Path) -> Result<PathBuf, DownloadError> {
        let file_name = target_file_name(direct_url)?;
        let final_path = dest_dir.join(file_name);

        let (mut response, mut attempt) = self.fetch_to_part(direct_url, &final_path)?;
        let confirm_url = {
            let head = String::from_utf8_lossy(&attempt.head);
            needs_confirmation(&head, &self.confirm_marker)
                .then(|| confirmation_url(&response.final_url, &head))
        };
        if let Some(confirm_url) = confirm_url {
            tracing::info!(
                url = %confirm_url,
                marker = %self.confirm_marker,
                "download requires confirmation, requesting again"
            );
            attempt.writer.discard();
            (response, attempt) = self.fetch_to_part(&confirm_url, &final_path)?;
        }

        if !response.is_success() {
            attempt.writer.discard();
            return Err(DownloadError::Status(response.status));
        }

        let written = attempt.writer.finalize(&final_path)?;
        tracing::info!(path = %final_path.display(), bytes = written, "file downloaded");
        Ok(final_path)
    }

    /// Stream one GET into the `.part` file of `final_path`, keeping the
    /// first `MARKER_SCAN_BYTES` for the interstitial check.
    fn fetch_to_part(
        &mut self,
        url: &str,
        final_path: &Path,
    ) -> Result<(TransferResponse, PartialDownload), DownloadError> {
        let mut writer = ChunkWriter::create(final_path, self.chunk_size)?;
        let mut head = Vec::new();
        let result = self.client.get(url, &mut |data: &[u8]| {
            let keep = MARKER_SCAN_BYTES.saturating_sub(head.len()).min(data.len());
            head.extend_from_slice(&data[..keep]);
            writer.write(data)
        });
        match result {
            Ok(response) => Ok((response, PartialDownload { writer, head })),
            Err(e) => {
                writer.discard();
                Err(match e {
                    TransferError::Sink(io) => DownloadError::Io(io),
                    other => DownloadError::Transfer(other),
                })
            }
        }
    }
}

/// Body of one GET on its way to disk.
struct PartialDownload {
    writer: ChunkWriter,
    /// Start of the body, for marker detection.
    head: Vec<u8>,
}
