//! Link extraction: find the newest shared-file link on the source page and
//! turn it into a direct-download link.
//!
//! Rendering is delegated to a [`PageFetcher`]; this module only knows how
//! to parse a sharing URL and how to report a failed fetch.

mod chrome;
mod fetcher;

pub use chrome::ChromePageFetcher;
pub use fetcher::{FetchError, PageFetcher};

use std::fmt;
use std::time::Duration;

/// Base of the direct-download endpoint; the file identifier is appended.
pub const DIRECT_DOWNLOAD_BASE: &str = "https://drive.google.com/uc?export=download&id=";

const FILE_PATH_MARKER: &str = "/d/";

/// A direct-download URL plus the file identifier embedded in it.
///
/// Two links are equal when their identifiers are equal.
#[derive(Debug, Clone, Eq)]
pub struct DownloadLink {
    file_id: String,
    url: String,
}

impl PartialEq for DownloadLink {
    fn eq(&self, other: &Self) -> bool {
        self.file_id == other.file_id
    }
}

impl DownloadLink {
    /// Build the direct-download link for a known file identifier.
    pub fn from_file_id(file_id: &str) -> Self {
        Self {
            file_id: file_id.to_string(),
            url: format!("{}{}", DIRECT_DOWNLOAD_BASE, file_id),
        }
    }

    /// Parse a sharing URL such as `https://drive.google.com/file/d/<id>/view`.
    pub fn from_share_url(href: &str) -> Result<Self, FetchError> {
        let id = file_id_from_share_url(href)
            .ok_or_else(|| FetchError::MalformedLink(href.to_string()))?;
        Ok(Self::from_file_id(id))
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for DownloadLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Identifier between `/d/` and the next `/` (or query / fragment).
///
/// Returns `None` unless the identifier passes [`is_valid_file_id`]. An `=`
/// is refused as well, since the downloader reads the id back from after
/// the last `id=` of the direct URL.
pub fn file_id_from_share_url(href: &str) -> Option<&str> {
    let (_, rest) = href.split_once(FILE_PATH_MARKER)?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let id = &rest[..end];
    (is_valid_file_id(id) && !id.contains('=')).then_some(id)
}

/// Whether `id` can name a file inside the destination directory: non-empty,
/// no path separators or NUL, and no leading `.`.
pub fn is_valid_file_id(id: &str) -> bool {
    !id.is_empty() && !id.contains(['/', '\\', '\0']) && !id.starts_with('.')
}

/// Reads the current link from a fixed source page.
pub struct LinkExtractor<F> {
    fetcher: F,
    source_url: String,
    link_pattern: String,
    wait: Duration,
}

impl<F: PageFetcher> LinkExtractor<F> {
    pub fn new(fetcher: F, source_url: &str, link_pattern: &str, wait: Duration) -> Self {
        Self {
            fetcher,
            source_url: source_url.to_string(),
            link_pattern: link_pattern.to_string(),
            wait,
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Fetch and parse the current link, returning the failure to the caller.
    pub fn try_current_link(&self) -> Result<DownloadLink, FetchError> {
        let href = self
            .fetcher
            .find_link_href(&self.source_url, &self.link_pattern, self.wait)?;
        tracing::info!(href = %href, "found shared file link");
        DownloadLink::from_share_url(&href)
    }

    /// Fetch the current link; any failure is logged and reported as `None`.
    pub fn current_link(&self) -> Option<DownloadLink> {
        match self.try_current_link() {
            Ok(link) => Some(link),
            Err(e) if e.is_timeout() => {
                tracing::warn!(url = %self.source_url, "link not found: {}", e);
                None
            }
            Err(e) => {
                tracing::error!(url = %self.source_url, "error getting link: {}", e);
                None
            }
        }
    }
}
