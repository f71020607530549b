//! Transfer-client capability: a streaming GET. Body bytes are handed to a
//! caller-supplied sink as they arrive; the call returns the status and the
//! final URL after redirects.

mod curl_client;

pub use curl_client::CurlTransferClient;

use std::io;
use thiserror::Error;

/// Error returned by a single GET.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] ::curl::Error),
    /// The body sink failed (e.g. disk full); the transfer was aborted.
    #[error("sink: {0}")]
    Sink(io::Error),
}

/// Status line facts of a completed GET. The body went to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResponse {
    pub status: u32,
    /// URL the response was served from after following redirects.
    pub final_url: String,
}

impl TransferResponse {
    pub fn new(status: u32, final_url: impl Into<String>) -> Self {
        Self {
            status,
            final_url: final_url.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Receives body bytes in arrival order. An error aborts the transfer.
pub type BodySink<'a> = dyn FnMut(&[u8]) -> io::Result<()> + 'a;

/// Performs streaming GET requests. Takes `&mut self` so an implementation
/// may keep connection or cookie state between the requests of one download.
pub trait TransferClient {
    fn get(&mut self, url: &str, sink: &mut BodySink<'_>) -> Result<TransferResponse, TransferError>;
}

impl<T: TransferClient + ?Sized> TransferClient for &mut T {
    fn get(&mut self, url: &str, sink: &mut BodySink<'_>) -> Result<TransferResponse, TransferError> {
        (**self).get(url, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        assert!(TransferResponse::new(200, "u").is_success());
        assert!(TransferResponse::new(204, "u").is_success());
        assert!(!TransferResponse::new(302, "u").is_success());
        assert!(!TransferResponse::new(404, "u").is_success());
    }

    #[test]
    fn sink_error_display() {
        let err = TransferError::Sink(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert_eq!(err.to_string(), "sink: disk full");
    }
}
