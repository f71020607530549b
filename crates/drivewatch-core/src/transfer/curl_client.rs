//! libcurl-backed transfer client.

use super::{BodySink, TransferClient, TransferError, TransferResponse};
use crate::config::HttpConfig;
use ::curl::easy::Easy;
use std::time::Duration;

/// GET client over a single reusable curl easy handle.
///
/// The handle's cookie engine is on, so cookies set by one response (such as
/// a download-warning cookie) are sent with the next request.
pub struct CurlTransferClient {
    easy: Easy,
}

impl CurlTransferClient {
    pub fn new(http: &HttpConfig) -> Result<Self, TransferError> {
        let mut easy = Easy::new();
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.cookie_file("")?;
        easy.connect_timeout(Duration::from_secs(http.connect_timeout_secs))?;
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;
        easy.timeout(Duration::from_secs(http.timeout_secs))?;
        if let Some(agent) = &http.user_agent {
            easy.useragent(agent)?;
        }
        Ok(Self { easy })
    }
}

impl TransferClient for CurlTransferClient {
    fn get(&mut self, url: &str, sink: &mut BodySink<'_>) -> Result<TransferResponse, TransferError> {
        self.easy.url(url)?;
        self.easy.get(true)?;

        let mut received = 0u64;
        let mut sink_error = None;
        let performed;
        {
            let mut transfer = self.easy.transfer();
            transfer.write_function(|data| match sink(data) {
                Ok(()) => {
                    received += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    tracing::warn!("body sink failed: {}", e);
                    sink_error = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            performed = transfer.perform();
        }
        if let Some(e) = sink_error {
            return Err(TransferError::Sink(e));
        }
        performed?;

        let status = self.easy.response_code()?;
        let final_url = self
            .easy
            .effective_url()?
            .unwrap_or(url)
            .to_string();
        tracing::debug!(url, status, bytes = received, "GET finished");
        Ok(TransferResponse::new(status, final_url))
    }
}
