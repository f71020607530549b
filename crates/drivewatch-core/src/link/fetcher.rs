//! Page-fetcher capability: render a page and read one link's href.

use std::time::Duration;
use thiserror::Error;

/// Why the current link could not be read from the source page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The link element never became visible and clickable in time.
    #[error("link element did not appear within {waited:?}")]
    Timeout { waited: Duration },
    /// Browser launch, navigation, or DevTools failure.
    #[error("browser: {0}")]
    Browser(String),
    /// The element was found but carries no `href`.
    #[error("link element has no href attribute")]
    MissingHref,
    /// The href does not contain a file identifier.
    #[error("malformed share link: {0}")]
    MalformedLink(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}

/// Renders a page (including dynamic content) and returns the `href` of the
/// first anchor whose target contains `href_pattern`.
///
/// Implementations must release every resource they acquire before returning,
/// on success and on error alike. Nothing is kept between calls.
pub trait PageFetcher {
    fn find_link_href(
        &self,
        page_url: &str,
        href_pattern: &str,
        timeout: Duration,
    ) -> Result<String, FetchError>;
}

impl<P: PageFetcher + ?Sized> PageFetcher for &P {
    fn find_link_href(
        &self,
        page_url: &str,
        href_pattern: &str,
        timeout: Duration,
    ) -> Result<String, FetchError> {
        (**self).find_link_href(page_url, href_pattern, timeout)
    }
}
