//! Large-file confirmation interstitial handling.
//!
//! Detection is a plain substring test against the start of the response
//! text. It can fire on unrelated content that happens to contain the
//! marker and miss differently worded pages; a match is always logged so it
//! can be audited.

use url::Url;

/// Bytes from the start of a body kept for marker detection. Interstitial
/// pages are small HTML documents well under this.
pub const MARKER_SCAN_BYTES: usize = 64 * 1024;

/// True when `text` (the scanned start of a body) contains `marker`.
pub fn needs_confirmation(text: &str, marker: &str) -> bool {
    !marker.is_empty() && text.contains(marker)
}

/// URL to request after an interstitial page whose text is `text`.
///
/// Uses the response's final URL. If the page carries a `confirm` token
/// (in a link or a hidden form field) it is added as a `confirm=` query pair.
pub fn confirmation_url(final_url: &str, text: &str) -> String {
    let Some(token) = confirm_token(text) else {
        return final_url.to_string();
    };
    match Url::parse(final_url) {
        Ok(mut url) => {
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| k != "confirm")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            url.query_pairs_mut()
                .clear()
                .extend_pairs(kept)
                .append_pair("confirm", token);
            url.into()
        }
        Err(e) => {
            tracing::debug!("final URL not parseable ({}), confirming without token", e);
            final_url.to_string()
        }
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Token from `confirm=<token>` or `name="confirm" value="<token>"`.
pub(crate) fn confirm_token(text: &str) -> Option<&str> {
    let query_token = text.match_indices("confirm=").find_map(|(i, m)| {
        let rest = &text[i + m.len()..];
        let end = rest.find(|c: char| !is_token_char(c)).unwrap_or(rest.len());
        (end > 0).then(|| &rest[..end])
    });
    if query_token.is_some() {
        return query_token;
    }

    let (_, after_name) = text.split_once("name=\"confirm\"")?;
    let (_, after_value) = after_name.split_once("value=\"")?;
    let end = after_value.find('"')?;
    let token = &after_value[..end];
    (!token.is_empty() && token.chars().all(is_token_char)).then_some(token)
}
