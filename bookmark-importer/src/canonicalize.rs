//! URL canonicalization
//!
//! Strips tracking query parameters so that the same page saved from
//! different referrers compares equal. Never fails: input that does not
//! parse as an absolute URL is returned unchanged.

use url::Url;

/// Query parameters removed by default
pub const DEFAULT_TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "share_token",
    "tt_from",
    "spm",
    "from",
    "source",
];

/// Removes a fixed set of tracking parameters from URLs
#[derive(Debug, Clone)]
pub struct UrlCanonicalizer {
    tracking_params: Vec<String>,
}

impl UrlCanonicalizer {
    /// Create a canonicalizer with the default tracking parameter set
    pub fn new() -> Self {
        Self::with_params(DEFAULT_TRACKING_PARAMS.iter().copied())
    }

    /// Create a canonicalizer removing exactly the given parameter names
    pub fn with_params<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tracking_params: params.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tracking_params(&self) -> &[String] {
        &self.tracking_params
    }

    /// Check whether a query key is a tracking parameter (exact, case-sensitive)
    pub fn is_tracking_param(&self, key: &str) -> bool {
        self.tracking_params.iter().any(|p| p == key)
    }

    /// Canonicalize a URL
    ///
    /// Remaining query parameters keep their original relative order. The
    /// query is only rewritten when something was removed, which keeps the
    /// operation idempotent.
    pub fn canonicalize(&self, raw: &str) -> String {
        let mut url = match Url::parse(raw) {
            Ok(url) => url,
            Err(_) => return raw.to_string(),
        };

        if url.query().is_some() {
            let pairs: Vec<(String, String)> = url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            let kept: Vec<&(String, String)> = pairs
                .iter()
                .filter(|(k, _)| !self.is_tracking_param(k))
                .collect();

            if kept.len() != pairs.len() {
                if kept.is_empty() {
                    url.set_query(None);
                } else {
                    let mut serializer = url.query_pairs_mut();
                    serializer.clear();
                    for (k, v) in kept {
                        serializer.append_pair(k, v);
                    }
                }
            }
        }

        url.to_string()
    }
}

impl Default for UrlCanonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonicalize with the default tracking parameter set
pub fn canonicalize(raw: &str) -> String {
    UrlCanonicalizer::new().canonicalize(raw)
}

/// Host name of an absolute URL
pub fn domain_of(raw: &str) -> Option<String> {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}

/// Whether a link target can become a bookmark
///
/// Only non-empty http(s) targets are admitted; script pseudo-URLs and
/// every other scheme are rejected.
pub fn is_importable_href(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() {
        return false;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:") {
        return false;
    }

    lower.starts_with("http://") || lower.starts_with("https://")
}
