//! URL resolution for scraped links.
//!
//! Schedule pages mostly use root-relative links (`/schedule/42`). These are
//! made absolute by prepending the calendar's configured base URL; anything
//! that already carries a scheme passes through untouched.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Matches a URI scheme prefix (`http:`, `mailto:`, `webcal:` ...).
static SCHEME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("Invalid scheme regex"));

/// A hyperlink lifted out of a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionLink {
    /// Visible link text.
    pub text: String,
    /// Resolved link target.
    pub url: String,
}

impl DescriptionLink {
    /// Creates a new link.
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }

    /// Renders the link as a `"<text>:\n<url>"` paragraph.
    pub fn to_paragraph(&self) -> String {
        format!("{}:\n{}", self.text, self.url)
    }
}

/// Returns true if `url` starts with a scheme.
pub fn is_absolute(url: &str) -> bool {
    SCHEME_REGEX.is_match(url.trim())
}

/// Makes `raw` absolute against `base_url`.
///
/// Empty and absolute values are returned trimmed but otherwise unchanged, as
/// is everything when no base URL is configured. Protocol-relative values
/// (`//cdn.example.com/x`) borrow the base URL's scheme.
pub fn resolve_url(raw: &str, base_url: Option<&str>) -> String {
    let raw = raw.trim();
    if raw.is_empty() || is_absolute(raw) {
        return raw.to_string();
    }

    let Some(base) = base_url.map(str::trim).filter(|b| !b.is_empty()) else {
        return raw.to_string();
    };

    if let Some(rest) = raw.strip_prefix("//") {
        let scheme = Url::parse(base)
            .map(|u| u.scheme().to_string())
            .unwrap_or_else(|_| "https".to_string());
        return format!("{}://{}", scheme, rest);
    }

    let base = base.trim_end_matches('/');
    let joined = if raw.starts_with('?') || raw.starts_with('#') {
        format!("{}{}", base, raw)
    } else {
        format!("{}/{}", base, raw.trim_start_matches('/'))
    };

    // Round-trip through the parser to percent-encode spaces and the like;
    // keep the plain concatenation if the base itself is not a valid URL.
    match Url::parse(&joined) {
        Ok(url) => url.to_string(),
        Err(_) => joined,
    }
}
