// SPDX-License-Identifier: MPL-2.0

//! Payload classification for scan results
//!
//! Decoded QR payloads fall into two categories: web links, which get an
//! auto-open countdown, and plain text, which can only be copied. The link
//! check is a permissive shape test, not full URL validation: an optional
//! http/https scheme, a dotted host (or localhost), an optional numeric
//! port, and an optional path.

/// Action derived from a decoded QR payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanAction {
    /// Payload looks like a web address; holds the normalized URL to open
    Link(String),

    /// Anything else; copying is the only action
    Text(String),
}

impl ScanAction {
    /// Classify a decoded payload
    ///
    /// Scheme-less links are normalized to `https://` so they can be handed
    /// straight to the system URL opener.
    pub fn classify(payload: &str) -> Self {
        let trimmed = payload.trim();

        match link_target(trimmed) {
            Some(url) => Self::Link(url),
            None => Self::Text(trimmed.to_string()),
        }
    }

    /// The normalized URL if this payload is a link
    pub fn link(&self) -> Option<&str> {
        match self {
            Self::Link(url) => Some(url),
            Self::Text(_) => None,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Self::Link(_))
    }
}

/// Check whether a payload has the shape of a web address and return the
/// openable URL
fn link_target(payload: &str) -> Option<String> {
    if payload.is_empty() {
        return None;
    }

    let (scheme_present, rest) = match strip_scheme(payload) {
        Some(rest) => (true, rest),
        None => (false, payload),
    };

    // Everything after the first slash is path (queries and fragments
    // included); no validation needed there
    let authority = rest.split_once('/').map_or(rest, |(authority, _)| authority);

    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    };

    if let Some(port) = port
        && (port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    if !is_valid_host(host) {
        return None;
    }

    if scheme_present {
        Some(payload.to_string())
    } else {
        Some(format!("https://{}", payload))
    }
}

/// Strip a leading http:// or https:// scheme, case-insensitively
fn strip_scheme(payload: &str) -> Option<&str> {
    for scheme in ["https://", "http://"] {
        if payload
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        {
            return Some(&payload[scheme.len()..]);
        }
    }
    None
}

/// Hosts are dot-separated labels of alphanumerics, hyphens or
/// underscores, with at least two labels. Bare `localhost` also counts.
fn is_valid_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }

    if !host.contains('.') {
        return false;
    }

    host.split('.').all(|label| {
        !label.is_empty()
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_full_urls() {
        assert_eq!(
            ScanAction::classify("https://example.com"),
            ScanAction::Link("https://example.com".to_string())
        );
        assert_eq!(
            ScanAction::classify("http://example.com/path?q=1#frag"),
            ScanAction::Link("http://example.com/path?q=1#frag".to_string())
        );
    }

    #[test]
    fn test_classify_adds_scheme() {
        assert_eq!(
            ScanAction::classify("example.com"),
            ScanAction::Link("https://example.com".to_string())
        );
        assert_eq!(
            ScanAction::classify("www.example.com/some/path"),
            ScanAction::Link("https://www.example.com/some/path".to_string())
        );
    }

    #[test]
    fn test_classify_localhost() {
        assert!(ScanAction::classify("localhost").is_link());
        assert_eq!(
            ScanAction::classify("localhost:3000"),
            ScanAction::Link("https://localhost:3000".to_string())
        );
        assert!(ScanAction::classify("http://localhost:8080/admin").is_link());
    }

    #[test]
    fn test_classify_ports() {
        assert!(ScanAction::classify("example.com:8080").is_link());
        // Empty or non-numeric ports are not links
        assert!(!ScanAction::classify("example.com:").is_link());
        assert!(!ScanAction::classify("example.com:80a").is_link());
    }

    #[test]
    fn test_classify_ip_host() {
        assert_eq!(
            ScanAction::classify("192.168.1.1:8080"),
            ScanAction::Link("https://192.168.1.1:8080".to_string())
        );
    }

    #[test]
    fn test_classify_plain_text() {
        assert_eq!(
            ScanAction::classify("hello world"),
            ScanAction::Text("hello world".to_string())
        );
        assert!(!ScanAction::classify("WIFI:S:MyNetwork;T:WPA;P:secret;;").is_link());
        assert!(!ScanAction::classify("mailto:test@example.com").is_link());
        assert!(!ScanAction::classify("tel:+1234567890").is_link());
        assert!(!ScanAction::classify("just-some-text").is_link());
        assert!(!ScanAction::classify("").is_link());
    }

    #[test]
    fn test_classify_rejects_embedded_urls() {
        // The shape test is anchored; links inside sentences stay text
        assert!(!ScanAction::classify("Visit https://example.com today").is_link());
    }

    #[test]
    fn test_classify_rejects_malformed_hosts() {
        assert!(!ScanAction::classify(".com").is_link());
        assert!(!ScanAction::classify("example.").is_link());
        assert!(!ScanAction::classify("a..b").is_link());
        assert!(!ScanAction::classify("exa mple.com").is_link());
    }

    #[test]
    fn test_classify_case_insensitive_scheme() {
        assert!(ScanAction::classify("HTTPS://EXAMPLE.COM").is_link());
        assert!(ScanAction::classify("Http://example.com").is_link());
    }

    #[test]
    fn test_classify_trims_whitespace() {
        assert_eq!(
            ScanAction::classify("  https://example.com\n"),
            ScanAction::Link("https://example.com".to_string())
        );
    }

    #[test]
    fn test_link_accessor() {
        assert_eq!(
            ScanAction::classify("example.com").link(),
            Some("https://example.com")
        );
        assert_eq!(ScanAction::classify("hello").link(), None);
    }
}
