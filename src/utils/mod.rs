//! Utility functions and helpers.

pub mod http;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace typographic apostrophes with ASCII ones.
pub fn normalize_apostrophes(s: &str) -> String {
    s.replace(['\u{2019}', '\u{2018}'], "'")
}

/// Normalize a party name as it appears in headings and labels.
pub fn clean_name(s: &str) -> String {
    normalize_apostrophes(&normalize_whitespace(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com").unwrap();
        assert_eq!(
            resolve_url(&base, "/media/logo.png"),
            "https://example.com/media/logo.png"
        );
        assert_eq!(
            resolve_url(&base, "media/logo.png"),
            "https://example.com/media/logo.png"
        );
        assert_eq!(
            resolve_url(&base, "https://cdn.example.org/x.png"),
            "https://cdn.example.org/x.png"
        );
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  The People\u{2019}s\n   Party "), "The People's Party");
        assert_eq!(clean_name("\u{2018}Quoted\u{2019}"), "'Quoted'");
    }
}
