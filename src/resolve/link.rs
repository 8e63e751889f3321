//! Douyin link recognition inside free-form message text.
//!
//! Detection is a cheap containment test: most messages contain no link
//! and must cost nothing. Extraction pulls the exact matching substring
//! (canonical `douyin.com` or the `v.douyin.com` short-link subdomain,
//! scheme optional) for the API calls downstream.

use once_cell::sync::Lazy;
use regex::Regex;

static SHARE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?(?:v\.)?douyin\.com/[^\s]+").expect("share link regex is valid")
});

/// Whether the text mentions the platform domain at all.
pub fn is_douyin_link(text: &str) -> bool {
    text.contains("douyin.com")
}

/// Extracts the first share URL from the text, if any.
pub fn extract_share_url(text: &str) -> Option<&str> {
    SHARE_URL_RE.find(text).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_canonical_domain() {
        assert!(is_douyin_link("look at this https://www.douyin.com/video/123"));
    }

    #[test]
    fn test_detects_short_link_subdomain() {
        assert!(is_douyin_link("https://v.douyin.com/abc123/ 复制此链接"));
    }

    #[test]
    fn test_detects_scheme_less_mention() {
        assert!(is_douyin_link("check this out douyin.com/xyz"));
    }

    #[test]
    fn test_plain_text_is_no_match() {
        assert!(!is_douyin_link("good morning everyone"));
        assert!(!is_douyin_link("https://www.youtube.com/watch?v=abc"));
    }

    #[test]
    fn test_extract_full_url() {
        let text = "watch https://www.douyin.com/video/7123456 now";
        assert_eq!(extract_share_url(text), Some("https://www.douyin.com/video/7123456"));
    }

    #[test]
    fn test_extract_short_link() {
        let text = "8.32 pLk:/ https://v.douyin.com/iJcwxyz/ 复制此链接，打开Dou音";
        assert_eq!(extract_share_url(text), Some("https://v.douyin.com/iJcwxyz/"));
    }

    #[test]
    fn test_extract_scheme_less() {
        assert_eq!(extract_share_url("check this out douyin.com/xyz"), Some("douyin.com/xyz"));
    }

    #[test]
    fn test_extract_stops_at_whitespace() {
        let text = "https://v.douyin.com/abc next word";
        assert_eq!(extract_share_url(text), Some("https://v.douyin.com/abc"));
    }

    #[test]
    fn test_extract_none_without_path() {
        // Domain mentioned but no path, nothing actionable to extract.
        assert!(is_douyin_link("I love douyin.com"));
        assert_eq!(extract_share_url("I love douyin.com"), None);
    }
}
