//! Panorama ID extraction and validation.
//!
//! Street View panorama IDs are URL-safe base64-like strings of at least 20
//! characters. They show up in several places: the `!1s` segment of a Maps
//! URL, `panoid=` query parameters (sometimes URL-encoded), and JSON or
//! JavaScript embedded in page source.

use regex::Regex;
use std::sync::OnceLock;

/// Minimum length of a panorama ID.
pub const MIN_PANORAMA_ID_LEN: usize = 20;

/// Extraction patterns, most specific first. Group 1 is the ID.
const PATTERNS: &[&str] = &[
    r"!1s([A-Za-z0-9_-]{20,})",
    r#""pano":"([A-Za-z0-9_-]{20,})""#,
    r#""panoid":"([A-Za-z0-9_-]{20,})""#,
    r#"pano:"([A-Za-z0-9_-]{20,})""#,
    r#""panoId":"([A-Za-z0-9_-]{20,})""#,
    r"photosphereId=([A-Za-z0-9_-]{20,})",
    r"panoid=([A-Za-z0-9_-]{20,})",
    r"pano=([A-Za-z0-9_-]{20,})",
    r"panoid%3D([A-Za-z0-9_-]{20,})",
];

fn patterns() -> &'static [Regex] {
    static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();
    COMPILED.get_or_init(|| PATTERNS.iter().map(|p| Regex::new(p).unwrap()).collect())
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{20,}$").unwrap())
}

/// True if `id` has the shape of a panorama ID.
///
/// This is a format check only; [`crate::provider::validate_panorama`]
/// checks that the panorama exists.
pub fn is_valid_format(id: &str) -> bool {
    id_pattern().is_match(id)
}

/// Extracts a panorama ID from a URL.
///
/// Patterns are tried in order and the first match wins. A bare ID is
/// returned as-is.
pub fn extract_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if is_valid_format(trimmed) {
        return Some(trimmed.to_string());
    }
    patterns()
        .iter()
        .find_map(|re| re.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extracts a panorama ID from page source.
///
/// Uses the first pattern with any match; among its matches the longest ID
/// is taken, since truncated IDs appear in some embedded snippets.
pub fn extract_from_page(source: &str) -> Option<String> {
    patterns().iter().find_map(|re| {
        re.captures_iter(source)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .reduce(|best, m| if m.len() > best.len() { m } else { best })
            .map(str::to_string)
    })
}

/// Extracts a panorama ID from a URL, a bare ID, or page text.
pub fn extract_panorama_id(text: &str) -> Option<String> {
    extract_from_url(text).or_else(|| extract_from_page(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "AF1QipNabc_DEF-1234567890xyz";
    const SV_ID: &str = "CAoSLEFGMVFpcE5hYmNERUYxMjM0";

    #[test]
    fn test_valid_format() {
        assert!(is_valid_format(ID));
        assert!(is_valid_format("abcdefghij0123456789"));
        assert!(!is_valid_format("short_id"));
        assert!(!is_valid_format("has space in the middle of it"));
        assert!(!is_valid_format(""));
    }

    #[test]
    fn test_maps_url() {
        let url = format!(
            "https://www.google.com/maps/@45.46,9.18,3a,75y,90t/data=!3m7!1e1!3m5!1s{}!2e0!7i16384!8i8192",
            SV_ID
        );
        assert_eq!(extract_from_url(&url).as_deref(), Some(SV_ID));
    }

    #[test]
    fn test_query_parameters() {
        let url = format!("https://example.com/tile?cb_client=x&panoid={}&x=0", SV_ID);
        assert_eq!(extract_from_url(&url).as_deref(), Some(SV_ID));

        let url = format!("https://example.com/?photosphereId={}", ID);
        assert_eq!(extract_from_url(&url).as_deref(), Some(ID));

        let encoded = format!("https://example.com/?q=panoid%3D{}%26x", SV_ID);
        assert_eq!(extract_from_url(&encoded).as_deref(), Some(SV_ID));
    }

    #[test]
    fn test_bare_id() {
        assert_eq!(extract_from_url(&format!("  {}\n", ID)).as_deref(), Some(ID));
    }

    #[test]
    fn test_page_source_prefers_longest() {
        let page = format!(r#"x = {{"pano":"{}"}}; y = {{"pano":"{}XYZ"}}"#, SV_ID, SV_ID);
        assert_eq!(extract_from_page(&page), Some(format!("{}XYZ", SV_ID)));
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(extract_panorama_id("https://example.com/maps?q=milan"), None);
        assert_eq!(extract_panorama_id("panoid=tooshort"), None);
    }
}
