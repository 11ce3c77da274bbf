//! Synced filename parsing, sanitization, and construction.
//!
//! A synced file is named `[<index> ]<title> (<id>).<format>`. The identifier
//! and format are the file's identity; the optional index prefix positions it
//! in the device's alphabetical listing.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::IssueId;

/// File formats a device can read, in preference order.
pub const SYNC_FORMATS: &[&str] = &["cbz", "cbr", "cb7", "cbt", "pdf", "epub"];

/// `[<index> ]<anything> (<id>).<ext>`
#[allow(clippy::expect_used)]
static SYNCED_FILE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d{4,}(?:\.\d+)?) )?.*\((\d+)\)\.([A-Za-z0-9]+)$")
        .expect("synced filename regex is valid") // Static pattern, safe to panic
});

/// Identity and position decoded from a synced filename.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedName {
    /// Embedded issue identifier.
    pub id: IssueId,
    /// Lowercased format extension.
    pub format: String,
    /// Index prefix, when present.
    pub index: Option<f64>,
}

/// Returns the normalized format for an extension, if it is a sync format.
#[must_use]
pub fn sync_format(extension: &str) -> Option<&'static str> {
    SYNC_FORMATS
        .iter()
        .copied()
        .find(|format| format.eq_ignore_ascii_case(extension))
}

/// Decodes a synced filename. Returns `None` for files that do not follow
/// the naming convention or use an unsupported format.
#[must_use]
pub fn parse_synced_filename(name: &str) -> Option<SyncedName> {
    let captures = SYNCED_FILE_PATTERN.captures(name)?;
    let format = sync_format(&captures[3])?;
    let id = captures[2].parse::<IssueId>().ok()?;
    let index = captures
        .get(1)
        .and_then(|m| m.as_str().parse::<f64>().ok());
    Some(SyncedName {
        id,
        format: format.to_string(),
        index,
    })
}

/// Formats an index prefix: at least four integer digits, with fractional
/// digits only when needed.
#[must_use]
pub fn format_index(index: f64) -> String {
    if index.fract() == 0.0 {
        return format!("{index:04.0}");
    }
    let fixed = format!("{index:011.6}");
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Builds the filename for an issue placed at `index`.
#[must_use]
pub fn synced_filename(index: f64, title: &str, id: IssueId, format: &str) -> String {
    sanitize_filename(&format!("{} {title} ({id}).{format}", format_index(index)))
}

/// Replaces characters that are invalid on common filesystems or that
/// e-reader firmware mishandles.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\'' | '!' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }
    sanitized
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_indexed_filename() {
        let parsed = parse_synced_filename("0012 Foo #1 (55).cbz").unwrap();
        assert_eq!(parsed.id, 55);
        assert_eq!(parsed.format, "cbz");
        assert_eq!(parsed.index, Some(12.0));
    }

    #[test]
    fn test_parse_fractional_index() {
        let parsed = parse_synced_filename("0003.25 Bar (9).pdf").unwrap();
        assert_eq!(parsed.index, Some(3.25));
    }

    #[test]
    fn test_parse_unindexed_filename() {
        let parsed = parse_synced_filename("Foo #1 (55).cbr").unwrap();
        assert_eq!(parsed.id, 55);
        assert_eq!(parsed.index, None);
    }

    #[test]
    fn test_short_number_is_not_an_index() {
        let parsed = parse_synced_filename("100 Bullets #1 (77).cbz").unwrap();
        assert_eq!(parsed.id, 77);
        assert_eq!(parsed.index, None);
    }

    #[test]
    fn test_parse_uses_last_parenthesized_number() {
        let parsed = parse_synced_filename("0001 Foo (2013) #1 (55).epub").unwrap();
        assert_eq!(parsed.id, 55);
        assert_eq!(parsed.format, "epub");
    }

    #[test]
    fn test_parse_normalizes_extension_case() {
        let parsed = parse_synced_filename("Foo (55).CBZ").unwrap();
        assert_eq!(parsed.format, "cbz");
    }

    #[test]
    fn test_parse_rejects_unsupported_files() {
        assert!(parse_synced_filename("notes.txt").is_none());
        assert!(parse_synced_filename("Foo (55).jpg").is_none());
        assert!(parse_synced_filename("Foo 55.cbz").is_none());
    }

    #[test]
    fn test_format_index_integer() {
        assert_eq!(format_index(1.0), "0001");
        assert_eq!(format_index(22.0), "0022");
        assert_eq!(format_index(12345.0), "12345");
    }

    #[test]
    fn test_format_index_fractional() {
        assert_eq!(format_index(2.5), "0002.5");
        assert_eq!(format_index(1.0005), "0001.0005");
    }

    #[test]
    fn test_format_index_parses_back() {
        for index in [0.0, 3.0, 3.333_333, 17.25, 120.0] {
            let name = synced_filename(index, "X", 1, "cbz");
            let parsed = parse_synced_filename(&name).unwrap();
            assert!((parsed.index.unwrap() - index).abs() < 1e-9, "{name}");
        }
    }

    #[test]
    fn test_synced_filename_sanitizes_title() {
        let name = synced_filename(12.0, "What If?: Spider-Man's Day!", 55, "cbz");
        assert_eq!(name, "0012 What If__ Spider-Man_s Day_ (55).cbz");
        assert_eq!(parse_synced_filename(&name).unwrap().id, 55);
    }

    #[test]
    fn test_sanitize_filename_control_characters() {
        assert_eq!(sanitize_filename("a\tb/c"), "a_b_c");
        assert_eq!(sanitize_filename(""), "_");
    }

    #[test]
    fn test_sync_format_lookup() {
        assert_eq!(sync_format("PDF"), Some("pdf"));
        assert_eq!(sync_format("mobi"), None);
    }
}
