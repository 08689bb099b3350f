//! Utility functions for string truncation, date parsing, and markup escaping.
//!
//! - Character-safe truncation for prompts and log previews
//! - Lenient parsing of the `pubDate` strings found in artifacts

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Keep at most `max` characters of `s`.
///
/// Operates on `char` boundaries so multi-byte text is never split.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and a
/// count of the dropped characters appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let kept = truncate_chars(s, max);
    if kept.len() == s.len() {
        s.to_string()
    } else {
        let dropped = s[kept.len()..].chars().count();
        format!("{}…(+{} chars)", kept, dropped)
    }
}

/// Parse a `pubDate` value into a comparable timestamp.
///
/// Accepts the `YYYY/MM/DD` form the collector writes, plain ISO dates,
/// RFC 3339 instants, and a few looser variants seen in hand-edited files.
/// Instants with an offset are normalized to UTC; date-only forms map to
/// midnight.
pub fn parse_pub_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive);
        }
    }
    for fmt in ["%Y/%m/%d", "%Y-%m-%d", "%Y.%m.%d", "%Y年%m月%d日"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}
