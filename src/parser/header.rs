//! Header handling: unfolding, value normalization, and date parsing.

use chrono::DateTime;

use crate::error::{Result, UnpackError};

/// Accepted input format with a numeric timezone offset, after the
/// day-of-week prefix has been stripped,
/// e.g. `"5 Jun 2023 10:00:00 -0400"`.
const DATE_FORMAT: &str = "%d %b %Y %H:%M:%S %z";

/// Canonical output format, e.g. `"2023-06-05 10:00:00-0400"`.
const OUT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

/// Collapse a possibly-folded header value into a single normalized line.
///
/// Removes CR and LF outright, then collapses every remaining run of
/// whitespace to a single space. Absent input yields the empty string.
pub fn fold_header_value(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    let mut out = String::with_capacity(raw.len());
    let mut in_whitespace = false;
    for c in raw.chars() {
        if c == '\r' || c == '\n' {
            continue;
        }
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

/// Normalize a raw `Date:` header value to the canonical timestamp string.
///
/// The value is unfolded first and its day-of-week prefix stripped — the
/// weekday name carries no information and old archives routinely get it
/// wrong, so it must not veto an otherwise valid date. The remainder is
/// parsed against the primary format (numeric offset). On failure the
/// secondary form is tried: the same layout with a named timezone
/// abbreviation, handled by substituting a numeric offset for the
/// abbreviation and re-parsing.
///
/// Failure of both attempts (including an absent or empty value) is a hard
/// failure for the message: the caller must skip it entirely.
pub fn normalize_date(raw: Option<&str>) -> Result<String> {
    let one_line = fold_header_value(raw);
    let trimmed = one_line.trim();
    if trimmed.is_empty() {
        return Err(UnpackError::UnparsableDate(String::new()));
    }

    let no_dow = strip_day_of_week(trimmed);

    if let Ok(dt) = DateTime::parse_from_str(&no_dow, DATE_FORMAT) {
        return Ok(dt.format(OUT_DATE_FORMAT).to_string());
    }

    // Secondary format: named timezone abbreviation instead of an offset.
    if let Some(replaced) = replace_named_tz(&no_dow) {
        if let Ok(dt) = DateTime::parse_from_str(&replaced, DATE_FORMAT) {
            return Ok(dt.format(OUT_DATE_FORMAT).to_string());
        }
    }

    Err(UnpackError::UnparsableDate(trimmed.to_string()))
}

/// Strip a leading day-of-week prefix (e.g. "Thu, " or "Thu ").
fn strip_day_of_week(s: &str) -> String {
    let days = [
        "Mon,", "Tue,", "Wed,", "Thu,", "Fri,", "Sat,", "Sun,", "Mon ", "Tue ", "Wed ", "Thu ",
        "Fri ", "Sat ", "Sun ",
    ];
    for day in &days {
        if let Some(rest) = s.strip_prefix(day) {
            return rest.trim().to_string();
        }
    }
    s.to_string()
}

/// Replace a trailing well-known timezone abbreviation with its numeric
/// offset. Returns `None` when the value ends with no known abbreviation.
///
/// Longer abbreviations come first: CEST must not be matched as EST.
fn replace_named_tz(s: &str) -> Option<String> {
    let tzs = [
        ("CEST", "+0200"),
        ("EST", "-0500"),
        ("EDT", "-0400"),
        ("CST", "-0600"),
        ("CDT", "-0500"),
        ("MST", "-0700"),
        ("MDT", "-0600"),
        ("PST", "-0800"),
        ("PDT", "-0700"),
        ("GMT", "+0000"),
        ("UTC", "+0000"),
        ("UT", "+0000"),
        ("CET", "+0100"),
        ("JST", "+0900"),
    ];
    for (name, offset) in &tzs {
        if let Some(head) = s.strip_suffix(name) {
            return Some(format!("{head}{offset}"));
        }
    }
    None
}

/// Unfold a header block into `(lowercase_name, value)` pairs.
///
/// Continuation lines (starting with space or tab) are joined to the
/// previous header with a single space. Lines with no colon that are not
/// continuations are silently skipped.
pub fn unfold_headers(text: &str) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = result.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim());
            }
        } else if let Some(colon_pos) = line.find(':') {
            let name = line[..colon_pos].trim().to_lowercase();
            let value = line[colon_pos + 1..].trim().to_string();
            result.push((name, value));
        }
    }

    result
}

/// Get the first value for a header name (case-insensitive).
pub fn get_header(headers: &[(String, String)], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
}
