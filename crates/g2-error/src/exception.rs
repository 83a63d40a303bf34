// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parsing of the engine's `getLastException` text.
//!
//! The engine formats exceptions as `<digits><severity>|<text>`, for example
//! `0037E|Unknown resolved entity value '-4'`.

/// Split `raw` into its numeric prefix and the text after `|`.
fn split(raw: &str) -> Option<(&str, &str)> {
    let raw = raw.trim_start();
    let (head, text) = raw.split_once('|')?;
    let digits_end = head
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(head.len());
    if digits_end == 0 {
        return None;
    }
    let (digits, severity) = head.split_at(digits_end);
    let severity_ok = severity.is_empty()
        || (severity.len() == 1 && severity.chars().all(|c| c.is_ascii_alphabetic()));
    severity_ok.then_some((digits, text))
}

/// Numeric code at the front of an exception message.
///
/// Returns `0` (no category) when `raw` does not start with the
/// `<digits><severity>|` prefix or the digits overflow.
pub fn error_code(raw: &str) -> i64 {
    split(raw)
        .and_then(|(digits, _)| digits.parse().ok())
        .unwrap_or(0)
}

/// Human-readable part of an exception message.
///
/// Everything after the first `|`, trimmed; the whole trimmed input when
/// there is no recognisable prefix.
pub fn error_message(raw: &str) -> &str {
    match split(raw) {
        Some((_, text)) => text.trim(),
        None => raw.trim(),
    }
}
