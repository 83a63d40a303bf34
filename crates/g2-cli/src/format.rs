// SPDX-License-Identifier: MIT OR Apache-2.0
//! Output formatting utilities for the `g2error` CLI.

use g2_error::{ErrorCategory, G2Error, error_message};
use serde::Serialize;

/// Supported output formats for CLI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Map a `--json` flag to a format.
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// Comma-separated category names, or `(none)`.
pub fn category_list<I>(categories: I) -> String
where
    I: IntoIterator<Item = ErrorCategory>,
{
    let names: Vec<&str> = categories.into_iter().map(|c| c.as_str()).collect();
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

/// Pretty JSON for any serialisable value.
pub fn to_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Aligned `key: value` lines.
pub fn key_values(rows: &[(&str, String)]) -> String {
    let width = rows.iter().map(|(k, _)| k.len() + 1).max().unwrap_or(0);
    rows.iter()
        .map(|(k, v)| format!("{:<width$}  {v}", format!("{k}:")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn yes_no(b: bool) -> String {
    let s = if b { "yes" } else { "no" };
    s.to_string()
}

/// Text block describing a classified error.
pub fn error_text(err: &G2Error) -> String {
    key_values(&[
        ("code", err.code().to_string()),
        ("message", error_message(err.message()).to_string()),
        ("categories", category_list(err.categories().iter())),
        ("kind", err.kind().to_string()),
        ("retryable", yes_no(err.is_retryable())),
    ])
}
