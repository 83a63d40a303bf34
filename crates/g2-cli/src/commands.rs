// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared command implementations for the `g2error` CLI.
//!
//! These functions are library-level so they can be tested without
//! spawning the binary. Each returns the text to print.

use crate::format::{OutputFormat, category_list, error_text, key_values, to_json};
use anyhow::{Context, Result};
use g2_config::{ConfigError, EngineConfig, validate_config};
use g2_error::{ErrorCategory, G2Error, G2ErrorDto, categories_of, error_types};
use schemars::schema_for;
use serde::Serialize;
use std::path::Path;

// ---------------------------------------------------------------------------
// categories
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CategoryRow {
    name: ErrorCategory,
    kind: &'static str,
}

/// Every category, base categories first.
pub fn categories(format: OutputFormat) -> Result<String> {
    let rows: Vec<CategoryRow> = ErrorCategory::ALL
        .iter()
        .map(|&name| CategoryRow {
            name,
            kind: if name.is_base() { "base" } else { "detail" },
        })
        .collect();
    match format {
        OutputFormat::Json => to_json(&rows).context("serialize categories"),
        OutputFormat::Text => Ok(rows
            .iter()
            .map(|r| format!("{:<32}{}", r.name.as_str(), r.kind))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

// ---------------------------------------------------------------------------
// explain
// ---------------------------------------------------------------------------

/// How the table classifies one native code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeReport {
    /// The native code.
    pub code: i64,
    /// Categories in table order; empty for unknown codes.
    pub categories: Vec<ErrorCategory>,
    /// Primary triage category.
    pub kind: ErrorCategory,
    /// Whether a retry may succeed.
    pub retryable: bool,
}

impl CodeReport {
    /// Look `code` up in the table.
    pub fn for_code(code: i64) -> Self {
        let err = G2Error::build(code, "");
        Self {
            code,
            categories: categories_of(code).to_vec(),
            kind: err.kind(),
            retryable: err.is_retryable(),
        }
    }
}

/// Describe the categories of `code`.
pub fn explain(code: i64, format: OutputFormat) -> Result<String> {
    let report = CodeReport::for_code(code);
    match format {
        OutputFormat::Json => to_json(&report).context("serialize report"),
        OutputFormat::Text => Ok(key_values(&[
            ("code", report.code.to_string()),
            ("categories", category_list(report.categories.iter().copied())),
            ("kind", report.kind.to_string()),
            ("retryable", report.retryable.to_string()),
        ])),
    }
}

// ---------------------------------------------------------------------------
// table
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct TableRow {
    code: i64,
    categories: &'static [ErrorCategory],
}

/// The whole code table in ascending code order.
pub fn table(format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<TableRow> = error_types()
                .map(|(code, categories)| TableRow { code, categories })
                .collect();
            to_json(&rows).context("serialize table")
        }
        OutputFormat::Text => Ok(error_types()
            .map(|(code, categories)| {
                format!("{code:>6}  {}", category_list(categories.iter().copied()))
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

// ---------------------------------------------------------------------------
// classify
// ---------------------------------------------------------------------------

/// Classify a raw `getLastException` text. `code` overrides the code parsed
/// from the text, as `getLastExceptionCode` would.
pub fn classify(raw: &str, code: Option<i64>, format: OutputFormat) -> Result<String> {
    let err = match code {
        Some(code) => G2Error::build(code, raw),
        None => G2Error::from_exception(raw),
    };
    tracing::debug!(target: "g2error", code = err.code(), categories = ?err.categories(), "classified");
    match format {
        OutputFormat::Json => to_json(&G2ErrorDto::from(&err)).context("serialize error"),
        OutputFormat::Text => Ok(error_text(&err)),
    }
}

// ---------------------------------------------------------------------------
// check-config
// ---------------------------------------------------------------------------

/// Load and validate an engine settings file.
///
/// Warnings are reported in the returned text; hard errors fail.
pub fn check_config(path: &Path) -> Result<String> {
    let config = g2_config::load_config(Some(path))
        .with_context(|| format!("load config '{}'", path.display()))?;
    let warnings = validate_config(&config).map_err(|e| match e {
        ConfigError::ValidationError { reasons } => {
            anyhow::anyhow!("invalid config '{}':\n  {}", path.display(), reasons.join("\n  "))
        }
        other => anyhow::Error::new(other),
    })?;
    let mut lines = vec![format!("ok: {}", path.display())];
    lines.extend(warnings.iter().map(|w| format!("warning: {w}")));
    Ok(lines.join("\n"))
}

// ---------------------------------------------------------------------------
// schema
// ---------------------------------------------------------------------------

/// Schema types that can be printed by the `schema` subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// JSON schema for [`EngineConfig`].
    Config,
    /// JSON schema for [`G2ErrorDto`].
    Error,
}

/// Return the JSON schema string for the given kind.
pub fn schema_json(kind: SchemaKind) -> Result<String> {
    let value = match kind {
        SchemaKind::Config => serde_json::to_value(schema_for!(EngineConfig))?,
        SchemaKind::Error => serde_json::to_value(schema_for!(G2ErrorDto))?,
    };
    serde_json::to_string_pretty(&value).context("serialize schema")
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// `EnvFilter` directive for the CLI's own logging.
///
/// `--debug` wins; otherwise the configured level is used (any case), with
/// `fatal` and `panic` folded into `error`.
pub fn log_directive(config: &EngineConfig, debug: bool) -> String {
    let level = if debug {
        "debug"
    } else {
        match config.log_level.as_deref().and_then(g2_config::normalized_level) {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("warn") => "warn",
            Some("error" | "fatal" | "panic") => "error",
            _ => "info",
        }
    };
    format!("g2={level},g2error={level}")
}
