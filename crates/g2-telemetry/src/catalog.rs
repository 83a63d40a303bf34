// SPDX-License-Identifier: MIT OR Apache-2.0
//! Numbered message templates rendered into levelled `tracing` events.

use crate::TelemetryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error, info, trace, warn};

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Severity of a catalog message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Method entry/exit tracing.
    Trace,
    /// Diagnostic detail.
    Debug,
    /// Normal operation.
    Info,
    /// Something unexpected but survivable.
    Warn,
    /// A call failed.
    Error,
    /// The component cannot continue.
    Fatal,
    /// The process cannot continue.
    Panic,
}

impl Level {
    /// Level implied by a message id: each block of 1000 ids is one level,
    /// `0..1000` trace through `6000..` panic.
    pub fn for_message_id(id: u32) -> Self {
        match id {
            0..=999 => Self::Trace,
            1000..=1999 => Self::Debug,
            2000..=2999 => Self::Info,
            3000..=3999 => Self::Warn,
            4000..=4999 => Self::Error,
            5000..=5999 => Self::Fatal,
            _ => Self::Panic,
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Panic => "panic",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            "panic" => Ok(Self::Panic),
            _ => Err(TelemetryError::UnknownLevel { name: s.to_string() }),
        }
    }
}

// ---------------------------------------------------------------------------
// Template formatting
// ---------------------------------------------------------------------------

/// Fill `%s`, `%d` and `%v` placeholders in order from `args`.
///
/// `%%` renders a literal `%`. Placeholders without a matching argument are
/// left as written; surplus arguments are appended in brackets.
pub fn format_template(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args_iter = args.iter();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(verb @ ('s' | 'd' | 'v')) => {
                chars.next();
                match args_iter.next() {
                    Some(arg) => out.push_str(arg),
                    None => {
                        out.push('%');
                        out.push(verb);
                    }
                }
            }
            _ => out.push('%'),
        }
    }
    let surplus: Vec<&str> = args_iter.map(String::as_str).collect();
    if !surplus.is_empty() {
        out.push_str(" [");
        out.push_str(&surplus.join(", "));
        out.push(']');
    }
    out
}

// ---------------------------------------------------------------------------
// MessageCatalog
// ---------------------------------------------------------------------------

/// Message templates of one binding component.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    product_id: u32,
    templates: BTreeMap<u32, &'static str>,
    threshold: Level,
}

impl MessageCatalog {
    /// Create a catalog for `product_id` logging at [`Level::Info`] and above.
    pub fn new(product_id: u32, templates: &[(u32, &'static str)]) -> Self {
        Self {
            product_id,
            templates: templates.iter().copied().collect(),
            threshold: Level::Info,
        }
    }

    /// Product id of the owning component.
    pub fn product_id(&self) -> u32 {
        self.product_id
    }

    /// Lowest level that is emitted.
    pub fn level(&self) -> Level {
        self.threshold
    }

    /// Change the lowest level that is emitted.
    pub fn set_level(&mut self, level: Level) {
        self.threshold = level;
    }

    /// Whether messages at `level` would be emitted.
    pub fn is_enabled(&self, level: Level) -> bool {
        level >= self.threshold
    }

    /// Globally unique id, e.g. `senzing-60024001`.
    pub fn message_id(&self, id: u32) -> String {
        format!("senzing-{:04}{:04}", self.product_id, id)
    }

    /// Template registered for `id`.
    pub fn template(&self, id: u32) -> Option<&'static str> {
        self.templates.get(&id).copied()
    }

    /// Render message `id` with `args`.
    ///
    /// Unknown ids render as the message id followed by the arguments.
    pub fn render(&self, id: u32, args: &[String]) -> String {
        match self.template(id) {
            Some(t) => format_template(t, args),
            None => format_template(&self.message_id(id), args),
        }
    }

    /// Render message `id` and emit it as a `tracing` event if its level is
    /// enabled. Returns the rendered text either way.
    pub fn log(&self, id: u32, args: &[String]) -> String {
        let text = self.render(id, args);
        let level = Level::for_message_id(id);
        if !self.is_enabled(level) {
            return text;
        }
        let message_id = self.message_id(id);
        match level {
            Level::Trace => trace!(target: "g2", message_id = %message_id, "{text}"),
            Level::Debug => debug!(target: "g2", message_id = %message_id, "{text}"),
            Level::Info => info!(target: "g2", message_id = %message_id, "{text}"),
            Level::Warn => warn!(target: "g2", message_id = %message_id, "{text}"),
            Level::Error => error!(target: "g2", message_id = %message_id, "{text}"),
            Level::Fatal | Level::Panic => {
                error!(target: "g2", message_id = %message_id, severity = %level, "{text}")
            }
        }
        text
    }
}
