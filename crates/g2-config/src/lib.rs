// SPDX-License-Identifier: MIT OR Apache-2.0
//! Engine settings loading, validation, and merging for the G2 bindings.
//!
//! This crate provides [`EngineConfig`] (the arguments every component's
//! `init` needs) together with helpers for loading from TOML files,
//! applying `SENZING_*` environment overrides, merging overlays, and
//! producing advisory [`ConfigWarning`]s.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// An environment variable held an unusable value.
    #[error("invalid value for {var}: {reason}")]
    InvalidEnv {
        /// Variable name.
        var: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A recommended optional field is missing.
    MissingOptionalField {
        /// Name of the missing field.
        field: String,
        /// Why it matters.
        hint: String,
    },
    /// The engine configuration JSON lacks a usual top-level section.
    MissingIniSection {
        /// Section name, e.g. `PIPELINE`.
        section: String,
    },
    /// Verbose engine logging is switched on.
    VerboseLogging,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::MissingOptionalField { field, hint } => {
                write!(f, "missing optional field '{field}': {hint}")
            }
            ConfigWarning::MissingIniSection { section } => {
                write!(f, "ini_params has no '{section}' section")
            }
            ConfigWarning::VerboseLogging => {
                write!(f, "verbose engine logging is enabled")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Settings passed to a G2 component's `init`.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct EngineConfig {
    /// Name the engine logs this instance under.
    #[serde(default = "default_module_name")]
    pub module_name: String,

    /// Engine configuration JSON document (`PIPELINE`, `SQL`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ini_params: Option<String>,

    /// `1` turns on the engine's own verbose logging, `0` leaves it off.
    #[serde(default)]
    pub verbose_logging: i64,

    /// Binding log level (`trace` through `panic`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

fn default_module_name() -> String {
    DEFAULT_MODULE_NAME.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            module_name: default_module_name(),
            ini_params: None,
            verbose_logging: 0,
            log_level: None,
        }
    }
}

impl EngineConfig {
    /// Parsed `ini_params`, if present.
    pub fn ini_params_json(&self) -> Result<Option<serde_json::Value>, ConfigError> {
        self.ini_params
            .as_deref()
            .map(|s| {
                serde_json::from_str(s).map_err(|e| ConfigError::ParseError {
                    reason: format!("ini_params: {e}"),
                })
            })
            .transpose()
    }

    /// Whether binding calls should trace entry and exit.
    pub fn is_trace(&self) -> bool {
        self.log_level
            .as_deref()
            .and_then(normalized_level)
            .is_some_and(|l| l == "trace")
    }
}

/// Canonical lowercase name of `level`, or `None` if it is not a level.
///
/// Case and surrounding whitespace are ignored; `warning` is `warn`.
pub fn normalized_level(level: &str) -> Option<&'static str> {
    let lower = level.trim().to_ascii_lowercase();
    let found: &'static str = VALID_LOG_LEVELS.iter().copied().find(|l| *l == lower)?;
    Some(if found == "warning" { "warn" } else { found })
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Module name used when none is configured.
pub const DEFAULT_MODULE_NAME: &str = "g2-sdk-rs";

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &[
    "trace", "debug", "info", "warn", "warning", "error", "fatal", "panic",
];

/// Top-level sections the engine expects in `ini_params`.
const EXPECTED_INI_SECTIONS: &[&str] = &["PIPELINE", "SQL"];

/// Environment variable holding the engine configuration JSON.
pub const ENV_ENGINE_CONFIGURATION_JSON: &str = "SENZING_ENGINE_CONFIGURATION_JSON";
/// Environment variable overriding the module name.
pub const ENV_MODULE_NAME: &str = "SENZING_MODULE_NAME";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "SENZING_LOG_LEVEL";
/// Environment variable overriding verbose logging.
pub const ENV_VERBOSE_LOGGING: &str = "SENZING_VERBOSE_LOGGING";

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load an [`EngineConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`EngineConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => EngineConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Parse a TOML string into an [`EngineConfig`].
pub fn parse_toml(content: &str) -> Result<EngineConfig, ConfigError> {
    toml::from_str::<EngineConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply overrides from the process environment.
///
/// Recognised variables:
/// - `SENZING_ENGINE_CONFIGURATION_JSON`
/// - `SENZING_MODULE_NAME`
/// - `SENZING_LOG_LEVEL`
/// - `SENZING_VERBOSE_LOGGING`
pub fn apply_env_overrides(config: &mut EngineConfig) -> Result<(), ConfigError> {
    apply_overrides_from(config, |key| std::env::var(key).ok())
}

/// Apply overrides from an arbitrary variable lookup.
pub fn apply_overrides_from(
    config: &mut EngineConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(val) = lookup(ENV_ENGINE_CONFIGURATION_JSON) {
        config.ini_params = Some(val);
    }
    if let Some(val) = lookup(ENV_MODULE_NAME) {
        config.module_name = val;
    }
    if let Some(val) = lookup(ENV_LOG_LEVEL) {
        config.log_level = Some(val.to_ascii_lowercase());
    }
    if let Some(val) = lookup(ENV_VERBOSE_LOGGING) {
        config.verbose_logging = parse_verbose(&val).ok_or_else(|| ConfigError::InvalidEnv {
            var: ENV_VERBOSE_LOGGING.into(),
            reason: format!("expected 0, 1, true or false, got '{val}'"),
        })?;
    }
    Ok(())
}

fn parse_verbose(val: &str) -> Option<i64> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" => Some(1),
        "false" => Some(0),
        other => other.parse().ok(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (empty module name, non-object `ini_params`, unknown log
/// level, verbose logging outside `0`/`1`) are returned as a
/// [`ConfigError::ValidationError`]; soft issues come back as warnings.
pub fn validate_config(config: &EngineConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if config.module_name.trim().is_empty() {
        errors.push("module_name must not be empty".into());
    }

    if let Some(ref level) = config.log_level
        && normalized_level(level).is_none()
    {
        errors.push(format!("invalid log_level '{level}'"));
    }

    match config.verbose_logging {
        0 => {}
        1 => warnings.push(ConfigWarning::VerboseLogging),
        other => errors.push(format!("verbose_logging must be 0 or 1, got {other}")),
    }

    match config.ini_params_json() {
        Ok(Some(serde_json::Value::Object(map))) => {
            for section in EXPECTED_INI_SECTIONS {
                if !map.contains_key(*section) {
                    warnings.push(ConfigWarning::MissingIniSection {
                        section: (*section).into(),
                    });
                }
            }
        }
        Ok(Some(_)) => errors.push("ini_params must be a JSON object".into()),
        Ok(None) => warnings.push(ConfigWarning::MissingOptionalField {
            field: "ini_params".into(),
            hint: format!("the engine cannot start without it; set {ENV_ENGINE_CONFIGURATION_JSON}"),
        }),
        Err(e) => errors.push(e.to_string()),
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations.  Values in `overlay` take precedence over `base`.
///
/// The module name and verbose flag are taken from the overlay unless it
/// leaves them at their defaults.
pub fn merge_configs(base: EngineConfig, overlay: EngineConfig) -> EngineConfig {
    EngineConfig {
        module_name: if overlay.module_name == DEFAULT_MODULE_NAME {
            base.module_name
        } else {
            overlay.module_name
        },
        ini_params: overlay.ini_params.or(base.ini_params),
        verbose_logging: if overlay.verbose_logging == 0 {
            base.verbose_logging
        } else {
            overlay.verbose_logging
        },
        log_level: overlay.log_level.or(base.log_level),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
