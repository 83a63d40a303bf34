// SPDX-License-Identifier: MIT OR Apache-2.0
//! Deep validation tests for `g2-config`.

use g2_config::{
    ConfigError, ConfigWarning, DEFAULT_MODULE_NAME, ENV_LOG_LEVEL, ENV_MODULE_NAME,
    EngineConfig, apply_overrides_from, merge_configs, parse_toml, validate_config,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const INI: &str = r#"{"PIPELINE":{"CONFIGPATH":"/etc/opt/senzing","RESOURCEPATH":"/opt/senzing/g2/resources","SUPPORTPATH":"/opt/senzing/data"},"SQL":{"CONNECTION":"sqlite3://na:na@/tmp/sqlite/G2C.db"}}"#;

/// Fully-specified config with no validation warnings.
fn fully_valid_config() -> EngineConfig {
    EngineConfig {
        module_name: "g2-loader".into(),
        ini_params: Some(INI.into()),
        verbose_logging: 0,
        log_level: Some("info".into()),
    }
}

/// Extract error reasons from a `ConfigError::ValidationError`.
fn validation_reasons(err: ConfigError) -> Vec<String> {
    match err {
        ConfigError::ValidationError { reasons } => reasons,
        other => panic!("expected ValidationError, got {other:?}"),
    }
}

// ===========================================================================
// 1. Valid configs pass validation with no warnings
// ===========================================================================

#[test]
fn fully_specified_config_has_no_warnings() {
    let warnings = validate_config(&fully_valid_config()).unwrap();
    assert!(warnings.is_empty(), "expected zero warnings: {warnings:?}");
}

#[test]
fn valid_config_all_log_levels() {
    for level in &["trace", "debug", "info", "warn", "error", "fatal", "panic"] {
        let cfg = EngineConfig {
            log_level: Some((*level).into()),
            ..fully_valid_config()
        };
        validate_config(&cfg)
            .unwrap_or_else(|e| panic!("level '{level}' should be valid: {e}"));
    }
}

#[test]
fn absent_log_level_is_valid() {
    let cfg = EngineConfig {
        log_level: None,
        ..fully_valid_config()
    };
    assert!(validate_config(&cfg).unwrap().is_empty());
}

#[test]
fn log_levels_in_any_case_are_valid() {
    for level in ["INFO", "Debug", "WARNING", " error "] {
        let cfg = EngineConfig {
            log_level: Some(level.into()),
            ..fully_valid_config()
        };
        assert!(validate_config(&cfg).is_ok(), "level '{level}' should be valid");
    }
}

// ===========================================================================
// 2. Hard errors
// ===========================================================================

#[test]
fn uppercase_log_level_is_rejected() {
    let cfg = EngineConfig {
        log_level: Some("INFO".into()),
        ..fully_valid_config()
    };
    let reasons = validation_reasons(validate_config(&cfg).unwrap_err());
    assert_eq!(reasons.len(), 1);
    assert!(reasons[0].contains("INFO"));
}

#[test]
fn empty_module_name_is_rejected() {
    let cfg = EngineConfig {
        module_name: String::new(),
        ..fully_valid_config()
    };
    let reasons = validation_reasons(validate_config(&cfg).unwrap_err());
    assert!(reasons.iter().any(|r| r.contains("module_name")));
}

#[test]
fn negative_verbose_is_rejected() {
    let cfg = EngineConfig {
        verbose_logging: -1,
        ..fully_valid_config()
    };
    let reasons = validation_reasons(validate_config(&cfg).unwrap_err());
    assert!(reasons[0].contains("verbose_logging"));
}

#[test]
fn scalar_ini_params_are_rejected() {
    for ini in ["42", "\"text\"", "null", "[]"] {
        let cfg = EngineConfig {
            ini_params: Some(ini.into()),
            ..fully_valid_config()
        };
        let reasons = validation_reasons(validate_config(&cfg).unwrap_err());
        assert!(
            reasons.iter().any(|r| r.contains("JSON object")),
            "{ini}: {reasons:?}"
        );
    }
}

#[test]
fn all_problems_are_reported_together() {
    let cfg = EngineConfig {
        module_name: "".into(),
        ini_params: Some("{".into()),
        verbose_logging: 2,
        log_level: Some("verbose".into()),
    };
    let reasons = validation_reasons(validate_config(&cfg).unwrap_err());
    assert_eq!(reasons.len(), 4, "{reasons:?}");
}

#[test]
fn validation_error_display_lists_reasons() {
    let cfg = EngineConfig {
        verbose_logging: -2,
        ..fully_valid_config()
    };
    let msg = validate_config(&cfg).unwrap_err().to_string();
    assert!(msg.contains("config validation failed"));
    assert!(msg.contains("-2"));
}

// ===========================================================================
// 3. Warnings
// ===========================================================================

#[test]
fn only_sql_section_warns_about_pipeline() {
    let cfg = EngineConfig {
        ini_params: Some(r#"{"SQL":{"CONNECTION":"postgresql://u:p@db:5432:G2"}}"#.into()),
        ..fully_valid_config()
    };
    let warnings = validate_config(&cfg).unwrap();
    assert_eq!(
        warnings,
        vec![ConfigWarning::MissingIniSection {
            section: "PIPELINE".into()
        }]
    );
}

#[test]
fn verbose_logging_warns() {
    let cfg = EngineConfig {
        verbose_logging: 1,
        ..fully_valid_config()
    };
    assert_eq!(
        validate_config(&cfg).unwrap(),
        vec![ConfigWarning::VerboseLogging]
    );
}

#[test]
fn missing_ini_params_warning_names_env_var() {
    let cfg = EngineConfig {
        ini_params: None,
        ..fully_valid_config()
    };
    let warnings = validate_config(&cfg).unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].to_string().contains("SENZING_ENGINE_CONFIGURATION_JSON"));
}

// ===========================================================================
// 4. Parsing, overrides, merging
// ===========================================================================

#[test]
fn parsed_file_with_overrides_validates() {
    let mut cfg = parse_toml(&format!("ini_params = '{INI}'\nverbose_logging = 0\n")).unwrap();
    apply_overrides_from(&mut cfg, |k| match k {
        ENV_MODULE_NAME => Some("env-module".into()),
        ENV_LOG_LEVEL => Some("Warn".into()),
        _ => None,
    })
    .unwrap();
    assert_eq!(cfg.module_name, "env-module");
    assert_eq!(cfg.log_level.as_deref(), Some("warn"));
    assert!(validate_config(&cfg).unwrap().is_empty());
}

#[test]
fn override_can_introduce_invalid_level() {
    let mut cfg = fully_valid_config();
    apply_overrides_from(&mut cfg, |k| (k == ENV_LOG_LEVEL).then(|| "chatty".into())).unwrap();
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn unknown_toml_keys_are_ignored() {
    let cfg = parse_toml("module_name = \"x\"\nfuture_option = true\n").unwrap();
    assert_eq!(cfg.module_name, "x");
}

#[test]
fn merge_default_overlay_keeps_base() {
    let merged = merge_configs(fully_valid_config(), EngineConfig {
        log_level: None,
        ..Default::default()
    });
    assert_eq!(merged, fully_valid_config());
}

#[test]
fn merge_overlay_module_name_wins_unless_default() {
    let overlay = EngineConfig {
        module_name: "overlay".into(),
        ..Default::default()
    };
    let merged = merge_configs(fully_valid_config(), overlay);
    assert_eq!(merged.module_name, "overlay");

    let merged = merge_configs(
        EngineConfig {
            module_name: "base".into(),
            ..Default::default()
        },
        EngineConfig::default(),
    );
    assert_eq!(merged.module_name, "base");
    assert_ne!(merged.module_name, DEFAULT_MODULE_NAME);
}

#[test]
fn schema_lists_every_field() {
    let schema = schemars::schema_for!(EngineConfig);
    let json = serde_json::to_value(&schema).unwrap();
    let props = json["properties"].as_object().unwrap();
    for field in [
        "module_name",
        "ini_params",
        "verbose_logging",
        "log_level",
    ] {
        assert!(props.contains_key(field), "schema missing {field}");
    }
    assert_eq!(props.len(), 4, "every setting must be read by init: {props:?}");
}
