// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz EngineConfig TOML parsing and validation.
//!
//! 1. `parse_toml` never panics on arbitrary input.
//! 2. Parsed configs validate without panics.
//! 3. Unparseable `ini_params` always fails validation.
//! 4. Serialising back to TOML and re-parsing is lossless.
#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return,
    };

    let config = match g2_config::parse_toml(s) {
        Ok(c) => c,
        Err(_) => return,
    };

    let verdict = g2_config::validate_config(&config);
    match &verdict {
        Ok(warnings) => warnings.iter().for_each(|w| assert!(!w.to_string().is_empty())),
        Err(e) => assert!(!e.to_string().is_empty()),
    }
    if config.ini_params_json().is_err() {
        assert!(verdict.is_err(), "broken ini_params must not validate");
    }

    if let Ok(toml_str) = toml::to_string(&config)
        && let Ok(rt) = g2_config::parse_toml(&toml_str)
    {
        assert_eq!(config, rt, "TOML round-trip must be lossless");
    }

    let json = serde_json::to_string(&config).expect("config must serialize");
    let back: g2_config::EngineConfig = serde_json::from_str(&json).expect("json round-trip");
    assert_eq!(config, back);
});
