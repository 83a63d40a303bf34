// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz exception-text parsing and classification.
//!
//! Verifies:
//! 1. `error_code` and `error_message` never panic and agree with each other.
//! 2. `from_exception` classifies exactly as the table says.
//! 3. The error DTO survives a JSON round-trip.
#![no_main]
use g2_error::{ErrorCategory, G2Error, G2ErrorDto, categories_of, error_code, error_message};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return,
    };

    // --- Property 1: parsing is total ---
    let code = error_code(s);
    let text = error_message(s);
    assert!(s.contains(text));
    if code != 0 {
        assert!(s.contains('|'), "a code needs the '|' separator");
    }

    // --- Property 2: classification follows the table ---
    let err = G2Error::from_exception(s);
    assert_eq!(err.code(), code);
    for category in ErrorCategory::ALL {
        assert_eq!(err.is(category), categories_of(code).contains(&category));
    }
    assert!(!err.is_in_list(&[]));
    assert!(!format!("{err}").is_empty());

    // --- Property 3: DTO JSON round-trip ---
    let dto = G2ErrorDto::from(&err);
    let json = serde_json::to_string(&dto).expect("dto must serialize");
    let rt: G2ErrorDto = serde_json::from_str(&json).expect("dto round-trip must succeed");
    assert_eq!(dto, rt);
});
