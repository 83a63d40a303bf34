// SPDX-License-Identifier: MIT OR Apache-2.0
//! Integration tests for the `g2error` CLI binary.

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::io::Write;

fn g2error() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("g2error").expect("binary `g2error` should be built");
    for var in [
        "SENZING_ENGINE_CONFIGURATION_JSON",
        "SENZING_MODULE_NAME",
        "SENZING_LOG_LEVEL",
        "SENZING_VERBOSE_LOGGING",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

// ── Help & version ──────────────────────────────────────────────────

#[test]
fn help_flag_prints_usage() {
    g2error()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Senzing G2 error classification CLI"))
        .stdout(contains("explain"))
        .stdout(contains("classify"))
        .stdout(contains("check-config"));
}

#[test]
fn version_flag_prints_version() {
    g2error()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

// ── Subcommands ─────────────────────────────────────────────────────

#[test]
fn categories_lists_all() {
    g2error()
        .arg("categories")
        .assert()
        .success()
        .stdout(contains("bad_user_input"))
        .stdout(contains("repository_purged"));
}

#[test]
fn explain_retryable_code() {
    g2error()
        .args(["explain", "1006"])
        .assert()
        .success()
        .stdout(contains("database_connection_lost, retryable"));
}

#[test]
fn explain_negative_code_has_no_category() {
    g2error()
        .args(["explain", "-1", "--json"])
        .assert()
        .success()
        .stdout(contains("\"categories\": []"));
}

#[test]
fn explain_rejects_non_numeric_code() {
    g2error().args(["explain", "abc"]).assert().failure();
}

#[test]
fn table_json() {
    g2error()
        .args(["table", "--json"])
        .assert()
        .success()
        .stdout(contains("\"code\": 4001"));
}

#[test]
fn classify_raw_exception() {
    g2error()
        .args(["classify", "0033E|Unknown record: dsrc[CUSTOMERS], record[1001]"])
        .assert()
        .success()
        .stdout(contains("not_found"))
        .stdout(contains("Unknown record"));
}

#[test]
fn classify_json_with_code_override() {
    g2error()
        .args(["classify", "lost it", "--code", "1008", "--json"])
        .assert()
        .success()
        .stdout(contains("\"code\": 1008"))
        .stdout(contains("\"retryable\""));
}

#[test]
fn check_config_valid_file() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        f,
        "module_name = \"cli\"\nini_params = '{{\"PIPELINE\":{{}},\"SQL\":{{}}}}'"
    )
    .unwrap();
    g2error()
        .arg("check-config")
        .arg(f.path())
        .assert()
        .success()
        .stdout(contains("ok: "))
        .stdout(contains("warning").not());
}

#[test]
fn check_config_invalid_file_fails() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "verbose_logging = 3").unwrap();
    g2error()
        .arg("check-config")
        .arg(f.path())
        .assert()
        .failure()
        .stderr(contains("verbose_logging must be 0 or 1"));
}

#[test]
fn bad_global_config_fails() {
    g2error()
        .args(["--config", "/nonexistent/g2.toml", "categories"])
        .assert()
        .failure()
        .stderr(contains("load settings"));
}

#[test]
fn schema_config() {
    g2error()
        .args(["schema", "config"])
        .assert()
        .success()
        .stdout(contains("module_name"));
}
