// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory stand-in for the engine library.

use crate::NativeModule;
use crate::configmgr::ConfigMgrNative;
use g2_error::error_code;
use serde_json::json;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

/// Return code the engine uses for a failed call.
pub const FAILED: i64 = -2;

#[derive(Debug, Default)]
struct State {
    initialized: bool,
    exception: Option<(i64, String)>,
    scripted: VecDeque<(i64, String)>,
    calls: Vec<String>,
    configs: BTreeMap<i64, (String, String)>,
    default_config_id: i64,
}

/// Engine fake with scripted failures and an in-memory configuration store.
///
/// A scripted failure applies to the next native function called, whatever
/// it is. The exception accessors are never scripted.
#[derive(Debug)]
pub struct FakeNative {
    state: Mutex<State>,
    code_accessor: bool,
}

impl Default for FakeNative {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeNative {
    /// An uninitialised engine that reports exception codes.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            code_accessor: true,
        }
    }

    /// Make `last_exception_code` always report `0`, like engine builds
    /// without the accessor. Callers must then parse the exception text.
    pub fn without_code_accessor(mut self) -> Self {
        self.code_accessor = false;
        self
    }

    /// Fail the next native call with `return_code`, leaving `raw` as the
    /// pending exception.
    pub fn fail_next(&self, return_code: i64, raw: impl Into<String>) {
        self.lock().scripted.push_back((return_code, raw.into()));
    }

    /// Set the pending exception; its code is parsed from `raw`.
    pub fn set_exception(&self, raw: impl Into<String>) {
        let raw = raw.into();
        self.lock().exception = Some((error_code(&raw), raw));
    }

    /// Set the pending exception with an explicit code.
    pub fn set_exception_with_code(&self, code: i64, raw: impl Into<String>) {
        self.lock().exception = Some((code, raw.into()));
    }

    /// Whether `init` succeeded and `destroy` has not been called since.
    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    /// Names of native functions called so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("fake native lock poisoned")
    }

    /// Record the call and apply any scripted or lifecycle failure.
    fn enter(&self, state: &mut State, name: &str) -> Option<i64> {
        state.calls.push(name.to_string());
        if let Some((rc, raw)) = state.scripted.pop_front() {
            state.exception = Some((error_code(&raw), raw));
            return Some(rc);
        }
        if name != "init" && !state.initialized {
            return Some(fail(state, format!("0063E|{name} called before init")));
        }
        None
    }
}

fn fail(state: &mut State, raw: String) -> i64 {
    state.exception = Some((error_code(&raw), raw));
    FAILED
}

// ---------------------------------------------------------------------------
// NativeModule
// ---------------------------------------------------------------------------

impl NativeModule for FakeNative {
    fn init(&self, _module_name: &str, ini_params: &str, _verbose_logging: i64) -> i64 {
        let mut state = self.lock();
        if let Some(rc) = self.enter(&mut state, "init") {
            return rc;
        }
        if is_json_object(ini_params) {
            state.initialized = true;
            0
        } else {
            fail(&mut state, "2006E|Missing or unreadable engine configuration".into())
        }
    }

    fn destroy(&self) -> i64 {
        let mut state = self.lock();
        if let Some(rc) = self.enter(&mut state, "destroy") {
            return rc;
        }
        state.initialized = false;
        0
    }

    fn last_exception(&self) -> String {
        self.lock()
            .exception
            .as_ref()
            .map(|(_, raw)| raw.clone())
            .unwrap_or_default()
    }

    fn last_exception_code(&self) -> i64 {
        if !self.code_accessor {
            return 0;
        }
        self.lock().exception.as_ref().map_or(0, |(code, _)| *code)
    }

    fn clear_last_exception(&self) {
        self.lock().exception = None;
    }
}

fn is_json_object(text: &str) -> bool {
    matches!(
        serde_json::from_str::<serde_json::Value>(text),
        Ok(serde_json::Value::Object(_))
    )
}

// ---------------------------------------------------------------------------
// ConfigMgrNative
// ---------------------------------------------------------------------------

impl ConfigMgrNative for FakeNative {
    fn add_config(&self, config: &str, comments: &str) -> (i64, i64) {
        let mut state = self.lock();
        if let Some(rc) = self.enter(&mut state, "addConfig") {
            return (rc, 0);
        }
        if !is_json_object(config) {
            return (fail(&mut state, "0120E|Invalid JSON config document".into()), 0);
        }
        let id = state.configs.keys().next_back().map_or(1, |last| last + 1);
        state
            .configs
            .insert(id, (config.to_string(), comments.to_string()));
        (0, id)
    }

    fn get_config(&self, config_id: i64) -> (i64, String) {
        let mut state = self.lock();
        if let Some(rc) = self.enter(&mut state, "getConfig") {
            return (rc, String::new());
        }
        let doc = state.configs.get(&config_id).map(|(doc, _)| doc.clone());
        match doc {
            Some(doc) => (0, doc),
            None => (
                fail(&mut state, format!("0033E|Unknown config id [{config_id}]")),
                String::new(),
            ),
        }
    }

    fn get_config_list(&self) -> (i64, String) {
        let mut state = self.lock();
        if let Some(rc) = self.enter(&mut state, "getConfigList") {
            return (rc, String::new());
        }
        let configs: Vec<serde_json::Value> = state
            .configs
            .iter()
            .map(|(id, (_, comments))| json!({"CONFIG_ID": id, "CONFIG_COMMENTS": comments}))
            .collect();
        (0, json!({ "CONFIGS": configs }).to_string())
    }

    fn get_default_config_id(&self) -> (i64, i64) {
        let mut state = self.lock();
        if let Some(rc) = self.enter(&mut state, "getDefaultConfigID") {
            return (rc, 0);
        }
        (0, state.default_config_id)
    }

    fn replace_default_config_id(&self, old_config_id: i64, new_config_id: i64) -> i64 {
        let mut state = self.lock();
        if let Some(rc) = self.enter(&mut state, "replaceDefaultConfigID") {
            return rc;
        }
        if state.default_config_id != old_config_id {
            let current = state.default_config_id;
            return fail(
                &mut state,
                format!("0040E|Default config id is {current}, not {old_config_id}"),
            );
        }
        if !state.configs.contains_key(&new_config_id) {
            return fail(&mut state, format!("0033E|Unknown config id [{new_config_id}]"));
        }
        state.default_config_id = new_config_id;
        0
    }

    fn set_default_config_id(&self, config_id: i64) -> i64 {
        let mut state = self.lock();
        if let Some(rc) = self.enter(&mut state, "setDefaultConfigID") {
            return rc;
        }
        if !state.configs.contains_key(&config_id) {
            return fail(&mut state, format!("0033E|Unknown config id [{config_id}]"));
        }
        state.default_config_id = config_id;
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_failure_applies_once() {
        let fake = FakeNative::new();
        fake.fail_next(-1, "1006E|Connection lost");
        assert_eq!(fake.init("m", "{}", 0), -1);
        assert_eq!(fake.last_exception_code(), 1006);
        assert_eq!(fake.init("m", "{}", 0), 0);
        assert!(fake.is_initialized());
        assert_eq!(fake.calls(), vec!["init", "init"]);
    }

    #[test]
    fn init_requires_object_params() {
        let fake = FakeNative::new();
        assert_eq!(fake.init("m", "[]", 0), FAILED);
        assert!(fake.last_exception().starts_with("2006E|"));
    }

    #[test]
    fn code_accessor_can_be_disabled() {
        let fake = FakeNative::new().without_code_accessor();
        fake.set_exception("0037E|Unknown resolved entity value '-4'");
        assert_eq!(fake.last_exception_code(), 0);
        assert!(fake.last_exception().contains("0037E"));
    }

    #[test]
    fn clear_forgets_exception() {
        let fake = FakeNative::new();
        fake.set_exception_with_code(7, "x");
        fake.clear_last_exception();
        assert_eq!(fake.last_exception(), "");
        assert_eq!(fake.last_exception_code(), 0);
    }

    #[test]
    fn config_list_escapes_comments() {
        let fake = FakeNative::new();
        fake.init("m", "{}", 0);
        fake.add_config("{}", "say \"hi\"");
        let (rc, list) = fake.get_config_list();
        assert_eq!(rc, 0);
        let v: serde_json::Value = serde_json::from_str(&list).unwrap();
        assert_eq!(v["CONFIGS"][0]["CONFIG_COMMENTS"], "say \"hi\"");
    }
}
