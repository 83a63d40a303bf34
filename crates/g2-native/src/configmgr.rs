// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration manager component (`G2ConfigMgr`, product id 6002).
//!
//! Stores engine configuration documents, lists them, and tracks which one
//! is the default.

use crate::{Binding, Component, NativeModule, Operation};
use g2_error::G2Error;
use std::sync::Arc;

/// Product id of the configuration manager.
pub const PRODUCT_ID: u32 = 6002;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

const TEMPLATES: &[(u32, &str)] = &[
    (1, "Enter AddConfig(%s, %s)."),
    (2, "Exit  AddConfig(%s, %s) returned (%v)."),
    (3, "Enter Destroy()."),
    (4, "Exit  Destroy() returned (%v)."),
    (5, "Enter GetConfig(%d)."),
    (6, "Exit  GetConfig(%d) returned (%v)."),
    (7, "Enter GetConfigList()."),
    (8, "Exit  GetConfigList() returned (%v)."),
    (9, "Enter GetDefaultConfigID()."),
    (10, "Exit  GetDefaultConfigID() returned (%v)."),
    (11, "Enter Init(%s, %s, %d)."),
    (12, "Exit  Init(%s, %s, %d) returned (%v)."),
    (13, "Enter ReplaceDefaultConfigID(%d, %d)."),
    (14, "Exit  ReplaceDefaultConfigID(%d, %d) returned (%v)."),
    (15, "Enter SetDefaultConfigID(%d)."),
    (16, "Exit  SetDefaultConfigID(%d) returned (%v)."),
    (17, "Enter SetLogLevel(%v)."),
    (18, "Exit  SetLogLevel(%v) returned (%v)."),
    (4001, "Call to G2ConfigMgr_addConfig(%s, %s) failed. Return code: %d"),
    (4002, "Call to G2ConfigMgr_destroy() failed. Return code: %d"),
    (4003, "Call to G2ConfigMgr_getConfig(%d) failed. Return code: %d"),
    (4004, "Call to G2ConfigMgr_getConfigList() failed. Return code: %d"),
    (4005, "Call to G2ConfigMgr_getDefaultConfigID() failed. Return code: %d"),
    (4007, "Call to G2ConfigMgr_init(%s, %s, %d) failed. Return code: %d"),
    (4008, "Call to G2ConfigMgr_replaceDefaultConfigID(%d, %d) failed. Return code: %d"),
    (4009, "Call to G2ConfigMgr_setDefaultConfigID(%d) failed. Return code: %d"),
];

/// `AddConfig`.
pub const ADD_CONFIG: Operation = Operation::new("AddConfig", 1, 4001, 1);
/// `Destroy`.
pub const DESTROY: Operation = Operation::new("Destroy", 3, 4002, 2);
/// `GetConfig`.
pub const GET_CONFIG: Operation = Operation::new("GetConfig", 5, 4003, 3);
/// `GetConfigList`.
pub const GET_CONFIG_LIST: Operation = Operation::new("GetConfigList", 7, 4004, 4);
/// `GetDefaultConfigID`.
pub const GET_DEFAULT_CONFIG_ID: Operation = Operation::new("GetDefaultConfigID", 9, 4005, 5);
/// `Init`.
pub const INIT: Operation = Operation::new("Init", 11, 4007, 6);
/// `ReplaceDefaultConfigID`.
pub const REPLACE_DEFAULT_CONFIG_ID: Operation =
    Operation::new("ReplaceDefaultConfigID", 13, 4008, 7);
/// `SetDefaultConfigID`.
pub const SET_DEFAULT_CONFIG_ID: Operation = Operation::new("SetDefaultConfigID", 15, 4009, 8);
/// `SetLogLevel`.
pub const SET_LOG_LEVEL: Operation = Operation::new("SetLogLevel", 17, 0, 0);

/// The configuration manager component.
pub static CONFIGMGR: Component = Component {
    name: "G2ConfigMgr",
    product_id: PRODUCT_ID,
    templates: TEMPLATES,
    init: INIT,
    destroy: DESTROY,
    set_log_level: SET_LOG_LEVEL,
};

// ---------------------------------------------------------------------------
// Native functions
// ---------------------------------------------------------------------------

/// Functions exported by the configuration manager library.
///
/// Each returns the native return code first.
pub trait ConfigMgrNative: NativeModule {
    /// Store a configuration document; yields its new id.
    fn add_config(&self, config: &str, comments: &str) -> (i64, i64);
    /// Fetch the document stored as `config_id`.
    fn get_config(&self, config_id: i64) -> (i64, String);
    /// JSON list of stored configurations.
    fn get_config_list(&self) -> (i64, String);
    /// Id of the default configuration, `0` when none is set.
    fn get_default_config_id(&self) -> (i64, i64);
    /// Compare-and-swap the default configuration id.
    fn replace_default_config_id(&self, old_config_id: i64, new_config_id: i64) -> i64;
    /// Set the default configuration id unconditionally.
    fn set_default_config_id(&self, config_id: i64) -> i64;
}

impl<N: ConfigMgrNative + ?Sized> ConfigMgrNative for Arc<N> {
    fn add_config(&self, config: &str, comments: &str) -> (i64, i64) {
        (**self).add_config(config, comments)
    }

    fn get_config(&self, config_id: i64) -> (i64, String) {
        (**self).get_config(config_id)
    }

    fn get_config_list(&self) -> (i64, String) {
        (**self).get_config_list()
    }

    fn get_default_config_id(&self) -> (i64, i64) {
        (**self).get_default_config_id()
    }

    fn replace_default_config_id(&self, old_config_id: i64, new_config_id: i64) -> i64 {
        (**self).replace_default_config_id(old_config_id, new_config_id)
    }

    fn set_default_config_id(&self, config_id: i64) -> i64 {
        (**self).set_default_config_id(config_id)
    }
}

// ---------------------------------------------------------------------------
// ConfigMgr
// ---------------------------------------------------------------------------

/// Typed wrapper over a [`ConfigMgrNative`] library.
#[derive(Debug)]
pub struct ConfigMgr<N> {
    binding: Binding<N>,
}

impl<N: ConfigMgrNative> ConfigMgr<N> {
    /// Wrap `native` with default settings.
    pub fn new(native: N) -> Self {
        Self::from_binding(Binding::new(native, &CONFIGMGR))
    }

    /// Wrap an already configured binding.
    pub fn from_binding(binding: Binding<N>) -> Self {
        Self { binding }
    }

    /// The underlying call shim (lifecycle, observers, metrics).
    pub fn binding(&self) -> &Binding<N> {
        &self.binding
    }

    /// Store `config` with free-form `comments`; returns the new id.
    pub fn add_config(&self, config: &str, comments: &str) -> Result<i64, G2Error> {
        let args = [config.to_string(), comments.to_string()];
        self.binding
            .invoke(&ADD_CONFIG, &args, |n| n.add_config(config, comments))
    }

    /// Fetch the configuration document stored as `config_id`.
    pub fn get_config(&self, config_id: i64) -> Result<String, G2Error> {
        self.binding
            .invoke(&GET_CONFIG, &[config_id.to_string()], |n| n.get_config(config_id))
    }

    /// JSON list of stored configurations.
    pub fn get_config_list(&self) -> Result<String, G2Error> {
        self.binding
            .invoke(&GET_CONFIG_LIST, &[], |n| n.get_config_list())
    }

    /// Id of the default configuration.
    pub fn get_default_config_id(&self) -> Result<i64, G2Error> {
        self.binding
            .invoke(&GET_DEFAULT_CONFIG_ID, &[], |n| n.get_default_config_id())
    }

    /// Replace the default id only if it is still `old_config_id`.
    pub fn replace_default_config_id(
        &self,
        old_config_id: i64,
        new_config_id: i64,
    ) -> Result<(), G2Error> {
        let args = [old_config_id.to_string(), new_config_id.to_string()];
        self.binding.invoke(&REPLACE_DEFAULT_CONFIG_ID, &args, |n| {
            (n.replace_default_config_id(old_config_id, new_config_id), ())
        })
    }

    /// Make `config_id` the default configuration.
    pub fn set_default_config_id(&self, config_id: i64) -> Result<(), G2Error> {
        self.binding
            .invoke(&SET_DEFAULT_CONFIG_ID, &[config_id.to_string()], |n| {
                (n.set_default_config_id(config_id), ())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FakeNative;
    use g2_error::ErrorCategory;

    fn mgr() -> ConfigMgr<FakeNative> {
        let mgr = ConfigMgr::new(FakeNative::new());
        mgr.binding().init().unwrap();
        mgr
    }

    #[test]
    fn templates_cover_every_operation() {
        let catalog = CONFIGMGR.catalog();
        for op in [
            ADD_CONFIG,
            DESTROY,
            GET_CONFIG,
            GET_CONFIG_LIST,
            GET_DEFAULT_CONFIG_ID,
            INIT,
            REPLACE_DEFAULT_CONFIG_ID,
            SET_DEFAULT_CONFIG_ID,
        ] {
            assert!(catalog.template(op.entry_id).is_some(), "{}", op.name);
            assert!(catalog.template(op.exit_id).is_some(), "{}", op.name);
            assert!(catalog.template(op.failure_id).is_some(), "{}", op.name);
        }
        assert!(catalog.template(SET_LOG_LEVEL.exit_id).is_some());
    }

    #[test]
    fn add_then_get() {
        let m = mgr();
        let id = m.add_config(r#"{"G2_CONFIG":{}}"#, "first").unwrap();
        assert_eq!(m.get_config(id).unwrap(), r#"{"G2_CONFIG":{}}"#);
        let list: serde_json::Value = serde_json::from_str(&m.get_config_list().unwrap()).unwrap();
        assert_eq!(list["CONFIGS"][0]["CONFIG_ID"], id);
        assert_eq!(list["CONFIGS"][0]["CONFIG_COMMENTS"], "first");
    }

    #[test]
    fn unknown_config_is_not_found() {
        let err = mgr().get_config(404).unwrap_err();
        assert!(err.is(ErrorCategory::NotFound));
        assert!(err.is_bad_user_input());
        assert!(err.message().contains("G2ConfigMgr_getConfig(404)"));
    }

    #[test]
    fn malformed_config_is_rejected() {
        let err = mgr().add_config("{not json", "").unwrap_err();
        assert!(err.is(ErrorCategory::MalformedJson));
    }

    #[test]
    fn default_id_lifecycle() {
        let m = mgr();
        assert_eq!(m.get_default_config_id().unwrap(), 0);
        let a = m.add_config("{}", "a").unwrap();
        let b = m.add_config("{}", "b").unwrap();
        m.set_default_config_id(a).unwrap();
        m.replace_default_config_id(a, b).unwrap();
        assert_eq!(m.get_default_config_id().unwrap(), b);
    }

    #[test]
    fn stale_replace_is_retryable() {
        let m = mgr();
        let a = m.add_config("{}", "a").unwrap();
        let b = m.add_config("{}", "b").unwrap();
        m.set_default_config_id(b).unwrap();
        let err = m.replace_default_config_id(a, b).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.context()["method"], "ReplaceDefaultConfigID");
    }

    #[test]
    fn calls_before_init_are_unrecoverable() {
        let m = ConfigMgr::new(FakeNative::new());
        let err = m.get_config_list().unwrap_err();
        assert!(err.is(ErrorCategory::ModuleNotInitialized));
        assert!(err.is_unrecoverable());
    }
}
