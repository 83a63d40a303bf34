// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod configmgr;
pub mod fake;

pub use fake::FakeNative;

use g2_config::EngineConfig;
use g2_error::{G2Error, error_code};
use g2_telemetry::{
    CallCollector, CallRecord, Level, MessageCatalog, Notification, Observer, Subject,
    TelemetryError,
};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard};
use std::time::{Duration, Instant};
use tracing::debug;

// ---------------------------------------------------------------------------
// Native boundary
// ---------------------------------------------------------------------------

/// The opaque engine library behind one component.
///
/// Every function reports success with a return code of `0`. On failure the
/// engine keeps a last-exception text (and code) until it is cleared.
pub trait NativeModule: Send + Sync {
    /// Initialise the component.
    fn init(&self, module_name: &str, ini_params: &str, verbose_logging: i64) -> i64;

    /// Release the component. No other call is valid afterwards.
    fn destroy(&self) -> i64;

    /// Text of the last exception, e.g. `0033E|Unknown config id`.
    fn last_exception(&self) -> String;

    /// Numeric code of the last exception; `0` when the engine does not know.
    fn last_exception_code(&self) -> i64;

    /// Forget the last exception.
    fn clear_last_exception(&self);
}

impl<N: NativeModule + ?Sized> NativeModule for Arc<N> {
    fn init(&self, module_name: &str, ini_params: &str, verbose_logging: i64) -> i64 {
        (**self).init(module_name, ini_params, verbose_logging)
    }

    fn destroy(&self) -> i64 {
        (**self).destroy()
    }

    fn last_exception(&self) -> String {
        (**self).last_exception()
    }

    fn last_exception_code(&self) -> i64 {
        (**self).last_exception_code()
    }

    fn clear_last_exception(&self) {
        (**self).clear_last_exception()
    }
}

// ---------------------------------------------------------------------------
// Operation / Component
// ---------------------------------------------------------------------------

/// Message ids used by one binding method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Method name as exposed to callers, e.g. `GetConfig`.
    pub name: &'static str,
    /// Trace template logged on entry.
    pub entry_id: u32,
    /// Trace template logged on exit.
    pub exit_id: u32,
    /// Error template used to describe a failed call.
    pub failure_id: u32,
    /// `messageId` of the notification sent to observers.
    pub notify_id: u32,
}

impl Operation {
    /// Describe a method whose exit template directly follows its entry template.
    pub const fn new(name: &'static str, entry_id: u32, failure_id: u32, notify_id: u32) -> Self {
        Self {
            name,
            entry_id,
            exit_id: entry_id + 1,
            failure_id,
            notify_id,
        }
    }
}

/// Static description of a binding component.
#[derive(Debug)]
pub struct Component {
    /// Native library prefix, e.g. `G2ConfigMgr`.
    pub name: &'static str,
    /// Product id used in message ids and notifications.
    pub product_id: u32,
    /// Numbered message templates.
    pub templates: &'static [(u32, &'static str)],
    /// Component initialisation.
    pub init: Operation,
    /// Component teardown.
    pub destroy: Operation,
    /// Log level change (trace only, never notified).
    pub set_log_level: Operation,
}

impl Component {
    /// Fresh message catalog for this component.
    pub fn catalog(&self) -> MessageCatalog {
        MessageCatalog::new(self.product_id, self.templates)
    }
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

/// Call shim around a [`NativeModule`].
pub struct Binding<N> {
    native: N,
    component: &'static Component,
    catalog: RwLock<MessageCatalog>,
    subject: Subject,
    metrics: CallCollector,
    config: EngineConfig,
}

impl<N> std::fmt::Debug for Binding<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("component", &self.component.name)
            .field("level", &self.catalog.read().ok().map(|c| c.level()))
            .field("observers", &self.subject)
            .finish_non_exhaustive()
    }
}

impl<N: NativeModule> Binding<N> {
    /// Wrap `native` as `component` with default settings.
    pub fn new(native: N, component: &'static Component) -> Self {
        Self {
            native,
            component,
            catalog: RwLock::new(component.catalog()),
            subject: Subject::new(),
            metrics: CallCollector::new(),
            config: EngineConfig::default(),
        }
    }

    /// Use `config` for [`Binding::init`] and its log level for the catalog.
    pub fn with_config(mut self, config: &EngineConfig) -> Result<Self, TelemetryError> {
        if let Some(level) = config.log_level.as_deref() {
            let level: Level = level.parse()?;
            self.catalog
                .get_mut()
                .expect("catalog lock poisoned")
                .set_level(level);
        }
        self.config = config.clone();
        Ok(self)
    }

    /// The wrapped engine library.
    pub fn native(&self) -> &N {
        &self.native
    }

    /// Static description of the wrapped component.
    pub fn component(&self) -> &'static Component {
        self.component
    }

    /// Settings used by [`Binding::init`].
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Per-call metrics. Cloning the collector shares its storage.
    pub fn metrics(&self) -> &CallCollector {
        &self.metrics
    }

    /// Current catalog level.
    pub fn log_level(&self) -> Level {
        self.catalog().level()
    }

    /// Whether method entry and exit are traced.
    pub fn is_trace(&self) -> bool {
        self.log_level() == Level::Trace
    }

    fn catalog(&self) -> RwLockReadGuard<'_, MessageCatalog> {
        self.catalog.read().expect("catalog lock poisoned")
    }

    // -- Observers --

    /// Start notifying `observer` after every call.
    pub fn register_observer(&self, observer: Arc<dyn Observer>) -> Result<(), TelemetryError> {
        self.subject.register(observer)
    }

    /// Stop notifying the observer registered as `id`.
    pub fn unregister_observer(&self, id: &str) -> Result<(), TelemetryError> {
        self.subject.unregister(id)
    }

    // -- Lifecycle --

    /// Change the catalog level. Entry is traced under the old level, exit
    /// under the new one.
    pub fn set_log_level(&self, level: Level) {
        let op = self.component.set_log_level;
        let args = vec![level.to_string()];
        if self.is_trace() {
            self.catalog().log(op.entry_id, &args);
        }
        self.catalog
            .write()
            .expect("catalog lock poisoned")
            .set_level(level);
        if self.is_trace() {
            self.catalog().log(op.exit_id, &with_outcome(&args, "ok"));
        }
    }

    /// Initialise the component with the configured settings.
    pub fn init(&self) -> Result<(), G2Error> {
        let module_name = self.config.module_name.as_str();
        let ini_params = self.config.ini_params.as_deref().unwrap_or("{}");
        let verbose = self.config.verbose_logging;
        let args = vec![
            module_name.to_string(),
            ini_params.to_string(),
            verbose.to_string(),
        ];
        let details = BTreeMap::from([
            ("iniParams".to_string(), ini_params.to_string()),
            ("moduleName".to_string(), module_name.to_string()),
            ("verboseLogging".to_string(), verbose.to_string()),
        ]);
        self.run(&self.component.init, &args, details, |n| {
            (n.init(module_name, ini_params, verbose), ())
        })
    }

    /// Release the component.
    pub fn destroy(&self) -> Result<(), G2Error> {
        self.invoke(&self.component.destroy, &[], |n| (n.destroy(), ()))
    }

    // -- Calls --

    /// Run one native call described by `op`.
    ///
    /// `call` returns the native return code together with the produced
    /// value; the value is handed back only when the code is `0`.
    pub fn invoke<T>(
        &self,
        op: &Operation,
        args: &[String],
        call: impl FnOnce(&N) -> (i64, T),
    ) -> Result<T, G2Error> {
        self.run(op, args, BTreeMap::new(), call)
    }

    fn run<T>(
        &self,
        op: &Operation,
        args: &[String],
        mut details: BTreeMap<String, String>,
        call: impl FnOnce(&N) -> (i64, T),
    ) -> Result<T, G2Error> {
        let trace = self.is_trace();
        if trace {
            self.catalog().log(op.entry_id, args);
        }

        let started = Instant::now();
        let (return_code, value) = call(&self.native);
        let elapsed = started.elapsed();

        let outcome = if return_code == 0 {
            Ok(value)
        } else {
            Err(self.new_error(op, args, return_code, elapsed))
        };

        self.metrics.record(CallRecord {
            method: op.name.to_string(),
            duration_us: elapsed.as_micros() as u64,
            failed: outcome.is_err(),
            categories: match &outcome {
                Ok(_) => Vec::new(),
                Err(e) => e.categories().iter().map(|c| c.to_string()).collect(),
            },
        });

        if !self.subject.is_empty() {
            if let Err(e) = &outcome {
                details.insert("error".into(), e.to_string());
            }
            self.notify(op.notify_id, details);
        }

        if trace {
            let result = match &outcome {
                Ok(_) => "ok".to_string(),
                Err(e) => e.to_string(),
            };
            self.catalog().log(op.exit_id, &with_outcome(args, &result));
        }
        outcome
    }

    /// Classify the engine's pending exception and clear it.
    fn new_error(
        &self,
        op: &Operation,
        args: &[String],
        return_code: i64,
        elapsed: Duration,
    ) -> G2Error {
        let raw = self.native.last_exception();
        let code = match self.native.last_exception_code() {
            0 => error_code(&raw),
            code => code,
        };
        self.native.clear_last_exception();

        let catalog = self.catalog();
        let failure = catalog.log(op.failure_id, &with_outcome(args, &return_code.to_string()));
        let raw = raw.trim();
        let message = if raw.is_empty() {
            failure
        } else {
            format!("{failure}: {raw}")
        };

        G2Error::build(code, message)
            .with_context("method", op.name)
            .with_context("message_id", catalog.message_id(op.failure_id))
            .with_context("return_code", return_code)
            .with_context("duration_ms", elapsed.as_millis() as u64)
    }

    fn notify(&self, message_id: u32, details: BTreeMap<String, String>) {
        let mut notification = Notification::new(self.component.product_id, message_id);
        notification.details = details;
        match notification.to_json() {
            Ok(json) => self.subject.notify(&json),
            Err(e) => debug!(target: "g2", error = %e, "dropping notification"),
        }
    }
}

fn with_outcome(args: &[String], outcome: &str) -> Vec<String> {
    let mut out = args.to_vec();
    out.push(outcome.to_string());
    out
}
