// SPDX-License-Identifier: MIT OR Apache-2.0
//! Observer registration and per-call notifications.

use crate::TelemetryError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::debug;

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// Receiver of binding notifications.
///
/// `update` runs on the thread that completed the native call, so
/// implementations must not block.
pub trait Observer: Send + Sync {
    /// Unique identity used for registration.
    fn id(&self) -> &str;

    /// Deliver one JSON-encoded [`Notification`].
    fn update(&self, message: &str);
}

/// Forwards notifications over an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    id: String,
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelObserver {
    /// Create an observer and the receiving half of its channel.
    pub fn channel(id: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id: id.into(), tx }, rx)
    }
}

impl Observer for ChannelObserver {
    fn id(&self) -> &str {
        &self.id
    }

    fn update(&self, message: &str) {
        if self.tx.send(message.to_string()).is_err() {
            debug!(target: "g2", observer = %self.id, "observer receiver dropped");
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    id: String,
    messages: Mutex<Vec<String>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Notifications received so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("observer lock poisoned").clone()
    }
}

impl Observer for RecordingObserver {
    fn id(&self) -> &str {
        &self.id
    }

    fn update(&self, message: &str) {
        self.messages
            .lock()
            .expect("observer lock poisoned")
            .push(message.to_string());
    }
}

// ---------------------------------------------------------------------------
// Subject
// ---------------------------------------------------------------------------

/// Set of registered observers. Cloning shares the registry.
#[derive(Clone, Default)]
pub struct Subject {
    observers: Arc<RwLock<Vec<Arc<dyn Observer>>>>,
}

impl std::fmt::Debug for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("observers", &self.ids())
            .finish()
    }
}

impl Subject {
    /// An empty subject.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer`; ids must be unique.
    pub fn register(&self, observer: Arc<dyn Observer>) -> Result<(), TelemetryError> {
        let mut observers = self.observers.write().expect("subject lock poisoned");
        if observers.iter().any(|o| o.id() == observer.id()) {
            return Err(TelemetryError::DuplicateObserver {
                id: observer.id().to_string(),
            });
        }
        observers.push(observer);
        Ok(())
    }

    /// Remove the observer registered as `id`.
    pub fn unregister(&self, id: &str) -> Result<(), TelemetryError> {
        let mut observers = self.observers.write().expect("subject lock poisoned");
        let before = observers.len();
        observers.retain(|o| o.id() != id);
        if observers.len() == before {
            return Err(TelemetryError::UnknownObserver { id: id.to_string() });
        }
        Ok(())
    }

    /// Ids of registered observers, in registration order.
    pub fn ids(&self) -> Vec<String> {
        let observers = self.observers.read().expect("subject lock poisoned");
        observers.iter().map(|o| o.id().to_string()).collect()
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.read().expect("subject lock poisoned").len()
    }

    /// Whether no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `message` to every observer registered when the call starts.
    ///
    /// The registry lock is released before delivery, so observers may
    /// register or unregister from inside `update`.
    pub fn notify(&self, message: &str) {
        let observers: Vec<Arc<dyn Observer>> = self
            .observers
            .read()
            .expect("subject lock poisoned")
            .clone();
        for o in &observers {
            o.update(message);
        }
    }
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// Payload sent to observers after a binding call.
///
/// Serialises to a flat JSON object of strings:
/// `{"subjectId":"6002","messageId":"1","messageTime":"...","error":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Product id of the emitting component.
    #[serde(rename = "subjectId")]
    pub subject_id: String,
    /// Operation-specific message number.
    #[serde(rename = "messageId")]
    pub message_id: String,
    /// Emission time, nanoseconds since the Unix epoch.
    #[serde(rename = "messageTime")]
    pub message_time: String,
    /// Extra details, e.g. `error`.
    #[serde(flatten)]
    pub details: BTreeMap<String, String>,
}

impl Notification {
    /// Create a notification stamped with the current time.
    pub fn new(product_id: u32, message_id: u32) -> Self {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        Self {
            subject_id: product_id.to_string(),
            message_id: message_id.to_string(),
            message_time: nanos.to_string(),
            details: BTreeMap::new(),
        }
    }

    /// Add a detail entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Encode as compact JSON.
    pub fn to_json(&self) -> Result<String, TelemetryError> {
        Ok(serde_json::to_string(self)?)
    }
}
