// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! g2-telemetry
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod metrics;
pub mod observer;

pub use catalog::{Level, MessageCatalog, format_template};
pub use metrics::{CallCollector, CallRecord, CallSummary};
pub use observer::{ChannelObserver, Notification, Observer, RecordingObserver, Subject};

/// Errors raised by the telemetry plumbing itself.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// An observer with the same id is already registered.
    #[error("observer already registered: {id}")]
    DuplicateObserver {
        /// Offending observer id.
        id: String,
    },

    /// No observer with this id is registered.
    #[error("observer not registered: {id}")]
    UnknownObserver {
        /// Requested observer id.
        id: String,
    },

    /// A log level name was not recognised.
    #[error("unknown log level: {name}")]
    UnknownLevel {
        /// The rejected name.
        name: String,
    },

    /// A notification could not be encoded as JSON.
    #[error("failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),
}
