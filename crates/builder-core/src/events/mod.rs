//! Domain events emitted by the builder.
//!
//! Events are published on the builder's local emitter and, for the
//! compile-done signal, mirrored to the parent process over IPC.

pub mod compile;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use compile::{BuildOutcome, EVENT_COMPILE_DONE, IpcMessage};

/// Wrapper for all builder events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: BuilderEvent,
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(payload: BuilderEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Events published on the builder emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuilderEvent {
    /// A service finished initialization and was registered.
    ServiceRegistered {
        /// Service name.
        name: String,
    },
    /// A full compiler run finished.
    CompileDone {
        /// `0` when the build had no errors, `1` otherwise.
        code: u8,
    },
}

impl BuilderEvent {
    /// Returns the event name used on the emitter and over IPC.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ServiceRegistered { .. } => "service-registered",
            Self::CompileDone { .. } => EVENT_COMPILE_DONE,
        }
    }
}
