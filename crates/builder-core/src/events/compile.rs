//! Compile lifecycle events and their wire format.

use serde::{Deserialize, Serialize};

/// Tag identifying the compile-done message on the emitter and over IPC.
pub const EVENT_COMPILE_DONE: &str = "compile-done";

/// Result of a full compiler run as reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildOutcome {
    /// The build finished with zero errors.
    Success,
    /// The build finished with one or more errors.
    Failed,
}

impl BuildOutcome {
    /// Derives the outcome from whether the build produced errors.
    pub fn from_has_errors(has_errors: bool) -> Self {
        if has_errors {
            Self::Failed
        } else {
            Self::Success
        }
    }

    /// Returns the process exit code: `0` for success, `1` for failure.
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failed => 1,
        }
    }
}

/// A message sent to the parent process.
///
/// Serialized as `{"type": ..., "data": ...}` with the fields in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcMessage {
    /// Message tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Message payload.
    pub data: serde_json::Value,
}

impl IpcMessage {
    /// Creates the compile-done message carrying the build exit code.
    pub fn compile_done(outcome: BuildOutcome) -> Self {
        Self {
            kind: EVENT_COMPILE_DONE.to_string(),
            data: serde_json::json!(outcome.code()),
        }
    }
}
