//! Completion sink letting a handler finish by callback instead of by return.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use builder_core::error::AppError;

use crate::hooks::definitions::HookValue;
use crate::traits::HookOutcome;

enum SinkSlot {
    /// Delivers the first outcome to a waiting receiver.
    Forward(Option<oneshot::Sender<HookOutcome>>),
    /// Keeps the first outcome for the caller to read back.
    Capture(Option<HookOutcome>, bool),
}

/// A completion function handed to every handler invocation.
///
/// Only the first call has an effect; later calls are ignored and report
/// `false`. Clones share the same slot.
#[derive(Clone)]
pub struct CompletionSink {
    slot: Arc<Mutex<SinkSlot>>,
}

impl std::fmt::Debug for CompletionSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionSink")
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl CompletionSink {
    /// Creates a sink forwarding its outcome to the returned receiver.
    ///
    /// The receiver fails once every clone of the sink is dropped unused.
    pub(crate) fn forwarding() -> (Self, oneshot::Receiver<HookOutcome>) {
        let (tx, rx) = oneshot::channel();
        let sink = Self {
            slot: Arc::new(Mutex::new(SinkSlot::Forward(Some(tx)))),
        };
        (sink, rx)
    }

    /// Creates a sink that only records its outcome.
    pub(crate) fn capturing() -> Self {
        Self {
            slot: Arc::new(Mutex::new(SinkSlot::Capture(None, false))),
        }
    }

    /// Completes with an outcome. Returns `false` if the sink was already used.
    pub fn complete(&self, outcome: HookOutcome) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *slot {
            SinkSlot::Forward(sender) => match sender.take() {
                Some(tx) => {
                    // The receiver may already be gone once the handler's own
                    // result won; the call still counts as the first.
                    let _ = tx.send(outcome);
                    true
                }
                None => false,
            },
            SinkSlot::Capture(captured, used) => {
                if *used {
                    return false;
                }
                *used = true;
                *captured = Some(outcome);
                true
            }
        }
    }

    /// Completes successfully with a value.
    pub fn resolve(&self, value: HookValue) -> bool {
        self.complete(Ok(Some(value)))
    }

    /// Completes successfully without a value.
    pub fn finish(&self) -> bool {
        self.complete(Ok(None))
    }

    /// Completes with an error.
    pub fn reject(&self, error: AppError) -> bool {
        self.complete(Err(error))
    }

    /// Returns whether the sink has been used.
    pub fn is_settled(&self) -> bool {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match &*slot {
            SinkSlot::Forward(sender) => sender.is_none(),
            SinkSlot::Capture(_, used) => *used,
        }
    }

    /// Takes the captured outcome of a capturing sink.
    pub(crate) fn take_captured(&self) -> Option<HookOutcome> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *slot {
            SinkSlot::Capture(captured, _) => captured.take(),
            SinkSlot::Forward(_) => None,
        }
    }
}
