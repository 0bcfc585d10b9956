//! Hook dispatch: calls a hook's listeners according to its discipline.
//!
//! For `Sync` hooks:
//! - Every listener is called in registration order; return values are discarded.
//!
//! For `SyncBail` hooks:
//! - Listeners are called in order until one yields a value; that value is the result.
//!
//! For `AsyncSeries` hooks:
//! - Listeners are called in order, each awaited through its completion callback.
//! - The first error stops the series.
//!
//! Any listener error stops dispatch and is returned to the caller.

use tokio::sync::oneshot;
use tracing::{debug, warn};

use builder_core::error::AppError;
use builder_core::result::AppResult;

use super::definitions::{HookDiscipline, HookValue};
use super::hook::{Hook, TapEntry, TapFn};
use crate::traits::{HookArgs, HookOutcome};

impl Hook {
    /// Calls a synchronous hook.
    ///
    /// Returns the bail value for `SyncBail` hooks and `None` for `Sync`
    /// hooks. Calling an `AsyncSeries` hook this way is an error.
    pub fn call(&self, args: &[HookValue]) -> HookOutcome {
        if self.discipline().is_async() {
            return Err(AppError::hook(format!(
                "Hook '{}' is {} and must be called with call_async",
                self.name(),
                self.discipline()
            )));
        }

        let taps = self.snapshot();
        if taps.is_empty() {
            return Ok(None);
        }

        debug!(
            hook = %self.name(),
            listeners = taps.len(),
            "Calling hook"
        );

        let bail = self.discipline() == HookDiscipline::SyncBail;
        for tap in &taps {
            let TapFn::Sync(listener) = &tap.listener else {
                continue;
            };

            let result = listener(args).inspect_err(|e| {
                warn!(hook = %self.name(), plugin = %tap.plugin, error = %e, "Listener failed");
            })?;

            if bail {
                if let Some(value) = result {
                    debug!(
                        hook = %self.name(),
                        plugin = %tap.plugin,
                        "Listener bailed"
                    );
                    return Ok(Some(value));
                }
            }
        }

        Ok(None)
    }

    /// Calls a hook from async code.
    ///
    /// `AsyncSeries` listeners run one after another; synchronous hooks are
    /// delegated to [`Hook::call`].
    pub async fn call_async(&self, args: HookArgs) -> AppResult<()> {
        if !self.discipline().is_async() {
            return self.call(&args).map(|_| ());
        }

        let taps = self.snapshot();
        if taps.is_empty() {
            return Ok(());
        }

        debug!(
            hook = %self.name(),
            listeners = taps.len(),
            "Calling async series hook"
        );

        for tap in &taps {
            self.call_tap(tap, &args).await.inspect_err(|e| {
                warn!(hook = %self.name(), plugin = %tap.plugin, error = %e, "Listener failed");
            })?;
        }

        Ok(())
    }

    async fn call_tap(&self, tap: &TapEntry, args: &HookArgs) -> HookOutcome {
        match &tap.listener {
            TapFn::Sync(listener) => listener(args.as_slice()),
            TapFn::Async(listener) => {
                let (tx, rx) = oneshot::channel();
                listener(
                    args.clone(),
                    Box::new(move |outcome| {
                        let _ = tx.send(outcome);
                    }),
                );

                rx.await.unwrap_or_else(|_| {
                    Err(AppError::hook(format!(
                        "Listener '{}' on hook '{}' dropped its completion callback",
                        tap.plugin,
                        self.name()
                    )))
                })
            }
        }
    }
}
