//! Host hook storing listeners for one lifecycle point in registration order.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use builder_core::error::AppError;
use builder_core::result::AppResult;

use super::definitions::HookDiscipline;
use crate::traits::{AsyncListener, SyncListener, TapHook, TapOptions};

/// A registered listener.
#[derive(Clone)]
pub(crate) enum TapFn {
    /// Returns its result directly.
    Sync(SyncListener),
    /// Completes through a callback.
    Async(AsyncListener),
}

/// Entry in a hook's tap list.
#[derive(Clone)]
pub(crate) struct TapEntry {
    /// Plugin identity that registered the listener.
    pub(crate) plugin: String,
    /// The listener.
    pub(crate) listener: TapFn,
}

/// A single lifecycle hook of the in-process engine.
///
/// Listeners run in the order they were tapped.
pub struct Hook {
    /// Camel-cased hook name.
    name: String,
    /// Calling convention.
    discipline: HookDiscipline,
    /// Registered listeners.
    taps: Mutex<Vec<TapEntry>>,
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("discipline", &self.discipline)
            .field("taps", &self.tap_count())
            .finish()
    }
}

impl Hook {
    /// Creates a hook with no listeners.
    pub fn new(name: impl Into<String>, discipline: HookDiscipline) -> Self {
        Self {
            name: name.into(),
            discipline,
            taps: Mutex::new(Vec::new()),
        }
    }

    /// Returns the hook name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the hook's calling convention.
    pub fn discipline(&self) -> HookDiscipline {
        self.discipline
    }

    /// Returns the number of registered listeners.
    pub fn tap_count(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether any listener is registered.
    pub fn is_tapped(&self) -> bool {
        self.tap_count() > 0
    }

    /// Returns the plugin identities of all listeners, in call order.
    pub fn plugins(&self) -> Vec<String> {
        self.lock().iter().map(|t| t.plugin.clone()).collect()
    }

    /// Removes every listener registered by a plugin.
    pub fn untap_plugin(&self, plugin: &str) -> usize {
        let mut taps = self.lock();
        let before = taps.len();
        taps.retain(|t| t.plugin != plugin);
        let removed = before - taps.len();

        if removed > 0 {
            info!(hook = %self.name, plugin = %plugin, removed, "Listeners removed");
        }
        removed
    }

    /// Clones the current tap list so listeners run without holding the lock.
    pub(crate) fn snapshot(&self) -> Vec<TapEntry> {
        self.lock().clone()
    }

    fn push(&self, options: TapOptions, listener: TapFn) {
        let kind = match listener {
            TapFn::Sync(_) => "sync",
            TapFn::Async(_) => "async",
        };
        self.lock().push(TapEntry {
            plugin: options.name.clone(),
            listener,
        });

        debug!(
            hook = %self.name,
            plugin = %options.name,
            kind,
            "Listener tapped"
        );
    }

    fn lock(&self) -> MutexGuard<'_, Vec<TapEntry>> {
        self.taps.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TapHook for Hook {
    fn tap(&self, options: TapOptions, listener: SyncListener) -> AppResult<()> {
        self.push(options, TapFn::Sync(listener));
        Ok(())
    }

    fn tap_async(&self, options: TapOptions, listener: AsyncListener) -> AppResult<()> {
        if !self.discipline.is_async() {
            return Err(AppError::hook(format!(
                "Hook '{}' is {} and cannot take an async listener from '{}'",
                self.name, self.discipline, options.name
            )));
        }
        self.push(options, TapFn::Async(listener));
        Ok(())
    }
}
