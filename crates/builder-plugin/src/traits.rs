//! Host-facing traits: the hook lookup surface and compiler plugins.
//!
//! A host exposes its lifecycle hooks through [`HookSource`]; each hook
//! accepts listeners through [`TapHook`]. Synchronous listeners return their
//! result directly, asynchronous listeners receive a trailing completion
//! callback that the host expects to be invoked exactly once.

use std::sync::Arc;

use builder_core::result::AppResult;

use crate::hooks::definitions::HookValue;

/// Positional arguments a hook is called with.
pub type HookArgs = Vec<HookValue>;

/// Result produced by a listener: a value, no value, or an error.
pub type HookOutcome = AppResult<Option<HookValue>>;

/// Listener registered with [`TapHook::tap`].
pub type SyncListener = Arc<dyn Fn(&[HookValue]) -> HookOutcome + Send + Sync>;

/// Completion callback handed to asynchronous listeners.
pub type HookCallback = Box<dyn FnOnce(HookOutcome) + Send>;

/// Listener registered with [`TapHook::tap_async`].
pub type AsyncListener = Arc<dyn Fn(HookArgs, HookCallback) + Send + Sync>;

/// Options supplied when tapping a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapOptions {
    /// Plugin identity the listener is registered under.
    pub name: String,
}

impl TapOptions {
    /// Creates tap options for the given plugin identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Registration surface of a single host hook.
pub trait TapHook: Send + Sync {
    /// Registers a synchronous listener.
    fn tap(&self, options: TapOptions, listener: SyncListener) -> AppResult<()>;

    /// Registers a listener completing through a trailing callback.
    fn tap_async(&self, options: TapOptions, listener: AsyncListener) -> AppResult<()>;
}

/// An object exposing lifecycle hooks keyed by camel-cased event name.
pub trait HookSource {
    /// Looks up a hook by name.
    fn hook(&self, name: &str) -> Option<&dyn TapHook>;
}

/// A plugin that binds listeners onto a hook source.
pub trait CompilerPlugin: Send + Sync + std::fmt::Debug {
    /// Returns the plugin identity.
    fn name(&self) -> &str;

    /// Binds the plugin's listeners onto the given hook source.
    fn apply(&mut self, source: &dyn HookSource) -> AppResult<()>;
}
