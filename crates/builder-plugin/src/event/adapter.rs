//! Compiler event adapter. Binds uniform handlers onto host lifecycle hooks.
//!
//! The adapter is activated once: `apply` consumes the handler table and
//! moves the adapter from unbound to bound. A second `apply` is rejected.

use std::sync::Arc;

use tracing::{debug, info, warn};

use builder_core::error::AppError;
use builder_core::result::AppResult;

use super::binding::EventBinding;
use super::descriptor::CompilerEventDescriptor;
use super::handler::Handler;
use crate::hooks::definitions::{HookDiscipline, HookRegistry, camelize};
use crate::traits::{CompilerPlugin, HookSource};

/// Plugin identity used when the descriptor supplies none.
pub const DEFAULT_PLUGIN_NAME: &str = "BuilderWebpackPlugin";

/// Handler table lifecycle.
enum AdapterState<C> {
    /// Handlers waiting for `apply`.
    Unbound(Vec<(String, Vec<Handler<C>>)>),
    /// Handlers have been bound and the table discarded.
    Bound,
}

/// One listener registered by `apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundEvent {
    /// Event name as declared.
    pub event: String,
    /// Camel-cased hook name the listener was tapped on.
    pub hook: String,
    /// Discipline the listener was bound with.
    pub discipline: HookDiscipline,
}

/// Outcome of [`CompilerEvent::apply`].
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    /// Listeners registered, one per handler.
    pub bound: Vec<BoundEvent>,
    /// Declared events that were not bound.
    pub skipped: Vec<String>,
}

impl ApplyReport {
    /// Returns the number of listeners registered.
    pub fn bound_count(&self) -> usize {
        self.bound.len()
    }

    /// Returns the number of listeners registered on a hook.
    pub fn count_for(&self, hook: &str) -> usize {
        self.bound.iter().filter(|b| b.hook == hook).count()
    }
}

/// Adapter binding a descriptor's handlers onto a hook source.
pub struct CompilerEvent<C = ()> {
    /// Identity listeners are tapped under.
    plugin_name: String,
    /// Context passed to every handler.
    context: Option<Arc<C>>,
    /// Handler table.
    state: AdapterState<C>,
}

impl<C> std::fmt::Debug for CompilerEvent<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilerEvent")
            .field("plugin_name", &self.plugin_name)
            .field("has_context", &self.context.is_some())
            .field("pending_bindings", &self.pending_bindings())
            .finish()
    }
}

impl<C> CompilerEvent<C> {
    /// Returns the plugin identity.
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// Returns the shared handler context.
    pub fn context(&self) -> Option<&Arc<C>> {
        self.context.as_ref()
    }

    /// Returns whether `apply` has run.
    pub fn is_bound(&self) -> bool {
        matches!(self.state, AdapterState::Bound)
    }

    /// Returns the number of handlers still waiting to be bound.
    pub fn pending_bindings(&self) -> usize {
        match &self.state {
            AdapterState::Unbound(events) => events.iter().map(|(_, h)| h.len()).sum(),
            AdapterState::Bound => 0,
        }
    }
}

impl<C: Send + Sync + 'static> CompilerEvent<C> {
    /// Creates an unbound adapter. Event names are not validated here.
    pub fn new(descriptor: CompilerEventDescriptor<C>) -> Self {
        let CompilerEventDescriptor {
            name,
            context,
            events,
        } = descriptor;

        Self {
            plugin_name: name.unwrap_or_else(|| DEFAULT_PLUGIN_NAME.to_string()),
            context,
            state: AdapterState::Unbound(events),
        }
    }

    /// Binds every handler for a known event onto the source's hooks.
    ///
    /// Unknown events, and known events the source has no hook for, are
    /// skipped without error. Fails if the adapter was already applied or
    /// the host refuses a listener.
    pub fn apply(&mut self, source: &dyn HookSource) -> AppResult<ApplyReport> {
        let events = match std::mem::replace(&mut self.state, AdapterState::Bound) {
            AdapterState::Unbound(events) => events,
            AdapterState::Bound => {
                return Err(AppError::plugin(format!(
                    "Compiler event plugin '{}' has already been applied",
                    self.plugin_name
                )));
            }
        };

        let mut report = ApplyReport::default();
        for (event, handlers) in events {
            let Some(discipline) = HookRegistry::discipline_of(&event) else {
                debug!(
                    plugin = %self.plugin_name,
                    event = %event,
                    "Skipping unknown compiler event"
                );
                report.skipped.push(event);
                continue;
            };

            let hook_name: Arc<str> = Arc::from(camelize(&event).as_ref());
            let Some(hook) = source.hook(&hook_name) else {
                warn!(
                    plugin = %self.plugin_name,
                    hook = %hook_name,
                    "Host exposes no hook for this event, skipping"
                );
                report.skipped.push(event);
                continue;
            };

            let count = handlers.len();
            for handler in handlers {
                let binding = EventBinding {
                    hook_name: hook_name.clone(),
                    discipline,
                    handler,
                    plugin_identity: self.plugin_name.clone(),
                    context: self.context.clone(),
                };
                binding.tap_onto(hook)?;
                report.bound.push(BoundEvent {
                    event: event.clone(),
                    hook: hook_name.to_string(),
                    discipline,
                });
            }

            info!(
                plugin = %self.plugin_name,
                hook = %hook_name,
                discipline = %discipline,
                handlers = count,
                "Compiler event bound"
            );
        }

        Ok(report)
    }
}

impl<C: Send + Sync + 'static> CompilerPlugin for CompilerEvent<C> {
    fn name(&self) -> &str {
        &self.plugin_name
    }

    fn apply(&mut self, source: &dyn HookSource) -> AppResult<()> {
        CompilerEvent::apply(self, source).map(|_| ())
    }
}
