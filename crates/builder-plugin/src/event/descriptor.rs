//! Declarative descriptor consumed by [`CompilerEvent::new`](super::CompilerEvent::new).

use std::sync::Arc;

use super::handler::Handler;

/// Describes the handlers a [`CompilerEvent`](super::CompilerEvent) binds.
///
/// Events keep their declaration order. Declaring the same event name twice
/// appends to the existing entry; every handler is bound independently.
pub struct CompilerEventDescriptor<C = ()> {
    /// Plugin identity used when tapping host hooks.
    pub name: Option<String>,
    /// Context handed to every handler invocation.
    pub context: Option<Arc<C>>,
    /// Event name → handlers, in declaration order.
    pub events: Vec<(String, Vec<Handler<C>>)>,
}

impl<C> Default for CompilerEventDescriptor<C> {
    fn default() -> Self {
        Self {
            name: None,
            context: None,
            events: Vec::new(),
        }
    }
}

impl<C> std::fmt::Debug for CompilerEventDescriptor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let events: Vec<_> = self
            .events
            .iter()
            .map(|(name, handlers)| (name.as_str(), handlers.len()))
            .collect();
        f.debug_struct("CompilerEventDescriptor")
            .field("name", &self.name)
            .field("has_context", &self.context.is_some())
            .field("events", &events)
            .finish()
    }
}

impl<C> CompilerEventDescriptor<C> {
    /// Creates an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the plugin identity.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the shared handler context.
    pub fn context(mut self, context: Arc<C>) -> Self {
        self.context = Some(context);
        self
    }

    /// Declares a handler for an event.
    pub fn on(self, event: impl Into<String>, handler: Handler<C>) -> Self {
        self.on_all(event, [handler])
    }

    /// Declares several handlers for one event.
    pub fn on_all(
        mut self,
        event: impl Into<String>,
        handlers: impl IntoIterator<Item = Handler<C>>,
    ) -> Self {
        let event = event.into();
        match self.events.iter_mut().find(|(name, _)| *name == event) {
            Some((_, existing)) => existing.extend(handlers),
            None => self.events.push((event, handlers.into_iter().collect())),
        }
        self
    }
}
