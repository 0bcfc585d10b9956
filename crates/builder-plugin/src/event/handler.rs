//! User handlers and the invocation they receive.
//!
//! A handler may finish in three ways: by returning a value, by returning a
//! future, or by calling the completion sink. Returning `Err` models a
//! synchronous failure before anything was produced.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use builder_core::error::AppError;
use builder_core::result::AppResult;

use super::sink::CompletionSink;
use crate::hooks::definitions::HookValue;
use crate::traits::{HookArgs, HookOutcome};

/// Everything a handler receives for one hook call.
pub struct Invocation<C> {
    /// Camel-cased name of the hook being called.
    pub event: Arc<str>,
    /// Shared context supplied in the adapter descriptor.
    pub context: Option<Arc<C>>,
    /// The hook's positional arguments.
    pub args: HookArgs,
    /// Completion sink, usable instead of a return value.
    pub sink: CompletionSink,
}

impl<C> std::fmt::Debug for Invocation<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("event", &self.event)
            .field("has_context", &self.context.is_some())
            .field("args", &self.args)
            .field("sink", &self.sink)
            .finish()
    }
}

impl<C> Invocation<C> {
    /// Returns the positional argument at `index`.
    pub fn arg(&self, index: usize) -> Option<&HookValue> {
        self.args.get(index)
    }

    /// Returns the shared context or an error when none was supplied.
    pub fn require_context(&self) -> AppResult<Arc<C>> {
        self.context.clone().ok_or_else(|| {
            AppError::internal(format!(
                "Handler for '{}' requires a context but none was supplied",
                self.event
            ))
        })
    }
}

/// What a handler produced when it returned.
pub enum HandlerOutput {
    /// A plain value, or `None` for no value.
    Value(Option<HookValue>),
    /// A future settling later.
    Future(BoxFuture<'static, HookOutcome>),
    /// Nothing yet; the handler settles through its sink.
    Pending,
}

impl std::fmt::Debug for HandlerOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Future(_) => f.write_str("Future(<future>)"),
            Self::Pending => f.write_str("Pending"),
        }
    }
}

type HandlerFn<C> = dyn Fn(Invocation<C>) -> AppResult<HandlerOutput> + Send + Sync;

/// A user handler bound to a lifecycle event.
pub struct Handler<C = ()> {
    inner: Arc<HandlerFn<C>>,
}

impl<C> Clone for Handler<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C> std::fmt::Debug for Handler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("handler", &"<closure>")
            .finish()
    }
}

impl<C: Send + Sync + 'static> Handler<C> {
    /// Creates a handler from a closure returning a [`HandlerOutput`].
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(Invocation<C>) -> AppResult<HandlerOutput> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(handler),
        }
    }

    /// Creates a handler that returns its value directly.
    pub fn returning<F>(handler: F) -> Self
    where
        F: Fn(Invocation<C>) -> AppResult<Option<HookValue>> + Send + Sync + 'static,
    {
        Self::new(move |invocation| handler(invocation).map(HandlerOutput::Value))
    }

    /// Creates a handler returning a future.
    pub fn future<F, Fut>(handler: F) -> Self
    where
        F: Fn(Invocation<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookOutcome> + Send + 'static,
    {
        Self::new(move |invocation| Ok(HandlerOutput::Future(Box::pin(handler(invocation)))))
    }

    /// Creates a handler that settles only through its completion sink.
    pub fn callback<F>(handler: F) -> Self
    where
        F: Fn(Invocation<C>) + Send + Sync + 'static,
    {
        Self::new(move |invocation| {
            handler(invocation);
            Ok(HandlerOutput::Pending)
        })
    }

    /// Runs the handler.
    pub(crate) fn invoke(&self, invocation: Invocation<C>) -> AppResult<HandlerOutput> {
        (self.inner)(invocation)
    }
}
