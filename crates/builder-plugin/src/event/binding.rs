//! Event binding: turns one user handler into a host listener.
//!
//! Synchronous hooks get a listener that returns the handler's value, or the
//! value captured by its sink when the handler returned nothing.
//!
//! Async-series hooks get a listener that races the handler's own result
//! against its completion sink and forwards whichever settles first to the
//! host callback. The callback is consumed on delivery, so it runs exactly
//! once, including when the handler fails, panics, or drops its sink.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture, Either};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, warn};

use builder_core::error::AppError;
use builder_core::result::AppResult;

use super::handler::{Handler, HandlerOutput, Invocation};
use super::sink::CompletionSink;
use crate::hooks::definitions::{HookDiscipline, HookValue};
use crate::traits::{
    AsyncListener, HookArgs, HookCallback, HookOutcome, SyncListener, TapHook, TapOptions,
};

/// One handler bound to one lifecycle event.
pub(crate) struct EventBinding<C> {
    /// Camel-cased hook name.
    pub(crate) hook_name: Arc<str>,
    /// Calling convention of the hook.
    pub(crate) discipline: HookDiscipline,
    /// The user handler.
    pub(crate) handler: Handler<C>,
    /// Identity the listener is tapped under.
    pub(crate) plugin_identity: String,
    /// Shared context passed to the handler.
    pub(crate) context: Option<Arc<C>>,
}

/// State of an async handler right after it returned.
enum Settlement {
    /// Already settled; deliver now.
    Ready(HookOutcome),
    /// Still running; await, then deliver.
    Waiting(BoxFuture<'static, HookOutcome>),
}

impl<C: Send + Sync + 'static> EventBinding<C> {
    /// Registers the listener on the host hook using the binding's discipline.
    pub(crate) fn tap_onto(self, hook: &dyn TapHook) -> AppResult<()> {
        let options = TapOptions::new(self.plugin_identity.clone());
        match self.discipline {
            HookDiscipline::Sync | HookDiscipline::SyncBail => {
                hook.tap(options, self.into_sync_listener())
            }
            HookDiscipline::AsyncSeries => hook.tap_async(options, self.into_async_listener()),
        }
    }

    fn invocation(&self, args: HookArgs, sink: CompletionSink) -> Invocation<C> {
        Invocation {
            event: self.hook_name.clone(),
            context: self.context.clone(),
            args,
            sink,
        }
    }

    fn into_sync_listener(self) -> SyncListener {
        Arc::new(move |args: &[HookValue]| -> HookOutcome {
            let sink = CompletionSink::capturing();
            let output = self
                .handler
                .invoke(self.invocation(args.to_vec(), sink.clone()))?;

            let returned = match output {
                HandlerOutput::Value(value) => value,
                HandlerOutput::Future(fut) => match fut.now_or_never() {
                    Some(outcome) => outcome?,
                    None => {
                        warn!(
                            hook = %self.hook_name,
                            plugin = %self.plugin_identity,
                            "Synchronous hook handler returned a pending future, result discarded"
                        );
                        None
                    }
                },
                HandlerOutput::Pending => None,
            };

            // A returned value takes precedence over one passed to the sink.
            match returned {
                Some(value) => Ok(Some(value)),
                None => sink.take_captured().unwrap_or(Ok(None)),
            }
        })
    }

    fn into_async_listener(self) -> AsyncListener {
        let binding = Arc::new(self);
        Arc::new(move |args: HookArgs, done: HookCallback| {
            let (sink, sink_rx) = CompletionSink::forwarding();
            let invocation = binding.invocation(args, sink);
            let output = panic::catch_unwind(AssertUnwindSafe(|| {
                binding.handler.invoke(invocation)
            }))
            .unwrap_or_else(|_| Err(binding.panicked()));

            let waiting = match binding.settle(output, sink_rx) {
                Settlement::Ready(outcome) => return binding.deliver(done, outcome),
                Settlement::Waiting(waiting) => waiting,
            };

            let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                let err = AppError::hook(format!(
                    "No async runtime available to await handler for '{}'",
                    binding.hook_name
                ));
                return binding.deliver(done, Err(err));
            };

            let binding = binding.clone();
            runtime.spawn(async move {
                let outcome = AssertUnwindSafe(waiting)
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| Err(binding.panicked()));
                binding.deliver(done, outcome);
            });
        })
    }

    /// Decides whether the handler already settled when it returned.
    ///
    /// A synchronous failure wins over everything. A sink called while the
    /// handler was still running settled before the return value did.
    fn settle(
        &self,
        output: AppResult<HandlerOutput>,
        mut sink_rx: oneshot::Receiver<HookOutcome>,
    ) -> Settlement {
        let output = match output {
            Ok(output) => output,
            Err(err) => return Settlement::Ready(Err(err)),
        };

        match sink_rx.try_recv() {
            Ok(outcome) => return Settlement::Ready(outcome),
            Err(TryRecvError::Empty | TryRecvError::Closed) => {}
        }

        match output {
            HandlerOutput::Value(value) => Settlement::Ready(Ok(value)),
            HandlerOutput::Future(fut) => {
                Settlement::Waiting(Box::pin(first_settled(fut, sink_rx)))
            }
            HandlerOutput::Pending => {
                let hook = self.hook_name.clone();
                Settlement::Waiting(Box::pin(async move {
                    sink_rx.await.unwrap_or_else(|_| {
                        Err(AppError::hook(format!(
                            "Handler for '{hook}' returned nothing and dropped its completion sink"
                        )))
                    })
                }))
            }
        }
    }

    fn deliver(&self, done: HookCallback, outcome: HookOutcome) {
        match &outcome {
            Ok(_) => debug!(
                hook = %self.hook_name,
                plugin = %self.plugin_identity,
                "Handler completed"
            ),
            Err(e) => warn!(
                hook = %self.hook_name,
                plugin = %self.plugin_identity,
                error = %e,
                "Handler failed"
            ),
        }
        done(outcome);
    }

    fn panicked(&self) -> AppError {
        AppError::hook(format!(
            "Handler for '{}' in plugin '{}' panicked",
            self.hook_name, self.plugin_identity
        ))
    }
}

/// Resolves with whichever of the handler future and the sink settles first.
///
/// A sink dropped without being called leaves the future as the only source.
async fn first_settled(
    fut: BoxFuture<'static, HookOutcome>,
    sink_rx: oneshot::Receiver<HookOutcome>,
) -> HookOutcome {
    match future::select(fut, sink_rx).await {
        Either::Left((outcome, _)) => outcome,
        Either::Right((Ok(outcome), _)) => outcome,
        Either::Right((Err(_), fut)) => fut.await,
    }
}
