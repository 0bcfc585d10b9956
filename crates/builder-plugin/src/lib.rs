//! # builder-plugin
//!
//! Compiler hook plumbing for the builder. Provides:
//!
//! - A static hook registry mapping lifecycle events to their calling discipline
//! - An in-process hook engine (`Hook`, `Compiler`) with sync, bail and async-series semantics
//! - The `CompilerEvent` adapter binding uniform handlers onto any hook source
//! - Completion sinks so handlers can finish by callback or by future

pub mod compiler;
pub mod event;
pub mod hooks;
pub mod prelude;
pub mod traits;

pub use compiler::{Compiler, Stats};
pub use event::{
    ApplyReport, CompilerEvent, CompilerEventDescriptor, CompletionSink, Handler, HandlerOutput,
    Invocation,
};
pub use hooks::definitions::{HookDiscipline, HookRegistry, HookValue};
pub use hooks::hook::Hook;
pub use traits::{CompilerPlugin, HookSource, TapHook, TapOptions};
