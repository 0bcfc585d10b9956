//! Compiler event adapter: uniform handlers bound onto lifecycle hooks.

pub mod adapter;
pub(crate) mod binding;
pub mod descriptor;
pub mod handler;
pub mod sink;

pub use adapter::{ApplyReport, BoundEvent, CompilerEvent, DEFAULT_PLUGIN_NAME};
pub use descriptor::CompilerEventDescriptor;
pub use handler::{Handler, HandlerOutput, Invocation};
pub use sink::CompletionSink;
