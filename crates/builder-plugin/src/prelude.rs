//! Prelude for convenient imports.

pub use builder_core::error::{AppError, ErrorKind};
pub use builder_core::result::AppResult;

pub use crate::compiler::{Compiler, Stats};
pub use crate::event::{
    ApplyReport, CompilerEvent, CompilerEventDescriptor, CompletionSink, Handler, HandlerOutput,
    Invocation,
};
pub use crate::hooks::definitions::{HookDiscipline, HookRegistry, HookValue};
pub use crate::traits::{
    AsyncListener, CompilerPlugin, HookArgs, HookCallback, HookOutcome, HookSource,
    SyncListener, TapHook, TapOptions,
};
