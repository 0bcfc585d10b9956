//! # builder-service
//!
//! Service layer of the builder. Services initialize against a shared
//! [`BuilderContext`] and contribute compiler plugins; the [`Builder`]
//! registers them and applies their plugins to a hook source.
//!
//! Built-in services:
//!
//! - [`CompilerService`]: emits `compile-done` with the build exit code and
//!   mirrors it to the parent process over IPC

pub mod builder;
pub mod compiler;
pub mod context;
pub mod emitter;
pub mod ipc;
pub mod service;

pub use builder::Builder;
pub use compiler::CompilerService;
pub use context::BuilderContext;
pub use emitter::EventEmitter;
pub use ipc::{IpcChannel, JsonLineChannel};
pub use service::Service;
