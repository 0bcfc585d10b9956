//! Hook system: discipline registry, tap storage and dispatch.

pub mod definitions;
pub mod dispatcher;
pub mod hook;

pub use definitions::{HookDiscipline, HookRegistry, HookValue, camelize};
pub use hook::Hook;
