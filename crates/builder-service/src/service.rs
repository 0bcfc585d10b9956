//! Service contract implemented by every builder service.

use std::sync::Arc;

use builder_plugin::traits::CompilerPlugin;

use crate::context::BuilderContext;

/// A build service registered with the [`Builder`](crate::Builder).
///
/// A service is only registered when [`Service::init`] returns `true`;
/// returning `false` means the service does not apply to this build.
pub trait Service: Send + Sync + 'static {
    /// Returns the service name.
    fn name(&self) -> &str;

    /// Initializes the service against the builder context.
    fn init(&mut self, context: &BuilderContext) -> bool;

    /// Returns the compiler plugins this service contributes.
    fn plugins(self: Arc<Self>) -> Vec<Box<dyn CompilerPlugin>> {
        Vec::new()
    }
}
