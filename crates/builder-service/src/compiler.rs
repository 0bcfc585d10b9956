//! Compiler service: observes compiler runs and signals completion.
//!
//! Binds the `done` lifecycle event through the compiler event adapter.
//! When a run finishes it emits `compile-done` locally and, if the builder
//! runs under a parent process, sends `{"type":"compile-done","data":code}`
//! over IPC.

use std::sync::Arc;

use tracing::{info, warn};

use builder_core::config::plugin::PluginConfig;
use builder_core::error::AppError;
use builder_core::events::{BuildOutcome, BuilderEvent, IpcMessage};
use builder_core::result::AppResult;
use builder_plugin::compiler::Stats;
use builder_plugin::event::{CompilerEvent, CompilerEventDescriptor, Handler, Invocation};
use builder_plugin::traits::CompilerPlugin;

use crate::context::BuilderContext;
use crate::service::Service;

/// Global store key holding the exit code of the latest run.
pub const LAST_COMPILE_CODE: &str = "lastCompileCode";

/// Service reporting compiler completion.
#[derive(Debug)]
pub struct CompilerService {
    /// Plugin identity, taken from configuration during init.
    plugin_name: String,
    /// Builder context, set by init.
    context: Option<BuilderContext>,
}

impl Default for CompilerService {
    fn default() -> Self {
        Self {
            plugin_name: PluginConfig::default().name,
            context: None,
        }
    }
}

impl CompilerService {
    /// Creates an uninitialized compiler service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the plugin identity the service binds under.
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// Handles a finished compiler run and returns the build exit code.
    pub async fn done(&self, stats: &Stats) -> AppResult<u8> {
        let context = self
            .context
            .as_ref()
            .ok_or_else(|| AppError::internal("Compiler service used before init"))?;

        let outcome = BuildOutcome::from_has_errors(stats.has_errors());
        let code = outcome.code();
        context
            .set_global(LAST_COMPILE_CODE, serde_json::json!(code))
            .await;
        context.emit(BuilderEvent::CompileDone { code });

        if let Some(ipc) = &context.ipc {
            // The build result stands even when the parent is gone.
            if let Err(e) = ipc.send(&IpcMessage::compile_done(outcome)).await {
                warn!(target_channel = %ipc.target(), error = %e, "Failed to send compile-done");
            }
        }

        info!(
            build_id = %stats.build_id,
            code,
            errors = stats.errors.len(),
            "Compile done"
        );
        Ok(code)
    }
}

/// `done` handler: reads the stats argument and reports completion.
fn done_handler() -> Handler<CompilerService> {
    Handler::future(|invocation: Invocation<CompilerService>| async move {
        let service = invocation.require_context()?;
        let value = invocation
            .arg(0)
            .ok_or_else(|| AppError::hook("'done' was called without stats"))?;
        let stats = Stats::from_value(value)?;
        service.done(&stats).await?;
        Ok(None)
    })
}

impl Service for CompilerService {
    fn name(&self) -> &str {
        "compiler"
    }

    fn init(&mut self, context: &BuilderContext) -> bool {
        self.plugin_name = context.config.plugin.name.clone();
        self.context = Some(context.clone());
        true
    }

    fn plugins(self: Arc<Self>) -> Vec<Box<dyn CompilerPlugin>> {
        let descriptor = CompilerEventDescriptor::new()
            .name(self.plugin_name.clone())
            .context(self)
            .on("done", done_handler());
        vec![Box::new(CompilerEvent::new(descriptor))]
    }
}
