//! Shared test helpers for integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use builder_core::config::BuilderConfig;
use builder_core::error::AppError;
use builder_core::events::IpcMessage;
use builder_core::result::AppResult;
use builder_plugin::compiler::Compiler;
use builder_plugin::traits::{
    AsyncListener, HookArgs, HookOutcome, HookSource, SyncListener, TapHook, TapOptions,
};
use builder_service::{Builder, BuilderContext, EventEmitter, IpcChannel};

/// IPC channel recording every message sent to the parent.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    messages: Mutex<Vec<IpcMessage>>,
    fail: bool,
}

impl RecordingChannel {
    /// A channel whose sends always fail.
    pub fn failing() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Messages sent so far, serialized as they would appear on the wire.
    pub fn wire_lines(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| serde_json::to_string(m).expect("serialize message"))
            .collect()
    }
}

#[async_trait]
impl IpcChannel for RecordingChannel {
    async fn send(&self, message: &IpcMessage) -> AppResult<()> {
        if self.fail {
            return Err(AppError::ipc("parent process went away"));
        }
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    fn target(&self) -> &str {
        "recording"
    }
}

/// Test harness: a builder with default services applied to a compiler.
pub struct TestBuild {
    /// The builder under test
    pub builder: Builder,
    /// Compiler the builder's plugins were applied to
    pub compiler: Compiler,
}

impl TestBuild {
    /// Create a harness, optionally with an IPC channel
    pub fn new(ipc: Option<Arc<dyn IpcChannel>>) -> Self {
        let context = BuilderContext::new(
            BuilderConfig::default(),
            Arc::new(EventEmitter::new()),
            ipc,
        );
        let mut builder = Builder::with_context(context);
        builder.register_default_services();

        let compiler = Compiler::new();
        builder
            .apply_plugins(&compiler)
            .expect("Failed to apply plugins");

        Self { builder, compiler }
    }
}

/// Minimal hook keeping raw listeners, the way an external build tool would.
#[derive(Default)]
pub struct ForeignHook {
    pub sync: Mutex<Vec<(String, SyncListener)>>,
    pub series: Mutex<Vec<(String, AsyncListener)>>,
}

impl TapHook for ForeignHook {
    fn tap(&self, options: TapOptions, listener: SyncListener) -> AppResult<()> {
        self.sync.lock().unwrap().push((options.name, listener));
        Ok(())
    }

    fn tap_async(&self, options: TapOptions, listener: AsyncListener) -> AppResult<()> {
        self.series.lock().unwrap().push((options.name, listener));
        Ok(())
    }
}

impl ForeignHook {
    /// Calls the first async listener and collects every completion.
    pub async fn call_first_async(&self, args: HookArgs) -> Arc<Mutex<Vec<HookOutcome>>> {
        let listener = self.series.lock().unwrap()[0].1.clone();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = oneshot::channel();
        let recorded = calls.clone();
        listener(
            args,
            Box::new(move |outcome| {
                recorded.lock().unwrap().push(outcome);
                let _ = tx.send(());
            }),
        );
        rx.await.expect("completion callback");
        calls
    }
}

/// Host exposing only a few hooks.
pub struct ForeignHost {
    pub hooks: HashMap<&'static str, ForeignHook>,
}

impl ForeignHost {
    pub fn new(names: &[&'static str]) -> Self {
        Self {
            hooks: names.iter().map(|n| (*n, ForeignHook::default())).collect(),
        }
    }
}

impl HookSource for ForeignHost {
    fn hook(&self, name: &str) -> Option<&dyn TapHook> {
        self.hooks.get(name).map(|h| h as &dyn TapHook)
    }
}
