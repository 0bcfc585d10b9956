//! Builder context shared with every service during initialization.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use builder_core::config::BuilderConfig;
use builder_core::events::BuilderEvent;

use crate::emitter::EventEmitter;
use crate::ipc::IpcChannel;

/// Data store shared by every service of one builder.
pub type GlobalStore = Arc<RwLock<HashMap<String, serde_json::Value>>>;

/// Shared environment of one builder instance.
///
/// Cloning is cheap; all clones share the emitter, IPC channel and store.
#[derive(Debug, Clone)]
pub struct BuilderContext {
    /// Loaded configuration.
    pub config: Arc<BuilderConfig>,
    /// Global event emitter.
    pub emitter: Arc<EventEmitter>,
    /// Channel to the parent process, when one is open.
    pub ipc: Option<Arc<dyn IpcChannel>>,
    /// Fixed timestamp of this build, taken when the builder was created.
    pub timestamp: DateTime<Utc>,
    /// Global key/value store.
    pub global: GlobalStore,
}

impl BuilderContext {
    /// Creates a new context stamped with the current time.
    pub fn new(
        config: BuilderConfig,
        emitter: Arc<EventEmitter>,
        ipc: Option<Arc<dyn IpcChannel>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            emitter,
            ipc,
            timestamp: Utc::now(),
            global: GlobalStore::default(),
        }
    }

    /// Returns whether an IPC channel is open.
    pub fn has_ipc(&self) -> bool {
        self.ipc.is_some()
    }

    /// Emits an event on the shared emitter.
    pub fn emit(&self, event: BuilderEvent) -> usize {
        self.emitter.emit(event)
    }

    /// Reads a value from the global store.
    pub async fn get_global(&self, key: &str) -> Option<serde_json::Value> {
        self.global.read().await.get(key).cloned()
    }

    /// Writes a value to the global store, returning the previous one.
    pub async fn set_global(
        &self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Option<serde_json::Value> {
        self.global.write().await.insert(key.into(), value)
    }
}
