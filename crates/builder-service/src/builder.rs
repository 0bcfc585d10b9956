//! Registers services and applies their plugins to a compiler.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use builder_core::config::BuilderConfig;
use builder_core::events::{BuilderEvent, DomainEvent};
use builder_core::result::AppResult;
use builder_plugin::traits::HookSource;

use crate::compiler::CompilerService;
use crate::context::BuilderContext;
use crate::emitter::EventEmitter;
use crate::ipc;
use crate::service::Service;

/// Single builder instance for one build process.
pub struct Builder {
    /// Shared context handed to services.
    context: BuilderContext,
    /// Registered services, in registration order.
    services: Vec<Arc<dyn Service>>,
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("services", &self.service_names())
            .field("has_ipc", &self.context.has_ipc())
            .finish()
    }
}

impl Builder {
    /// Creates a builder, opening the IPC channel when configured.
    pub async fn new(config: BuilderConfig) -> AppResult<Self> {
        let ipc = ipc::open(&config.ipc).await?;
        let context = BuilderContext::new(config, Arc::new(EventEmitter::new()), ipc);
        Ok(Self::with_context(context))
    }

    /// Creates a builder over an existing context.
    pub fn with_context(context: BuilderContext) -> Self {
        Self {
            context,
            services: Vec::new(),
        }
    }

    /// Returns the shared context.
    pub fn context(&self) -> &BuilderContext {
        &self.context
    }

    /// Initializes and registers a service.
    ///
    /// Returns `false` when the service declined to initialize. A service
    /// with the name of an already registered one replaces it.
    pub fn register_service<S: Service>(&mut self, mut service: S) -> bool {
        if !service.init(&self.context) {
            info!(service = %service.name(), "Service not initialized, skipping");
            return false;
        }

        let name = service.name().to_string();
        let service: Arc<dyn Service> = Arc::new(service);
        match self.services.iter().position(|s| s.name() == name) {
            Some(index) => {
                warn!(service = %name, "Replacing registered service");
                self.services[index] = service;
            }
            None => self.services.push(service),
        }

        debug!(service = %name, "Service registered");
        self.context.emit(BuilderEvent::ServiceRegistered { name });
        true
    }

    /// Registers the built-in services. Returns how many were registered.
    pub fn register_default_services(&mut self) -> usize {
        usize::from(self.register_service(CompilerService::new()))
    }

    /// Returns the names of the registered services.
    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name()).collect()
    }

    /// Applies the plugins of every registered service to a hook source.
    ///
    /// Each call binds a fresh set of plugins, so it should run once per
    /// source. Returns the number of plugins applied.
    pub fn apply_plugins(&self, source: &dyn HookSource) -> AppResult<usize> {
        let mut applied = 0;
        for service in &self.services {
            for mut plugin in service.clone().plugins() {
                debug!(
                    service = %service.name(),
                    plugin = %plugin.name(),
                    "Applying compiler plugin"
                );
                plugin.apply(source)?;
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Subscribes to builder events.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.context.emitter.subscribe()
    }

    /// Logs the registered services.
    pub fn echo(&self) {
        info!(
            services = ?self.service_names(),
            ipc = self.context.has_ipc(),
            timestamp = %self.context.timestamp,
            "Builder ready"
        );
    }
}
