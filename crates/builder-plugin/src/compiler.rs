//! In-process compiler: one hook per known lifecycle point and a build run
//! that fires them in pipeline order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use builder_core::error::{AppError, ErrorKind};
use builder_core::result::AppResult;
use builder_core::types::BuildId;

use crate::hooks::definitions::{HookRegistry, HookValue, camelize};
use crate::hooks::hook::Hook;
use crate::traits::{CompilerPlugin, HookArgs, HookSource, TapHook};

/// Statistics of a single build, handed to hooks as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Build identifier. Hosts that do not track one get a fresh id.
    #[serde(default)]
    pub build_id: BuildId,
    /// Output hash, once known.
    #[serde(default)]
    pub hash: Option<String>,
    /// Error messages produced by the build.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Warning messages produced by the build.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// When the run started.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// When the run finished.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    /// Creates empty statistics for a new build.
    pub fn new() -> Self {
        Self {
            build_id: BuildId::new(),
            hash: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            start_time: None,
            end_time: None,
        }
    }

    /// Adds a build error.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.errors.push(message.into());
        self
    }

    /// Adds a build warning.
    pub fn with_warning(mut self, message: impl Into<String>) -> Self {
        self.warnings.push(message.into());
        self
    }

    /// Returns whether the build produced errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns whether the build produced warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Serializes the statistics into a hook argument.
    pub fn to_value(&self) -> AppResult<HookValue> {
        Ok(serde_json::to_value(self)?)
    }

    /// Reads statistics back from a hook argument.
    pub fn from_value(value: &HookValue) -> AppResult<Self> {
        Self::deserialize(value).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                "Hook argument is not a stats object",
                e,
            )
        })
    }
}

/// Lifecycle points fired before emit, in order.
const BUILD_PHASES: &[&str] = &[
    "beforeRun",
    "run",
    "beforeCompile",
    "compile",
    "thisCompilation",
    "compilation",
    "make",
    "afterCompile",
];

/// An in-process compiler exposing every known hook.
pub struct Compiler {
    /// Hooks keyed by camel-cased name.
    hooks: HashMap<&'static str, Hook>,
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tapped = self.hooks.values().filter(|h| h.is_tapped()).count();
        f.debug_struct("Compiler")
            .field("hooks", &self.hooks.len())
            .field("tapped", &tapped)
            .finish()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Creates a compiler with one hook per known lifecycle point.
    pub fn new() -> Self {
        let hooks = HookRegistry::iter()
            .map(|(name, discipline)| (name, Hook::new(name, discipline)))
            .collect();
        Self { hooks }
    }

    /// Returns a hook by hyphenated or camel-cased name.
    pub fn hook_named(&self, name: &str) -> Option<&Hook> {
        self.hooks.get(camelize(name).as_ref())
    }

    /// Returns the total number of listeners across all hooks.
    pub fn listener_count(&self) -> usize {
        self.hooks.values().map(Hook::tap_count).sum()
    }

    /// Applies a plugin to this compiler.
    pub fn apply_plugin(&self, plugin: &mut dyn CompilerPlugin) -> AppResult<()> {
        debug!(plugin = %plugin.name(), "Applying compiler plugin");
        plugin.apply(self)
    }

    /// Runs one build, firing the lifecycle hooks in pipeline order.
    ///
    /// When any hook fails, `failed` is fired with the error message and the
    /// error is returned.
    pub async fn run(&self, stats: Stats) -> AppResult<Stats> {
        match self.run_phases(stats).await {
            Ok(stats) => Ok(stats),
            Err(err) => {
                warn!(error = %err, "Build failed");
                if let Err(hook_err) = self.call("failed", &[HookValue::String(err.to_string())]) {
                    warn!(error = %hook_err, "Listener on 'failed' hook failed");
                }
                Err(err)
            }
        }
    }

    async fn run_phases(&self, mut stats: Stats) -> AppResult<Stats> {
        stats.start_time = Some(Utc::now());
        info!(build_id = %stats.build_id, "Build started");

        self.call("environment", &[])?;
        self.call("afterEnvironment", &[])?;

        let args: HookArgs = vec![stats.to_value()?];
        for phase in BUILD_PHASES {
            self.call_async(phase, args.clone()).await?;
        }

        let should_emit = self.call("shouldEmit", &args)?;
        if should_emit == Some(HookValue::Bool(false)) {
            info!(build_id = %stats.build_id, "Emit skipped by shouldEmit");
        } else {
            self.call_async("emit", args.clone()).await?;
            self.call_async("afterEmit", args).await?;
        }

        stats.end_time = Some(Utc::now());
        self.call_async("done", vec![stats.to_value()?]).await?;

        info!(
            build_id = %stats.build_id,
            errors = stats.errors.len(),
            warnings = stats.warnings.len(),
            "Build finished"
        );
        Ok(stats)
    }

    fn call(&self, name: &str, args: &[HookValue]) -> AppResult<Option<HookValue>> {
        match self.hooks.get(name) {
            Some(hook) => hook.call(args),
            None => Ok(None),
        }
    }

    async fn call_async(&self, name: &str, args: HookArgs) -> AppResult<()> {
        match self.hooks.get(name) {
            Some(hook) => hook.call_async(args).await,
            None => Ok(()),
        }
    }
}

impl HookSource for Compiler {
    fn hook(&self, name: &str) -> Option<&dyn TapHook> {
        self.hooks.get(name).map(|hook| hook as &dyn TapHook)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::traits::{HookCallback, HookOutcome, TapOptions};

    fn recorder(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> crate::traits::SyncListener {
        let log = log.clone();
        Arc::new(move |_: &[HookValue]| -> HookOutcome {
            log.lock().unwrap().push(name.to_string());
            Ok(None)
        })
    }

    fn async_recorder(
        log: &Arc<Mutex<Vec<String>>>,
        name: &'static str,
    ) -> crate::traits::AsyncListener {
        let log = log.clone();
        Arc::new(move |_: HookArgs, done: HookCallback| {
            log.lock().unwrap().push(name.to_string());
            done(Ok(None));
        })
    }

    fn tap_all(compiler: &Compiler, log: &Arc<Mutex<Vec<String>>>) {
        for (name, discipline) in HookRegistry::iter() {
            let hook = compiler.hook(name).unwrap();
            let options = TapOptions::new("recorder");
            if discipline.is_async() {
                hook.tap_async(options, async_recorder(log, name)).unwrap();
            } else {
                hook.tap(options, recorder(log, name)).unwrap();
            }
        }
    }

    #[test]
    fn test_exposes_every_known_hook() {
        let compiler = Compiler::new();
        for (name, discipline) in HookRegistry::iter() {
            let hook = compiler.hook_named(name).unwrap();
            assert_eq!(hook.discipline(), discipline);
            assert!(compiler.hook(name).is_some());
        }
        assert!(compiler.hook_named("before-run").is_some());
        assert!(compiler.hook("before-run").is_none());
        assert!(compiler.hook("nope").is_none());
    }

    #[tokio::test]
    async fn test_run_fires_lifecycle_in_order() {
        let compiler = Compiler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        tap_all(&compiler, &log);

        let stats = compiler.run(Stats::new()).await.unwrap();
        assert!(stats.start_time.is_some());
        assert!(stats.end_time.is_some());

        let expected = vec![
            "environment",
            "afterEnvironment",
            "beforeRun",
            "run",
            "beforeCompile",
            "compile",
            "thisCompilation",
            "compilation",
            "make",
            "afterCompile",
            "shouldEmit",
            "emit",
            "afterEmit",
            "done",
        ];
        assert_eq!(*log.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_should_emit_false_skips_emit() {
        let compiler = Compiler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        compiler
            .hook("shouldEmit")
            .unwrap()
            .tap(
                TapOptions::new("gate"),
                Arc::new(|_: &[HookValue]| -> HookOutcome { Ok(Some(json!(false))) }),
            )
            .unwrap();
        tap_all(&compiler, &log);

        compiler.run(Stats::new()).await.unwrap();
        let log = log.lock().unwrap();
        assert!(!log.iter().any(|n| n == "emit" || n == "afterEmit"));
        // The first bail value stops the remaining shouldEmit listeners.
        assert!(!log.iter().any(|n| n == "shouldEmit"));
        assert_eq!(log.last().map(String::as_str), Some("done"));
    }

    #[tokio::test]
    async fn test_failure_fires_failed_hook() {
        let compiler = Compiler::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let failed_seen = seen.clone();
        compiler
            .hook("make")
            .unwrap()
            .tap_async(
                TapOptions::new("broken"),
                Arc::new(|_: HookArgs, done: HookCallback| {
                    done(Err(AppError::hook("make exploded")))
                }),
            )
            .unwrap();
        compiler
            .hook("failed")
            .unwrap()
            .tap(
                TapOptions::new("watcher"),
                Arc::new(move |args: &[HookValue]| -> HookOutcome {
                    failed_seen.lock().unwrap().extend(args.iter().cloned());
                    Ok(None)
                }),
            )
            .unwrap();

        let err = compiler.run(Stats::new()).await.unwrap_err();
        assert_eq!(err.message, "make exploded");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].as_str().unwrap().contains("make exploded"));
    }

    #[tokio::test]
    async fn test_done_receives_stats() {
        let compiler = Compiler::new();
        let received = Arc::new(Mutex::new(None));
        let slot = received.clone();
        compiler
            .hook("done")
            .unwrap()
            .tap_async(
                TapOptions::new("stats"),
                Arc::new(move |args: HookArgs, done: HookCallback| {
                    *slot.lock().unwrap() = Some(Stats::from_value(&args[0]));
                    done(Ok(None));
                }),
            )
            .unwrap();

        let stats = Stats::new().with_error("boom").with_warning("careful");
        let build_id = stats.build_id;
        compiler.run(stats).await.unwrap();

        let received = received.lock().unwrap().take().unwrap().unwrap();
        assert_eq!(received.build_id, build_id);
        assert!(received.has_errors());
        assert!(received.has_warnings());
        assert!(received.end_time.is_some());
    }

    #[test]
    fn test_stats_wire_shape() {
        let value = Stats::new().to_value().unwrap();
        assert!(value.get("buildId").is_some());
        assert_eq!(value["errors"], json!([]));

        let parsed = Stats::from_value(&json!({
            "buildId": "0190b3c4-5d6e-7f80-9a1b-2c3d4e5f6a7b",
            "errors": ["x"]
        }))
        .unwrap();
        assert!(parsed.has_errors());
        assert!(!parsed.has_warnings());

        let bare = Stats::from_value(&json!({"errors": ["y"], "warnings": []})).unwrap();
        assert!(bare.has_errors());

        let err = Stats::from_value(&json!("not stats")).unwrap_err();
        assert!(err.is(ErrorKind::Serialization));
    }
}
