//! Lifecycle hook definitions and the static discipline registry.
//!
//! Every known compiler lifecycle point is listed here once, together with
//! the calling convention its host hook uses. The table is decided up front
//! and never inferred from the shape of a host hook object.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Value passed to and returned from hook listeners.
pub type HookValue = serde_json::Value;

/// Calling convention of a lifecycle hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookDiscipline {
    /// Listeners run synchronously; return values are ignored by the engine.
    Sync,
    /// Listeners run synchronously; the first defined value stops propagation.
    SyncBail,
    /// Listeners run one after another, each completing through a callback.
    AsyncSeries,
}

impl HookDiscipline {
    /// Returns the string name of this discipline.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::SyncBail => "sync-bail",
            Self::AsyncSeries => "async-series",
        }
    }

    /// Returns whether listeners complete through a callback.
    pub fn is_async(&self) -> bool {
        matches!(self, Self::AsyncSeries)
    }
}

impl std::fmt::Display for HookDiscipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Known lifecycle points, keyed by camel-cased name.
const KNOWN_HOOKS: &[(&str, HookDiscipline)] = &[
    ("environment", HookDiscipline::Sync),
    ("afterEnvironment", HookDiscipline::Sync),
    ("entryOption", HookDiscipline::SyncBail),
    ("afterPlugins", HookDiscipline::Sync),
    ("afterResolvers", HookDiscipline::Sync),
    ("beforeRun", HookDiscipline::AsyncSeries),
    ("run", HookDiscipline::AsyncSeries),
    ("watchRun", HookDiscipline::AsyncSeries),
    ("normalModuleFactory", HookDiscipline::Sync),
    ("contextModuleFactory", HookDiscipline::Sync),
    ("beforeCompile", HookDiscipline::AsyncSeries),
    ("compile", HookDiscipline::Sync),
    ("thisCompilation", HookDiscipline::Sync),
    ("compilation", HookDiscipline::Sync),
    ("make", HookDiscipline::AsyncSeries),
    ("afterCompile", HookDiscipline::AsyncSeries),
    ("shouldEmit", HookDiscipline::SyncBail),
    ("emit", HookDiscipline::AsyncSeries),
    ("afterEmit", HookDiscipline::AsyncSeries),
    ("done", HookDiscipline::AsyncSeries),
    ("needAdditionalPass", HookDiscipline::AsyncSeries),
    ("failed", HookDiscipline::Sync),
    ("invalid", HookDiscipline::Sync),
    ("watchClose", HookDiscipline::Sync),
];

/// Folds a hyphenated event name into camel case.
///
/// A `-` directly followed by an ASCII letter is removed and the letter is
/// upper-cased; everything else is kept as is.
pub fn camelize(name: &str) -> Cow<'_, str> {
    if !name.contains('-') {
        return Cow::Borrowed(name);
    }

    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(next) if c == '-' && next.is_ascii_alphabetic() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Static lookup from lifecycle event name to hook discipline.
#[derive(Debug, Clone, Copy, Default)]
pub struct HookRegistry;

impl HookRegistry {
    /// Returns the discipline of an event, accepting hyphenated or camel-cased names.
    pub fn discipline_of(event: &str) -> Option<HookDiscipline> {
        let name = camelize(event);
        KNOWN_HOOKS
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, discipline)| *discipline)
    }

    /// Returns whether the event names a known lifecycle point.
    pub fn is_known(event: &str) -> bool {
        Self::discipline_of(event).is_some()
    }

    /// Iterates over every known hook and its discipline.
    pub fn iter() -> impl Iterator<Item = (&'static str, HookDiscipline)> {
        KNOWN_HOOKS.iter().copied()
    }

    /// Returns the number of known hooks.
    pub fn len() -> usize {
        KNOWN_HOOKS.len()
    }
}
