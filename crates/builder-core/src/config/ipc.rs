//! Inter-process channel configuration.
//!
//! When the builder runs as a child of another process, it reports build
//! completion over a line-delimited JSON channel.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Where IPC messages are written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IpcTarget {
    /// Standard output of the builder process.
    #[default]
    Stdout,
    /// A file or named pipe opened in append mode.
    File(PathBuf),
}

impl Serialize for IpcTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Stdout => serializer.serialize_str("stdout"),
            Self::File(path) => serializer.serialize_str(&path.to_string_lossy()),
        }
    }
}

impl<'de> Deserialize<'de> for IpcTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "stdout" | "" => Self::Stdout,
            path => Self::File(PathBuf::from(path)),
        })
    }
}

/// IPC channel configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpcConfig {
    /// Whether an IPC channel is open for this process.
    #[serde(default)]
    pub enabled: bool,
    /// Channel target: `"stdout"` or a filesystem path.
    #[serde(default)]
    pub target: IpcTarget,
}
