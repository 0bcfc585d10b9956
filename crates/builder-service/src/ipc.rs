//! Parent-process IPC channel.
//!
//! Messages are written as one JSON object per line. The channel is only
//! opened when IPC is enabled in the configuration; otherwise services see
//! no channel and skip sending.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::{OpenOptions, create_dir_all};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, info};

use builder_core::config::ipc::{IpcConfig, IpcTarget};
use builder_core::error::{AppError, ErrorKind};
use builder_core::events::IpcMessage;
use builder_core::result::AppResult;

/// A channel to the parent process.
#[async_trait]
pub trait IpcChannel: Send + Sync + std::fmt::Debug + 'static {
    /// Sends one message.
    async fn send(&self, message: &IpcMessage) -> AppResult<()>;

    /// Human-readable description of where messages go.
    fn target(&self) -> &str;
}

/// Line-delimited JSON channel over any async writer.
pub struct JsonLineChannel<W> {
    target: String,
    writer: Mutex<W>,
}

impl<W> std::fmt::Debug for JsonLineChannel<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLineChannel")
            .field("target", &self.target)
            .finish()
    }
}

impl<W: AsyncWrite + Unpin + Send + 'static> JsonLineChannel<W> {
    /// Wraps a writer.
    pub fn new(target: impl Into<String>, writer: W) -> Self {
        Self {
            target: target.into(),
            writer: Mutex::new(writer),
        }
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send + 'static> IpcChannel for JsonLineChannel<W> {
    async fn send(&self, message: &IpcMessage) -> AppResult<()> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;

        debug!(target_channel = %self.target, kind = %message.kind, "IPC message sent");
        Ok(())
    }

    fn target(&self) -> &str {
        &self.target
    }
}

/// Opens the channel described by the configuration.
///
/// Returns `None` when IPC is disabled.
pub async fn open(config: &IpcConfig) -> AppResult<Option<Arc<dyn IpcChannel>>> {
    if !config.enabled {
        return Ok(None);
    }

    let channel: Arc<dyn IpcChannel> = match &config.target {
        IpcTarget::Stdout => Arc::new(JsonLineChannel::new("stdout", tokio::io::stdout())),
        IpcTarget::File(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    create_dir_all(parent).await?;
                }
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Ipc,
                        format!("Failed to open IPC target '{}'", path.display()),
                        e,
                    )
                })?;
            Arc::new(JsonLineChannel::new(path.display().to_string(), file))
        }
    };

    info!(target_channel = %channel.target(), "IPC channel opened");
    Ok(Some(channel))
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncBufReadExt, BufReader};

    use builder_core::events::BuildOutcome;

    use super::*;

    #[tokio::test]
    async fn test_writes_one_json_object_per_line() {
        let (writer, reader) = tokio::io::duplex(1024);
        let channel = JsonLineChannel::new("duplex", writer);

        channel
            .send(&IpcMessage::compile_done(BuildOutcome::Success))
            .await
            .unwrap();
        channel
            .send(&IpcMessage::compile_done(BuildOutcome::Failed))
            .await
            .unwrap();
        drop(channel);

        let mut lines = BufReader::new(reader).lines();
        assert_eq!(
            lines.next_line().await.unwrap().as_deref(),
            Some(r#"{"type":"compile-done","data":0}"#)
        );
        assert_eq!(
            lines.next_line().await.unwrap().as_deref(),
            Some(r#"{"type":"compile-done","data":1}"#)
        );
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_disabled_config_opens_nothing() {
        let channel = open(&IpcConfig::default()).await.unwrap();
        assert!(channel.is_none());
    }

    #[tokio::test]
    async fn test_file_target_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ipc.jsonl");
        let config = IpcConfig {
            enabled: true,
            target: IpcTarget::File(path.clone()),
        };

        let channel = open(&config).await.unwrap().unwrap();
        assert_eq!(channel.target(), path.display().to_string());
        channel
            .send(&IpcMessage::compile_done(BuildOutcome::Failed))
            .await
            .unwrap();
        drop(channel);

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "{\"type\":\"compile-done\",\"data\":1}\n");
    }
}
