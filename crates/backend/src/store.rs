use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::entry::{render_header, SessionEntry};

/// Storage failures are surfaced to the caller distinctly from model
/// errors; "not found" is never one of them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("log storage failure: {0}")]
    Io(#[from] io::Error),
}

/// Append-only per-user text logs under a single data directory, one
/// `<identifier>.md` blob per user. The directory is injected at startup so
/// tests can point at an isolated temporary location.
pub struct LogStore {
    data_dir: PathBuf,
}

impl LogStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Best-effort directory creation at startup. Failure is logged and the
    /// process continues degraded; subsequent log operations will fail
    /// per-call instead.
    pub fn init(&self) {
        if let Err(err) = std::fs::create_dir_all(&self.data_dir) {
            warn!(dir = %self.data_dir.display(), %err, "could not create log directory, continuing degraded");
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn log_path(&self, user_id: &str) -> PathBuf {
        self.data_dir.join(format!("{user_id}.md"))
    }

    /// Returns the user's log verbatim. Absence is a normal case: a fresh
    /// header-only log is created and returned instead of erroring.
    pub async fn load(&self, user_id: &str) -> Result<String, StoreError> {
        let path = self.log_path(user_id);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let header = render_header(user_id, Utc::now());
                tokio::fs::create_dir_all(&self.data_dir).await?;
                tokio::fs::write(&path, &header).await?;
                debug!(user_id, "created new session log");
                Ok(header)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Appends one rendered entry. The whole entry goes through a single
    /// write call so two entries never interleave bytes.
    pub async fn append(&self, user_id: &str, entry: &SessionEntry) -> Result<(), StoreError> {
        let rendered = entry.render();
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(self.log_path(user_id))
            .await?;
        file.write_all(rendered.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
