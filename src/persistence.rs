//! Snapshot persistence
//!
//! The durable part of the game is written as pretty JSON after a short
//! debounce window. Bursts of changes inside one window collapse into a single
//! write of whatever the state looks like when the window closes.

use crate::state::Snapshot;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

pub const DEFAULT_STATE_PATH: &str = "data/game-state.json";
pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct Persistence {
    path: PathBuf,
    debounce: Duration,
    pending: AtomicBool,
    write_lock: Mutex<()>,
}

impl Persistence {
    pub fn new(path: impl Into<PathBuf>, debounce: Duration) -> Self {
        Self {
            path: path.into(),
            debounce,
            pending: AtomicBool::new(false),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Read the last snapshot. A missing file is not an error.
    pub async fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Write `snapshot` atomically (temp file, then rename)
    pub async fn save(&self, mut snapshot: Snapshot) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;

        snapshot.saved_at = Some(chrono::Utc::now().to_rfc3339());
        let json = serde_json::to_string_pretty(&snapshot)?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!("Snapshot saved to {}", self.path.display());
        Ok(())
    }

    /// Open a debounce window. Returns false if one is already open, in
    /// which case the pending save will pick up the latest state.
    pub fn begin_window(&self) -> bool {
        !self.pending.swap(true, Ordering::AcqRel)
    }

    /// Close the window right before the snapshot is taken
    pub fn end_window(&self) {
        self.pending.store(false, Ordering::Release);
    }
}
