//! Durable storage for [`PersistedSnapshot`]s.
//!
//! Every save is a full overwrite; there is no incremental log.

use crate::snapshot::PersistedSnapshot;
use foresight_core::{error::ForesightError, shellexpand};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::{debug, info};

/// Where the assignment store keeps its state.
///
/// Calls are serialized by the store's lock, so implementations need not
/// guard against concurrent saves themselves.
pub trait SnapshotAdapter: Send + Sync {
    /// Human-readable location, for logs and `status`.
    fn describe(&self) -> String;

    /// Read the last saved snapshot. `Ok(None)` means nothing was saved yet.
    fn load(&self) -> Result<Option<PersistedSnapshot>, ForesightError>;

    /// Replace the saved snapshot.
    fn save(&self, snapshot: &PersistedSnapshot) -> Result<(), ForesightError>;
}

/// JSON file on the local filesystem.
pub struct JsonFileAdapter {
    path: PathBuf,
}

impl JsonFileAdapter {
    /// Create an adapter for `path` (`~` is expanded).
    pub fn new(path: &str) -> Self {
        Self {
            path: PathBuf::from(shellexpand(path)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Per-process temp name, so a `draw` run beside the bot never writes
    /// into the bot's half-finished temp file.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

impl SnapshotAdapter for JsonFileAdapter {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Option<PersistedSnapshot>, ForesightError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No state file at {}, starting fresh", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(ForesightError::Storage(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };

        let snapshot: PersistedSnapshot = serde_json::from_str(&content)?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &PersistedSnapshot) -> Result<(), ForesightError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ForesightError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let json = serde_json::to_string(snapshot)?;

        // Write beside the target and rename, so readers never see half a file.
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json).map_err(|e| {
            ForesightError::Storage(format!("failed to write {}: {e}", tmp.display()))
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            ForesightError::Storage(format!(
                "failed to move {} into place: {e}",
                tmp.display()
            ))
        })?;

        debug!(
            "saved {} assignments to {}",
            snapshot.user_mapping.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Keeps the snapshot in process memory.
///
/// Used for dry runs and tests; counts saves so callers can check that
/// every mutation was written through.
#[derive(Default)]
pub struct MemoryAdapter {
    snapshot: Mutex<Option<PersistedSnapshot>>,
    saves: AtomicUsize,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot, as if it had been saved before.
    pub fn with_snapshot(snapshot: PersistedSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            saves: AtomicUsize::new(0),
        }
    }

    /// The most recently saved snapshot.
    pub fn snapshot(&self) -> Option<PersistedSnapshot> {
        self.snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl SnapshotAdapter for MemoryAdapter {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn load(&self) -> Result<Option<PersistedSnapshot>, ForesightError> {
        Ok(self.snapshot())
    }

    fn save(&self, snapshot: &PersistedSnapshot) -> Result<(), ForesightError> {
        *self.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Shared adapters work too, so a caller can keep a handle for inspection.
impl<A: SnapshotAdapter + ?Sized> SnapshotAdapter for std::sync::Arc<A> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn load(&self) -> Result<Option<PersistedSnapshot>, ForesightError> {
        (**self).load()
    }

    fn save(&self, snapshot: &PersistedSnapshot) -> Result<(), ForesightError> {
        (**self).save(snapshot)
    }
}
