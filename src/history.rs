//! Snapshot history for edited files.
//!
//! Snapshots live in a single JSON file. Every mutation of the store is
//! persisted with [`atomic_write`], so a crash leaves either the old or the
//! new store on disk. Mutations hold an exclusive lock on a sidecar
//! `<store>.lock` file and re-read the store under it, so separate processes
//! editing different settings files never drop each other's snapshots.

use crate::edit::atomic_write;
use crate::encoding::TextEncoding;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Default for the `history_limit` config key.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(u64),

    #[error("history store {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to lock history store {path}: {source}")]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode history store: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Full content of a file as it was before an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: u64,
    /// Root-relative path with forward slashes.
    pub file_path: String,
    /// Seconds since the Unix epoch.
    pub created_at: u64,
    pub content_hash: u64,
    pub content: String,
    /// Encoding the file used on disk; a restore writes it back the same way.
    #[serde(default)]
    pub encoding: TextEncoding,
}

/// A snapshot without its content, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub id: u64,
    pub file_path: String,
    pub created_at: u64,
    pub content_hash: u64,
    pub size: usize,
}

impl From<&Snapshot> for SnapshotSummary {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            id: snapshot.id,
            file_path: snapshot.file_path.clone(),
            created_at: snapshot.created_at,
            content_hash: snapshot.content_hash,
            size: snapshot.content.len(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    next_id: u64,
    snapshots: Vec<Snapshot>,
}

#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    data: StoreData,
}

impl HistoryStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();
        let data = read_data(&path)?;
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.data.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.snapshots.is_empty()
    }

    /// Record `content` for `file_path` and persist the store.
    ///
    /// Snapshots written by other handles since [`open`](Self::open) are
    /// picked up first, so ids stay unique across processes.
    pub fn save_snapshot(
        &mut self,
        file_path: &str,
        content: &str,
        encoding: TextEncoding,
    ) -> Result<SnapshotSummary, HistoryError> {
        let _lock = self.lock()?;
        self.data = read_data(&self.path)?;

        let id = self.data.next_id.max(1);
        let snapshot = Snapshot {
            id,
            file_path: file_path.to_string(),
            created_at: unix_now(),
            content_hash: xxh3_64(content.as_bytes()),
            content: content.to_string(),
            encoding,
        };
        let summary = SnapshotSummary::from(&snapshot);

        self.data.next_id = id + 1;
        self.data.snapshots.push(snapshot);
        self.persist()?;

        tracing::info!(id, file = file_path, bytes = content.len(), "snapshot saved");
        Ok(summary)
    }

    /// Snapshots of `file_path`, newest first, at most `limit` entries.
    pub fn history(&self, file_path: &str, limit: usize) -> Vec<SnapshotSummary> {
        // Ids grow monotonically, so reverse insertion order is newest first
        // even when two snapshots share a timestamp.
        self.data
            .snapshots
            .iter()
            .rev()
            .filter(|snapshot| snapshot.file_path == file_path)
            .take(limit)
            .map(SnapshotSummary::from)
            .collect()
    }

    pub fn get(&self, id: u64) -> Result<&Snapshot, HistoryError> {
        self.data
            .snapshots
            .iter()
            .find(|snapshot| snapshot.id == id)
            .ok_or(HistoryError::SnapshotNotFound(id))
    }

    /// Exclusive lock on the sidecar file, released when the handle drops.
    fn lock(&self) -> Result<File, HistoryError> {
        create_parent(&self.path)?;
        let path = lock_path(&self.path);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| HistoryError::Lock {
                path: path.clone(),
                source,
            })?;
        file.lock_exclusive()
            .map_err(|source| HistoryError::Lock { path, source })?;
        Ok(file)
    }

    fn persist(&self) -> Result<(), HistoryError> {
        let encoded = serde_json::to_vec_pretty(&self.data)?;
        create_parent(&self.path)?;
        atomic_write(&self.path, &encoded)?;
        Ok(())
    }
}

fn read_data(path: &Path) -> Result<StoreData, HistoryError> {
    match fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => Ok(StoreData::default()),
        Ok(text) => serde_json::from_str(&text).map_err(|source| HistoryError::Corrupt {
            path: path.to_path_buf(),
            source,
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(StoreData::default()),
        Err(err) => Err(err.into()),
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn create_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
