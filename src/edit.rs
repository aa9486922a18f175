//! Load, edit and write settings files.
//!
//! All writes go through [`atomic_write`] and are preceded by a snapshot of
//! the content being replaced, so every change can be restored.

use crate::dialect::{Dialect, Document};
use crate::encoding::TextEncoding;
use crate::history::{HistoryError, HistoryStore, SnapshotSummary};
use crate::safety::{RootGuard, SafetyError};
use crate::update::{FileUpdate, UpdateOutcome};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Unsupported file type: {0}")]
    UnsupportedDialect(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("New content of {path} cannot be written as {encoding}")]
    Unencodable {
        path: PathBuf,
        encoding: TextEncoding,
    },

    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// A batch of updates for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRequest {
    /// Root-relative path.
    pub path: String,
    #[serde(default)]
    pub updates: Vec<FileUpdate>,
}

impl SaveRequest {
    pub fn new(path: impl Into<String>, updates: Vec<FileUpdate>) -> Self {
        Self {
            path: path.into(),
            updates,
        }
    }
}

/// A settings file as read from disk.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub file: PathBuf,
    pub encoding: TextEncoding,
    /// Decoded file content.
    pub original: String,
    pub document: Document,
}

impl LoadedDocument {
    /// True when rendering the unedited document reproduces the file.
    pub fn round_trips(&self) -> bool {
        self.document.render() == self.original
    }
}

/// The result of applying a request in memory, before anything is written.
#[derive(Debug, Clone)]
pub struct SavePlan {
    pub file: PathBuf,
    /// Root-relative path used as the history key.
    pub relative_path: String,
    pub dialect: Dialect,
    pub encoding: TextEncoding,
    pub original: String,
    pub rendered: String,
    pub outcomes: Vec<UpdateOutcome>,
}

impl SavePlan {
    pub fn is_change(&self) -> bool {
        self.original != self.rendered
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "SaveResult reports whether anything was written"]
pub enum SaveResult {
    /// New content written. `backup` holds the replaced content, if there was any.
    Written {
        file: PathBuf,
        backup: Option<SnapshotSummary>,
    },
    /// Rendered content equals the file; nothing written.
    Unchanged { file: PathBuf },
}

#[derive(Debug, Clone)]
pub struct SaveReport {
    pub result: SaveResult,
    pub outcomes: Vec<UpdateOutcome>,
}

/// Load a settings file and parse it by extension.
pub fn load_document(guard: &RootGuard, path: &str) -> Result<LoadedDocument, EditError> {
    let file = guard.resolve(path)?;
    let dialect =
        Dialect::from_path(&file).ok_or_else(|| EditError::UnsupportedDialect(file.clone()))?;
    let bytes = fs::read(&file).map_err(|source| EditError::Read {
        path: file.clone(),
        source,
    })?;
    let (original, encoding) = TextEncoding::decode(bytes);
    if encoding != TextEncoding::Utf8 {
        tracing::debug!(file = %file.display(), %encoding, "file is not UTF-8");
    }

    Ok(LoadedDocument {
        document: Document::parse(dialect, &original),
        file,
        encoding,
        original,
    })
}

/// Apply `request` in memory without writing anything.
pub fn plan_save(guard: &RootGuard, request: &SaveRequest) -> Result<SavePlan, EditError> {
    let LoadedDocument {
        file,
        encoding,
        original,
        mut document,
    } = load_document(guard, &request.path)?;

    let outcomes = document.apply(&request.updates);
    let rendered = document.render();

    Ok(SavePlan {
        relative_path: guard.relative(&file),
        dialect: document.dialect(),
        file,
        encoding,
        original,
        rendered,
        outcomes,
    })
}

/// Apply `request`, snapshot the old content and write the new content.
pub fn save(
    guard: &RootGuard,
    store: &mut HistoryStore,
    request: &SaveRequest,
) -> Result<SaveReport, EditError> {
    let plan = plan_save(guard, request)?;
    let result = commit(guard, store, &plan)?;
    Ok(SaveReport {
        result,
        outcomes: plan.outcomes,
    })
}

/// Write a previously computed plan.
pub fn commit(
    guard: &RootGuard,
    store: &mut HistoryStore,
    plan: &SavePlan,
) -> Result<SaveResult, EditError> {
    if !plan.is_change() {
        return Ok(SaveResult::Unchanged {
            file: plan.file.clone(),
        });
    }

    // Encode before snapshotting so an unwritable value leaves no history entry.
    let bytes = encode_text(&plan.file, &plan.rendered, plan.encoding)?;
    let snapshot = store.save_snapshot(&plan.relative_path, &plan.original, plan.encoding)?;

    // Re-resolve right before writing in case the path changed underneath us.
    let file = guard.resolve(&plan.file)?;
    write_bytes(&file, &bytes)?;

    tracing::info!(
        file = %plan.relative_path,
        applied = plan.applied_count(),
        snapshot = snapshot.id,
        "settings file written"
    );

    Ok(SaveResult::Written {
        file,
        backup: Some(snapshot),
    })
}

/// Overwrite a file with the content of snapshot `id`.
///
/// The current content is snapshotted first (when the file exists and is not
/// empty) so the restore itself can be undone.
pub fn restore(
    guard: &RootGuard,
    store: &mut HistoryStore,
    id: u64,
) -> Result<SaveResult, EditError> {
    let snapshot = store.get(id)?.clone();
    let file = guard.resolve(&snapshot.file_path)?;

    let (current, current_encoding) = match fs::read(&file) {
        Ok(bytes) => TextEncoding::decode(bytes),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            (String::new(), TextEncoding::Utf8)
        }
        Err(source) => return Err(EditError::Read { path: file, source }),
    };

    let bytes = encode_text(&file, &snapshot.content, snapshot.encoding)?;
    if current == snapshot.content && current_encoding == snapshot.encoding {
        return Ok(SaveResult::Unchanged { file });
    }

    let backup = if current.is_empty() {
        None
    } else {
        Some(store.save_snapshot(&snapshot.file_path, &current, current_encoding)?)
    };

    write_bytes(&file, &bytes)?;
    tracing::info!(file = %snapshot.file_path, id, "snapshot restored");

    Ok(SaveResult::Written { file, backup })
}

fn encode_text(path: &Path, text: &str, encoding: TextEncoding) -> Result<Vec<u8>, EditError> {
    encoding.encode(text).ok_or_else(|| EditError::Unencodable {
        path: path.to_path_buf(),
        encoding,
    })
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), EditError> {
    atomic_write(path, bytes).map_err(|source| EditError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the file is left as it was.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Tempfile in the same directory so the rename stays on one filesystem.
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        }
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
