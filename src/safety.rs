use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Keeps every read and write inside the settings root.
#[derive(Debug, Clone)]
pub struct RootGuard {
    /// Canonical settings root
    root: PathBuf,
    /// Canonical paths that may not be edited even though they sit under the root
    forbidden_paths: Vec<PathBuf>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Path is outside settings root: {path} (root: {root})")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Path is reserved and cannot be edited: {path}")]
    ForbiddenPath { path: PathBuf },

    #[error("Failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl RootGuard {
    /// Create a guard for `root`, which must exist.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let root = root.as_ref().canonicalize()?;
        Ok(Self {
            root,
            forbidden_paths: Vec::new(),
        })
    }

    /// Reserve a path (e.g. a history store kept under the root).
    ///
    /// Paths that do not exist yet are reserved by their lexical location.
    pub fn forbid(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let canonical = canonicalize_lenient(&absolute).unwrap_or(absolute);
        self.forbidden_paths.push(canonical);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a root-relative (or absolute) path to a canonical path inside
    /// the root.
    ///
    /// The file itself need not exist (a restore may recreate it), but its
    /// parent directory must.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        let canonical = canonicalize_lenient(&absolute)?;
        self.check_canonical(&canonical)?;
        Ok(canonical)
    }

    /// Root-relative form of a resolved path, with forward slashes.
    pub fn relative(&self, canonical: &Path) -> String {
        let relative = canonical.strip_prefix(&self.root).unwrap_or(canonical);
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    fn check_canonical(&self, canonical: &Path) -> Result<(), SafetyError> {
        if !canonical.starts_with(&self.root) {
            return Err(SafetyError::OutsideRoot {
                path: canonical.to_path_buf(),
                root: self.root.clone(),
            });
        }

        if self
            .forbidden_paths
            .iter()
            .any(|forbidden| canonical.starts_with(forbidden))
        {
            return Err(SafetyError::ForbiddenPath {
                path: canonical.to_path_buf(),
            });
        }

        Ok(())
    }
}

/// Canonicalize `path`, or its parent plus file name when the file is missing.
fn canonicalize_lenient(path: &Path) -> Result<PathBuf, std::io::Error> {
    match path.canonicalize() {
        Ok(canonical) => Ok(canonical),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
                return Err(err);
            };
            if name == ".." {
                return Err(err);
            }
            Ok(parent.canonicalize()?.join(name))
        }
        Err(err) => Err(err),
    }
}
