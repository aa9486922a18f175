//! Reading `settings-editor.toml`.

use crate::config::schema::{EditorConfig, ValidationError, CONFIG_FILE_NAME};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Why a configuration could not be loaded.
///
/// `file` is `None` while parsing a string and is filled in by
/// [`load_from_path`].
#[derive(Debug)]
pub enum ConfigError {
    Read {
        file: PathBuf,
        source: std::io::Error,
    },
    Parse {
        file: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Invalid {
        file: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    fn in_file(mut self, path: &Path) -> Self {
        if let ConfigError::Parse { file, .. } | ConfigError::Invalid { file, .. } = &mut self {
            file.get_or_insert_with(|| path.to_path_buf());
        }
        self
    }

    fn file(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { file, .. } => Some(file.as_path()),
            ConfigError::Parse { file, .. } | ConfigError::Invalid { file, .. } => {
                file.as_deref()
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self
            .file()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| CONFIG_FILE_NAME.to_string());
        match self {
            ConfigError::Read { source, .. } => {
                write!(f, "cannot read editor settings {file}: {source}")
            }
            ConfigError::Parse { source, .. } => {
                write!(f, "{file} is not valid settings-editor TOML: {source}")
            }
            ConfigError::Invalid { source, .. } => {
                write!(f, "{file} has unusable values:\n{source}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid { source, .. } => Some(source),
        }
    }
}

pub fn load_from_str(input: &str) -> Result<EditorConfig, ConfigError> {
    let config: EditorConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Parse { file: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Invalid { file: None, source })?;
    Ok(config)
}

/// Load a config file. Relative paths inside it resolve against its directory.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<EditorConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        file: path.to_path_buf(),
        source,
    })?;
    let config = load_from_str(&contents).map_err(|error| error.in_file(path))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(config.resolve_relative_to(base))
}

/// Load `settings-editor.toml` from `dir` if present, defaults otherwise.
pub fn discover(dir: impl AsRef<Path>) -> Result<EditorConfig, ConfigError> {
    let candidate = dir.as_ref().join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        tracing::debug!(path = %candidate.display(), "loading config");
        load_from_path(&candidate)
    } else {
        Ok(EditorConfig::default())
    }
}
