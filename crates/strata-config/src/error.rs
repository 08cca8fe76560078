//! Errors from reading, writing and parsing chain presets.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// File operation that failed while handling a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetIo {
    /// Reading a preset file.
    Read,
    /// Writing a preset file.
    Write,
    /// Creating the directory a preset is saved into.
    CreateDir,
}

impl fmt::Display for PresetIo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read preset",
            Self::Write => "write preset",
            Self::CreateDir => "create preset directory",
        })
    }
}

/// Everything that can go wrong moving a [`ChainPreset`](crate::ChainPreset)
/// in or out of storage.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A preset file or its directory could not be accessed.
    #[error("cannot {op} '{path}': {source}")]
    Io {
        /// What was being attempted.
        op: PresetIo,
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A preset file is not a valid preset document.
    #[error("invalid preset file '{path}': {source}")]
    PresetFile {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser diagnostics, including line and column.
        #[source]
        source: toml::de::Error,
    },

    /// Preset text not backed by a file is not a valid preset document.
    #[error("invalid preset text: {0}")]
    PresetText(#[from] toml::de::Error),

    /// A preset could not be encoded as TOML.
    #[error("cannot encode preset: {0}")]
    Encode(#[from] toml::ser::Error),

    /// No factory preset with this name.
    #[error("preset not found: {0}")]
    PresetNotFound(String),
}

impl ConfigError {
    /// Reading `path` failed.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io(PresetIo::Read, path, source)
    }

    /// Writing `path` failed.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io(PresetIo::Write, path, source)
    }

    /// Creating the directory `path` failed.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io(PresetIo::CreateDir, path, source)
    }

    fn io(op: PresetIo, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Attaches the file a parse error came from. Other errors pass through.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::PresetText(source) => Self::PresetFile {
                path: path.into(),
                source,
            },
            other => other,
        }
    }
}
