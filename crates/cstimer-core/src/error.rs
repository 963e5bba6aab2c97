use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while loading csTimer session logs.
#[derive(Error, Debug)]
pub enum CsTimerError {
    /// The log file does not exist or is not a regular file.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// A folder was scanned but held no `.txt` session logs.
    #[error("No .txt files found in directory: {0}")]
    NoLogFiles(PathBuf),

    /// A folder operation was invoked on something that is not a directory.
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The outer JSON document of a session log is malformed.
    #[error("Failed to parse JSON in {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A JSON document embedded as a string field is malformed.
    #[error("Failed to parse embedded JSON field '{field}' in {path}: {source}")]
    EmbeddedDecode {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// A decoded document lacks an expected key or holds the wrong kind of value.
    #[error("Unexpected log structure in {path}: {detail}")]
    Shape { path: PathBuf, detail: String },
}

impl CsTimerError {
    /// `true` for both flavours of "nothing to read": a missing file and a
    /// folder without session logs.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::NoLogFiles(_))
    }

    pub fn shape(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::Shape {
            path: path.into(),
            detail: detail.into(),
        }
    }
}

/// Convenience alias used throughout the cstimer crates.
pub type Result<T> = std::result::Result<T, CsTimerError>;
