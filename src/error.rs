//! Error kinds surfaced to the dashboard layer.

use std::path::PathBuf;

/// A required column is absent from a loaded table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },
}

/// Failure to turn a file on disk into a `Table`.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing CSV failed for {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl LoadError {
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound { path }
        } else {
            LoadError::Io { path, source }
        }
    }
}

/// Errors from rendering a single dashboard view. Fatal for that view only.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("dataset '{0}' is not loaded")]
    DatasetUnavailable(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("unknown view '{0}'")]
    UnknownView(String),

    #[error("unknown tab '{0}'")]
    UnknownTab(String),
}
