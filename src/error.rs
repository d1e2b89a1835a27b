use std::path::PathBuf;

use thiserror::Error;

pub type HfResult<T> = Result<T, HfError>;

#[derive(Debug, Error)]
pub enum HfError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed structure in `{path}`: {detail}")]
    Format { path: PathBuf, detail: String },

    #[error("{what} not found in `{path}`")]
    NotFound { what: String, path: PathBuf },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("workspace descriptor `{path}`: {detail}")]
    Workspace { path: PathBuf, detail: String },
}

impl HfError {
    pub fn format(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what: what.into(),
            path: path.into(),
        }
    }

    /// Whether a batch operation must stop on this error.
    ///
    /// Corrupt structure (shortcut bytes, container layout) and i/o failures
    /// are fatal; a missing reference line or stream only sinks the single
    /// lookup that raised it.
    #[must_use]
    pub const fn is_fatal_for_batch(&self) -> bool {
        match self {
            Self::Io(_)
            | Self::Json(_)
            | Self::Format { .. }
            | Self::Workspace { .. }
            | Self::Validation(_) => true,
            Self::NotFound { .. } => false,
        }
    }
}
