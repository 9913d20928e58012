use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Frame extraction failed: {0}")]
    Extraction(String),
    #[error("Text recognition failed for {path:?}: {reason}")]
    Recognition { path: PathBuf, reason: String },
    #[error("Entity model error: {0}")]
    EntityModel(String),
    #[error("Entity model request failed: {0}")]
    EntityModelHttp(#[from] reqwest::Error),
    #[error("Entity model response malformed: {0}")]
    EntityModelJson(#[from] serde_json::Error),
    #[error("Filesystem error at {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} timed out after {after:?}")]
    Timeout { tool: String, after: Duration },
    #[error("Run cancelled")]
    Cancelled,
}

impl ScanError {
    /// Builds a `map_err` adapter that tags an io error with the path it concerns.
    pub fn fs(path: impl AsRef<Path>) -> impl FnOnce(std::io::Error) -> ScanError {
        let path = path.as_ref().to_path_buf();
        move |source| ScanError::Filesystem { path, source }
    }

    pub fn recognition(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        ScanError::Recognition {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// True for failures caused by what the caller handed in rather than by a stage.
    pub fn is_input_error(&self) -> bool {
        matches!(self, ScanError::Input(_))
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
