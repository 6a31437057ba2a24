use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("io error at `{path}`: {source}")]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("configuration error: {message}")]
    Configuration { message: String },
    #[error("content error in `{path}`: {message}")]
    Content { path: PathBuf, message: String },
}

impl InfraError {
    pub fn path(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Path {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }

    pub fn content(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Content {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}
