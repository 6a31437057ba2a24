//! Writes generated files below the output directory.

use std::path::{Path, PathBuf};

use tokio::fs;

use super::error::InfraError;

#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn prepare(&self) -> Result<(), InfraError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|err| InfraError::path(&self.root, err))
    }

    /// Write `contents` to `relative`, creating parent directories. Existing
    /// files are replaced.
    pub async fn write(&self, relative: &str, contents: &str) -> Result<PathBuf, InfraError> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| InfraError::path(parent, err))?;
        }

        fs::write(&path, contents)
            .await
            .map_err(|err| InfraError::path(&path, err))?;
        Ok(path)
    }
}
