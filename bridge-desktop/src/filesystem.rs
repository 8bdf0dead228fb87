//! Download target writing into a directory using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{SaveRequest, SaveTarget},
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Saves downloads as files in a directory.
///
/// Existing files with the same name are overwritten, matching what a browser
/// does when the user confirms the save dialog.
pub struct DirectorySaveTarget {
    directory: PathBuf,
}

impl DirectorySaveTarget {
    /// Use the platform download directory, falling back to the home
    /// directory and then the working directory.
    pub fn new() -> Self {
        let directory = dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { directory }
    }

    pub fn with_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn target_path(&self, file_name: &str) -> Result<PathBuf> {
        let name = Path::new(file_name);
        if file_name.is_empty() || name.components().count() != 1 || name.is_absolute() {
            return Err(BridgeError::OperationFailed(format!(
                "Invalid download file name: {:?}",
                file_name
            )));
        }
        Ok(self.directory.join(name))
    }
}

impl Default for DirectorySaveTarget {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SaveTarget for DirectorySaveTarget {
    async fn save(&self, request: SaveRequest) -> Result<()> {
        let path = self.target_path(&request.file_name)?;

        fs::create_dir_all(&self.directory).await?;

        let mut file = fs::File::create(&path).await?;
        file.write_all(&request.data).await?;
        file.flush().await?;

        debug!(path = ?path, size = request.data.len(), "Saved download");
        Ok(())
    }
}
