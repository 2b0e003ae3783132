//! Per-export transient workspace.
//!
//! Every export stages its inputs, manifest and output in its own directory
//! under the configured work dir, so concurrent exports never collide on
//! file names. Inside the directory names are fixed and position-keyed.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::EngineResult;

const MANIFEST_NAME: &str = "manifest.txt";
const OUTPUT_STEM: &str = "output";

/// Staging directory owned by one export call.
///
/// [`StagingArea::close`] removes it; if the area is dropped instead (the
/// export future was cancelled or panicked) the directory is removed
/// synchronously on drop.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
    extension: String,
}

impl StagingArea {
    /// Create a fresh `export-XXXXXX` directory under `work_dir`.
    pub async fn create(work_dir: &Path, extension: &str) -> EngineResult<Self> {
        tokio::fs::create_dir_all(work_dir).await?;
        let work_dir = work_dir.to_path_buf();
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new().prefix("export-").tempdir_in(work_dir)
        })
        .await
        .map_err(std::io::Error::other)??;

        debug!(path = %dir.path().display(), "Staging area created");
        Ok(Self {
            dir,
            extension: extension.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Staged input for the clip at `position`.
    pub fn input_path(&self, position: usize, extension: &str) -> PathBuf {
        self.dir.path().join(format!("clip_{:02}.{}", position, extension))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.path().join(MANIFEST_NAME)
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir
            .path()
            .join(format!("{}.{}", OUTPUT_STEM, self.extension))
    }

    /// Remove the directory and everything in it.
    pub async fn close(self) -> EngineResult<()> {
        let path = self.dir.path().to_path_buf();
        let dir = self.dir;
        match tokio::task::spawn_blocking(move || dir.close()).await {
            Ok(result) => {
                result?;
                debug!(path = %path.display(), "Staging area removed");
                Ok(())
            }
            Err(e) => {
                warn!(path = %path.display(), "Staging cleanup task failed: {}", e);
                Err(std::io::Error::other(e).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_close_removes_everything() {
        let work = tempfile::tempdir().unwrap();
        let area = StagingArea::create(work.path(), "mp4").await.unwrap();
        let root = area.path().to_path_buf();

        tokio::fs::write(area.input_path(0, "mp4"), b"a").await.unwrap();
        tokio::fs::write(area.manifest_path(), b"file 'x'").await.unwrap();
        tokio::fs::write(area.output_path(), b"partial").await.unwrap();

        area.close().await.unwrap();
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_drop_removes_directory() {
        let work = tempfile::tempdir().unwrap();
        let root = {
            let area = StagingArea::create(work.path(), "mp4").await.unwrap();
            area.path().to_path_buf()
        };
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_areas_are_isolated() {
        let work = tempfile::tempdir().unwrap();
        let a = StagingArea::create(work.path(), "mp4").await.unwrap();
        let b = StagingArea::create(work.path(), "mp4").await.unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(a.input_path(3, "mov").file_name().unwrap(), "clip_03.mov");
        assert_eq!(a.output_path().file_name().unwrap(), "output.mp4");
    }
}
