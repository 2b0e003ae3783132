//! Turning files on disk into registered clips.
//!
//! Containers listed in [`IngestConfig::rewrap_extensions`] are rewrapped
//! first so every clip's payload shares one container. The duration is
//! probed from the usable file and the role is guessed from the filename.
//!
//! Rewrapped copies live in an `ingest-XXXXXX` directory under
//! [`IngestConfig::normalized_dir`] owned by the [`ClipIngestor`]. It is
//! removed when the ingestor is dropped, so keep the ingestor alive until
//! every export of its clips has finished.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reelmix_media::{MediaError, MediaService};
use reelmix_models::{Clip, ClipRole};
use tempfile::TempDir;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classify::role_from_filename;
use crate::config::IngestConfig;
use crate::error::{EngineError, EngineResult};
use crate::payload::FsPayloadStore;

/// Extensions picked up by [`ClipIngestor::ingest_dir`].
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "mkv", "webm"];

pub struct ClipIngestor {
    media: Arc<dyn MediaService>,
    config: IngestConfig,
    /// Created on the first rewrap
    normalized: OnceCell<TempDir>,
}

impl ClipIngestor {
    pub fn new(media: Arc<dyn MediaService>, config: IngestConfig) -> Self {
        Self {
            media,
            config,
            normalized: OnceCell::new(),
        }
    }

    /// Directory holding this ingestor's rewrapped clips, if any were made.
    pub fn normalized_path(&self) -> Option<&Path> {
        self.normalized.get().map(TempDir::path)
    }

    /// Remove every rewrapped clip now instead of on drop.
    pub async fn close(mut self) -> EngineResult<()> {
        if let Some(dir) = self.normalized.take() {
            tokio::task::spawn_blocking(move || dir.close())
                .await
                .map_err(std::io::Error::other)??;
        }
        Ok(())
    }

    /// Ingest one file into a [`Clip`] whose payload is a filesystem path.
    ///
    /// Clips whose name carries no role hint default to selling point.
    pub async fn ingest(&self, path: &Path) -> EngineResult<Clip> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(MediaError::FileNotFound(path.to_path_buf()).into());
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let usable = self.normalize(path).await?;
        let duration = self.media.probe_duration(&usable).await?;
        let role = role_from_filename(&name).unwrap_or(ClipRole::SellingPoint);

        debug!(name = %name, duration, role = %role, "Clip ingested");

        Ok(Clip::new(name, duration, role).with_payload(FsPayloadStore::handle_for(&usable)))
    }

    /// Ingest every video file in `dir`, in filename order.
    pub async fn ingest_dir(&self, dir: &Path) -> EngineResult<Vec<Clip>> {
        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && is_video_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut clips = Vec::with_capacity(paths.len());
        for path in &paths {
            clips.push(self.ingest(path).await?);
        }

        info!(dir = %dir.display(), clips = clips.len(), "Directory ingested");
        Ok(clips)
    }

    /// Rewrap the container when required, returning the usable path.
    async fn normalize(&self, path: &Path) -> EngineResult<PathBuf> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        if !self.config.needs_rewrap(&extension) {
            return Ok(path.to_path_buf());
        }

        let dir = self.normalized_dir().await?;
        let output = dir.join(format!("{}.{}", Uuid::new_v4(), self.config.rewrap_target));

        if let Err(e) = self.media.rewrap(path, &output).await {
            if tokio::fs::remove_file(&output).await.is_ok() {
                warn!(output = %output.display(), "Removed partial rewrap output");
            }
            return Err(e.into());
        }
        Ok(output)
    }

    async fn normalized_dir(&self) -> EngineResult<&Path> {
        let dir = self
            .normalized
            .get_or_try_init(|| async {
                let parent = self.config.normalized_dir.clone();
                tokio::fs::create_dir_all(&parent).await?;
                let dir = tokio::task::spawn_blocking(move || {
                    tempfile::Builder::new().prefix("ingest-").tempdir_in(parent)
                })
                .await
                .map_err(std::io::Error::other)??;
                debug!(path = %dir.path().display(), "Normalized area created");
                Ok::<_, EngineError>(dir)
            })
            .await?;
        Ok(dir.path())
    }
}

fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reelmix_media::MediaResult;
    use std::sync::Mutex;

    /// Copies on rewrap and reports a fixed duration.
    #[derive(Default)]
    struct StubMedia {
        rewraps: Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl MediaService for StubMedia {
        async fn concat(&self, _manifest: &Path, _output: &Path) -> MediaResult<()> {
            unreachable!("ingest never concatenates")
        }

        async fn rewrap(&self, input: &Path, output: &Path) -> MediaResult<()> {
            tokio::fs::copy(input, output).await?;
            self.rewraps.lock().unwrap().push(input.to_path_buf());
            Ok(())
        }

        async fn probe_duration(&self, _input: &Path) -> MediaResult<f64> {
            Ok(4.25)
        }
    }

    fn ingestor(media: Arc<StubMedia>, normalized: &Path) -> ClipIngestor {
        let config = IngestConfig {
            normalized_dir: normalized.to_path_buf(),
            ..IngestConfig::default()
        };
        ClipIngestor::new(media, config)
    }

    #[tokio::test]
    async fn test_ingest_mp4_uses_file_directly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hook_1.mp4");
        tokio::fs::write(&path, b"x").await.unwrap();

        let media = Arc::new(StubMedia::default());
        let clip = ingestor(media.clone(), &dir.path().join("norm"))
            .ingest(&path)
            .await
            .unwrap();

        assert_eq!(clip.name, "hook_1.mp4");
        assert_eq!(clip.role, ClipRole::Hook);
        assert!((clip.duration - 4.25).abs() < 1e-9);
        assert_eq!(clip.payload.unwrap().as_str(), path.to_string_lossy());
        assert!(media.rewraps.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_mov_is_rewrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CTA.mov");
        tokio::fs::write(&path, b"x").await.unwrap();

        let media = Arc::new(StubMedia::default());
        let normalized = dir.path().join("norm");
        let ingestor = ingestor(media.clone(), &normalized);
        let clip = ingestor.ingest(&path).await.unwrap();

        assert_eq!(clip.role, ClipRole::Cta);
        let payload = PathBuf::from(clip.payload.unwrap().as_str());
        assert!(payload.starts_with(&normalized));
        assert_eq!(payload.extension().unwrap(), "mp4");
        assert!(payload.exists());
        assert_eq!(media.rewraps.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rewrapped_clips_removed_with_ingestor() {
        let dir = tempfile::tempdir().unwrap();
        let normalized = dir.path().join("norm");
        for name in ["hook.mov", "cta.mkv", "sp.mp4"] {
            tokio::fs::write(dir.path().join(name), b"x").await.unwrap();
        }

        let ingestor = ingestor(Arc::new(StubMedia::default()), &normalized);
        let clips = ingestor.ingest_dir(dir.path()).await.unwrap();
        let area = ingestor.normalized_path().unwrap().to_path_buf();
        assert!(area.starts_with(&normalized));

        let rewrapped: Vec<PathBuf> = clips
            .iter()
            .map(|c| PathBuf::from(c.payload.as_ref().unwrap().as_str()))
            .filter(|p| p.starts_with(&area))
            .collect();
        assert_eq!(rewrapped.len(), 2);
        assert!(rewrapped.iter().all(|p| p.exists()));

        drop(ingestor);
        assert!(!area.exists());
        assert!(rewrapped.iter().all(|p| !p.exists()));
        assert_eq!(std::fs::read_dir(&normalized).unwrap().count(), 0);
        // Source files are never touched
        assert!(dir.path().join("hook.mov").exists());
    }

    #[tokio::test]
    async fn test_close_removes_normalized_area() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hook.webm");
        tokio::fs::write(&path, b"x").await.unwrap();

        let ingestor = ingestor(Arc::new(StubMedia::default()), &dir.path().join("norm"));
        assert!(ingestor.normalized_path().is_none());
        ingestor.ingest(&path).await.unwrap();
        let area = ingestor.normalized_path().unwrap().to_path_buf();

        ingestor.close().await.unwrap();
        assert!(!area.exists());
    }

    #[tokio::test]
    async fn test_unknown_role_defaults_to_selling_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0042.mp4");
        tokio::fs::write(&path, b"x").await.unwrap();

        let clip = ingestor(Arc::new(StubMedia::default()), dir.path())
            .ingest(&path)
            .await
            .unwrap();
        assert_eq!(clip.role, ClipRole::SellingPoint);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ingestor(Arc::new(StubMedia::default()), dir.path())
            .ingest(&dir.path().join("nope.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::EngineError::ExternalServiceFailure(MediaError::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_ingest_dir_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b_cta.mp4", "a_hook.mp4", "notes.txt", "c_point.webm"] {
            tokio::fs::write(dir.path().join(name), b"x").await.unwrap();
        }
        tokio::fs::create_dir(dir.path().join("sub.mp4")).await.unwrap();

        let clips = ingestor(Arc::new(StubMedia::default()), &dir.path().join("norm"))
            .ingest_dir(dir.path())
            .await
            .unwrap();

        let names: Vec<&str> = clips.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a_hook.mp4", "b_cta.mp4", "c_point.webm"]);
    }
}
