//! The media-processing service boundary.
//!
//! The export pipeline and ingest code only talk to [`MediaService`], so the
//! transcode engine can be swapped (or faked in tests) without touching them.

use std::path::Path;
use async_trait::async_trait;

use crate::concat::concat_from_manifest;
use crate::error::MediaResult;
use crate::probe::probe_duration;
use crate::remux::rewrap_container;

/// Opaque media-processing collaborator.
///
/// Every call is atomic from the caller's point of view: on success the
/// output file exists, on failure the error carries the diagnostic.
#[async_trait]
pub trait MediaService: Send + Sync {
    /// Concatenate the inputs listed in `manifest`, in order, with stream copy.
    async fn concat(&self, manifest: &Path, output: &Path) -> MediaResult<()>;

    /// Rewrap a single file into the container implied by `output`.
    async fn rewrap(&self, input: &Path, output: &Path) -> MediaResult<()>;

    /// Decoded duration in seconds.
    async fn probe_duration(&self, input: &Path) -> MediaResult<f64>;
}

/// [`MediaService`] backed by the `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone, Default)]
pub struct FfmpegMediaService {
    timeout_secs: u64,
}

impl FfmpegMediaService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill FFmpeg runs that exceed `secs`. Zero disables the timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[async_trait]
impl MediaService for FfmpegMediaService {
    async fn concat(&self, manifest: &Path, output: &Path) -> MediaResult<()> {
        concat_from_manifest(manifest, output, self.timeout_secs).await
    }

    async fn rewrap(&self, input: &Path, output: &Path) -> MediaResult<()> {
        rewrap_container(input, output, self.timeout_secs).await
    }

    async fn probe_duration(&self, input: &Path) -> MediaResult<f64> {
        probe_duration(input).await
    }
}
