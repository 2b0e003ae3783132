//! Concat demuxer manifests and stream-copy concatenation.
//!
//! Inputs are joined with the concat demuxer and `-c copy`, so all inputs
//! must share codecs and stream layout. Nothing is re-encoded.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Ordered list of inputs for the concat demuxer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConcatManifest {
    entries: Vec<PathBuf>,
}

impl ConcatManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Entries are concatenated in insertion order.
    pub fn push(&mut self, path: impl Into<PathBuf>) {
        self.entries.push(path.into());
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render in concat demuxer syntax, one `file '...'` line per entry.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|p| format!("file '{}'\n", escape_path(p)))
            .collect()
    }

    /// Parse a manifest produced by [`ConcatManifest::render`].
    pub fn parse(text: &str) -> MediaResult<Self> {
        let mut manifest = Self::new();
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'));
        for line in lines {
            let quoted = line
                .strip_prefix("file ")
                .map(str::trim)
                .and_then(|q| q.strip_prefix('\''))
                .and_then(|q| q.strip_suffix('\''))
                .ok_or_else(|| {
                    MediaError::invalid_media(format!("Malformed manifest line: {}", line))
                })?;
            manifest.push(quoted.replace("'\\''", "'"));
        }
        Ok(manifest)
    }

    /// Write the rendered manifest to `path`.
    pub async fn write_to(&self, path: impl AsRef<Path>) -> MediaResult<()> {
        tokio::fs::write(path.as_ref(), self.render()).await?;
        Ok(())
    }
}

impl FromIterator<PathBuf> for ConcatManifest {
    fn from_iter<T: IntoIterator<Item = PathBuf>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Quote-escape a path for a single-quoted manifest string.
fn escape_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', "'\\''")
}

/// Concatenate the manifest's entries into `output` using stream copy.
pub async fn concat_from_manifest(
    manifest: impl AsRef<Path>,
    output: impl AsRef<Path>,
    timeout_secs: u64,
) -> MediaResult<()> {
    let manifest = manifest.as_ref();
    let output = output.as_ref();

    if !manifest.exists() {
        return Err(MediaError::FileNotFound(manifest.to_path_buf()));
    }

    info!(
        manifest = %manifest.display(),
        output = %output.display(),
        "Concatenating with stream copy"
    );

    let cmd = FfmpegCommand::new(manifest, output)
        .concat_demuxer()
        .codec_copy()
        .faststart();

    FfmpegRunner::new()
        .with_timeout(timeout_secs)
        .run_with_progress(&cmd, |p| {
            tracing::debug!(out_time_ms = p.out_time_ms, speed = p.speed, "Concat progress");
        })
        .await?;

    if !output.exists() {
        return Err(MediaError::ffmpeg_failed(
            "FFmpeg reported success but produced no output",
            None,
            None,
        ));
    }

    Ok(())
}
