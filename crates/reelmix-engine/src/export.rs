//! Export pipeline: turns sequences into concatenated media artifacts.
//!
//! # Single export
//! 1. Check every clip has a resolvable payload
//! 2. Stage payloads as `clip_NN.<ext>` in a fresh [`StagingArea`]
//! 3. Write the concat manifest in sequence order
//! 4. One stream-copy concat call on the [`MediaService`]
//! 5. Read the output back and remove the staging area, on every exit path
//!
//! # Batch export
//! Sequences are exported one at a time, in order. The first failure aborts
//! the batch and no archive is produced.

use std::sync::Arc;

use reelmix_media::{ConcatManifest, MediaError, MediaService};
use reelmix_models::{Clip, PayloadHandle, Sequence, SequenceId};
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::archive::{ArchiveEntry, ArchiveWriter};
use crate::config::ExportConfig;
use crate::error::{EngineError, EngineResult};
use crate::logging::ExportLogger;
use crate::payload::PayloadStore;
use crate::staging::StagingArea;

/// A finished media file for one sequence.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Display / download name
    pub name: String,
    pub bytes: Vec<u8>,
    pub sequence_id: SequenceId,
    /// Sequence duration in seconds
    pub duration: f64,
}

/// Turns sequences into media artifacts and archives.
pub struct ExportPipeline {
    media: Arc<dyn MediaService>,
    payloads: Arc<dyn PayloadStore>,
    archiver: Arc<dyn ArchiveWriter>,
    config: ExportConfig,
}

impl ExportPipeline {
    pub fn new(
        media: Arc<dyn MediaService>,
        payloads: Arc<dyn PayloadStore>,
        archiver: Arc<dyn ArchiveWriter>,
        config: ExportConfig,
    ) -> Self {
        Self {
            media,
            payloads,
            archiver,
            config,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export one sequence into a single concatenated artifact.
    pub async fn export_one(&self, sequence: &Sequence) -> EngineResult<Artifact> {
        let logger = ExportLogger::for_sequence(sequence.id);
        let span = logger.create_span();
        self.export_one_logged(sequence, &logger).instrument(span).await
    }

    /// Export every sequence, in order, into one archive.
    ///
    /// Entries are named `video_<n>.<ext>` with `n` the 1-based position.
    pub async fn export_all(&self, sequences: &[Sequence]) -> EngineResult<Vec<u8>> {
        if sequences.is_empty() {
            return Err(EngineError::EmptyInput("no sequences to export"));
        }

        let logger = ExportLogger::for_batch(Uuid::new_v4());
        let span = logger.create_span();

        async {
            logger.log_start(&format!("{} sequences", sequences.len()));

            let mut entries = Vec::with_capacity(sequences.len());
            for (i, sequence) in sequences.iter().enumerate() {
                let index = i + 1;
                let artifact = match self.export_one(sequence).await {
                    Ok(artifact) => artifact,
                    Err(e) => {
                        logger.log_error(&format!(
                            "sequence #{} failed, aborting batch: {}",
                            index, e
                        ));
                        return Err(EngineError::batch_failed(index, e));
                    }
                };
                logger.log_progress(&format!("{}/{} exported", index, sequences.len()));
                entries.push(ArchiveEntry::new(
                    archive_entry_name(index, &self.config.output_extension),
                    artifact.bytes,
                ));
            }

            let archive = self.archiver.package(entries).await?;
            logger.log_completion(&format!("archive of {} bytes", archive.len()));
            Ok(archive)
        }
        .instrument(span)
        .await
    }

    async fn export_one_logged(
        &self,
        sequence: &Sequence,
        logger: &ExportLogger,
    ) -> EngineResult<Artifact> {
        logger.log_start(&format!("{} clips, {:.2}s", sequence.len(), sequence.duration));

        let handles = self.resolve_payloads(sequence).await?;

        let staging =
            StagingArea::create(&self.config.work_dir, &self.config.output_extension).await?;
        let result = self.render(&staging, sequence, &handles).await;

        if let Err(e) = staging.close().await {
            logger.log_warning(&format!("staging cleanup failed: {}", e));
        }

        match &result {
            Ok(artifact) => logger.log_completion(&format!(
                "{} ({} bytes)",
                artifact.name,
                artifact.bytes.len()
            )),
            Err(e) => logger.log_error(&e.to_string()),
        }
        result
    }

    /// Every clip must carry a payload the store can resolve.
    async fn resolve_payloads(&self, sequence: &Sequence) -> EngineResult<Vec<PayloadHandle>> {
        let mut handles = Vec::with_capacity(sequence.len());
        for clip in &sequence.clips {
            let handle = clip
                .payload
                .as_ref()
                .ok_or_else(|| EngineError::missing_payload(&clip.id, &clip.name))?;
            if !self.payloads.exists(handle).await {
                return Err(EngineError::missing_payload(&clip.id, &clip.name));
            }
            handles.push(handle.clone());
        }
        Ok(handles)
    }

    async fn render(
        &self,
        staging: &StagingArea,
        sequence: &Sequence,
        handles: &[PayloadHandle],
    ) -> EngineResult<Artifact> {
        let mut manifest = ConcatManifest::new();
        for (position, (clip, handle)) in sequence.clips.iter().zip(handles).enumerate() {
            let extension = staged_extension(clip, handle, &self.config.output_extension);
            let dest = staging.input_path(position, &extension);
            self.payloads
                .stage(handle, &dest)
                .await
                .map_err(|e| payload_vanished(e, clip))?;
            debug!(position, clip_id = %clip.id, "Staged clip");
            manifest.push(dest);
        }

        let manifest_path = staging.manifest_path();
        manifest
            .write_to(&manifest_path)
            .await
            .map_err(|e| match e {
                MediaError::Io(io) => EngineError::Io(io),
                other => other.into(),
            })?;

        let output = staging.output_path();
        self.media.concat(&manifest_path, &output).await?;

        let bytes = tokio::fs::read(&output).await?;
        Ok(Artifact {
            name: single_artifact_name(sequence.id, &self.config.output_extension),
            bytes,
            sequence_id: sequence.id,
            duration: sequence.duration,
        })
    }
}

/// A payload removed between the existence check and staging is still a
/// missing payload.
fn payload_vanished(err: EngineError, clip: &Clip) -> EngineError {
    match err {
        EngineError::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound => {
            EngineError::missing_payload(&clip.id, &clip.name)
        }
        other => other,
    }
}

/// Extension for a staged input: the payload's own, then the clip name's,
/// then the output container's.
fn staged_extension(clip: &Clip, handle: &PayloadHandle, default: &str) -> String {
    std::path::Path::new(handle.as_str())
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_lowercase())
        .or_else(|| clip.extension())
        .unwrap_or_else(|| default.to_string())
}

/// Name of a directly downloaded artifact.
pub fn single_artifact_name(id: SequenceId, extension: &str) -> String {
    format!("sequence_{}.{}", id, extension)
}

/// Name of the `index`-th (1-based) entry in a batch archive.
pub fn archive_entry_name(index: usize, extension: &str) -> String {
    format!("video_{}.{}", index, extension)
}
