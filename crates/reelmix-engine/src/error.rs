//! Engine error types.

use reelmix_media::MediaError;
use reelmix_models::{ClipId, ClipRole};
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    #[error("Missing required role: no {0} clip available")]
    MissingRole(ClipRole),

    #[error("Clip '{clip_name}' ({clip_id}) has no retrievable payload")]
    MissingPayload { clip_id: ClipId, clip_name: String },

    #[error("Media service failed: {0}")]
    ExternalServiceFailure(#[from] MediaError),

    #[error("Export of sequence #{index} failed: {source}")]
    BatchExportFailed {
        /// 1-based position in the batch
        index: usize,
        #[source]
        source: Box<EngineError>,
    },

    #[error("Clip not found: {0}")]
    ClipNotFound(ClipId),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn missing_payload(clip_id: &ClipId, clip_name: impl Into<String>) -> Self {
        Self::MissingPayload {
            clip_id: clip_id.clone(),
            clip_name: clip_name.into(),
        }
    }

    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an export failure with its 1-based batch position.
    pub fn batch_failed(index: usize, source: EngineError) -> Self {
        Self::BatchExportFailed {
            index,
            source: Box::new(source),
        }
    }

    /// Errors the caller resolves by supplying different input.
    pub fn is_input_error(&self) -> bool {
        match self {
            EngineError::EmptyInput(_)
            | EngineError::MissingRole(_)
            | EngineError::MissingPayload { .. }
            | EngineError::ClipNotFound(_) => true,
            EngineError::BatchExportFailed { source, .. } => source.is_input_error(),
            _ => false,
        }
    }

    /// The innermost error, looking through batch wrappers.
    pub fn root_cause(&self) -> &EngineError {
        match self {
            EngineError::BatchExportFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
