//! FFmpeg CLI wrapper for clip assembly.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - Concat demuxer manifests and stream-copy concatenation
//! - Container rewrapping and duration probing
//! - The [`MediaService`] boundary used by the export pipeline

pub mod command;
pub mod concat;
pub mod error;
pub mod probe;
pub mod progress;
pub mod remux;
pub mod service;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use concat::{concat_from_manifest, ConcatManifest};
pub use error::{MediaError, MediaResult};
pub use probe::probe_duration;
pub use progress::FfmpegProgress;
pub use remux::rewrap_container;
pub use service::{FfmpegMediaService, MediaService};
