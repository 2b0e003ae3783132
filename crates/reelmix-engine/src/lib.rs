//! Clip sequencing and export engine.
//!
//! This crate provides:
//! - A clip registry holding classified clip metadata
//! - Randomized generation of distinct hook / selling point / cta sequences
//! - The export pipeline: staging, stream-copy concat, batch archives
//! - Clip ingest (container rewrap, duration probe, role detection)
//! - Configuration, logging and the `reelmix` binary

pub mod archive;
pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod ingest;
pub mod logging;
pub mod payload;
pub mod registry;
pub mod staging;

pub use archive::{ArchiveEntry, ArchiveWriter, ZipArchiveWriter};
pub use classify::role_from_filename;
pub use config::{EngineConfig, ExportConfig, GeneratorConfig, IngestConfig};
pub use error::{EngineError, EngineResult};
pub use export::{Artifact, ExportPipeline};
pub use generator::{binomial, combination_ceiling, Generation, SequenceGenerator};
pub use ingest::ClipIngestor;
pub use logging::{init_tracing, ExportLogger};
pub use payload::{FsPayloadStore, MemoryPayloadStore, PayloadStore};
pub use registry::ClipRegistry;
pub use staging::StagingArea;
