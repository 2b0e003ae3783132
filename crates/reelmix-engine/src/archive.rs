//! Archive packaging for batch exports.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use async_trait::async_trait;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{EngineError, EngineResult};

/// One named file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Packs entries into one byte stream.
#[async_trait]
pub trait ArchiveWriter: Send + Sync {
    /// Package `entries` in the given order.
    async fn package(&self, entries: Vec<ArchiveEntry>) -> EngineResult<Vec<u8>>;
}

/// ZIP archive writer.
///
/// Entries are stored, not deflated: the payloads are already-compressed
/// video.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveWriter;

impl ZipArchiveWriter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArchiveWriter for ZipArchiveWriter {
    async fn package(&self, entries: Vec<ArchiveEntry>) -> EngineResult<Vec<u8>> {
        tokio::task::spawn_blocking(move || write_zip(entries))
            .await
            .map_err(|e| EngineError::archive(format!("archive task failed: {}", e)))?
    }
}

fn write_zip(entries: Vec<ArchiveEntry>) -> EngineResult<Vec<u8>> {
    let mut seen = HashSet::new();
    for entry in &entries {
        if !seen.insert(entry.name.as_str()) {
            return Err(EngineError::archive(format!("duplicate entry name: {}", entry.name)));
        }
    }

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .large_file(entries.iter().any(|e| e.bytes.len() as u64 >= u32::MAX as u64));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for entry in &entries {
        writer
            .start_file(entry.name.as_str(), options)
            .map_err(|e| EngineError::archive(e.to_string()))?;
        writer.write_all(&entry.bytes)?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| EngineError::archive(e.to_string()))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[tokio::test]
    async fn test_zip_keeps_order_and_content() {
        let bytes = ZipArchiveWriter::new()
            .package(vec![
                ArchiveEntry::new("video_1.mp4", b"first".to_vec()),
                ArchiveEntry::new("video_2.mp4", b"second".to_vec()),
            ])
            .await
            .unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "video_1.mp4");
        let mut content = String::new();
        first.read_to_string(&mut content).unwrap();
        assert_eq!(content, "first");
        drop(first);

        assert_eq!(archive.by_index(1).unwrap().name(), "video_2.mp4");
    }

    #[tokio::test]
    async fn test_duplicate_names_rejected() {
        let err = ZipArchiveWriter::new()
            .package(vec![
                ArchiveEntry::new("a.mp4", Vec::new()),
                ArchiveEntry::new("a.mp4", Vec::new()),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Archive(_)));
    }
}
