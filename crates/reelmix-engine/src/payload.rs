//! Binary payload stores.
//!
//! Clips only carry a [`PayloadHandle`]. A store resolves the handle and
//! stages the bytes into an export's working directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use reelmix_models::PayloadHandle;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::EngineResult;

/// Resolves payload handles to bytes on disk.
#[async_trait]
pub trait PayloadStore: Send + Sync {
    /// Whether `handle` currently resolves to data.
    async fn exists(&self, handle: &PayloadHandle) -> bool;

    /// Write the payload behind `handle` to `dest`.
    async fn stage(&self, handle: &PayloadHandle, dest: &Path) -> EngineResult<()>;
}

/// Store whose handles are filesystem paths.
#[derive(Debug, Clone, Default)]
pub struct FsPayloadStore {
    root: Option<PathBuf>,
}

impl FsPayloadStore {
    /// Handles are absolute paths or relative to the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative handles against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Handle for a file path.
    pub fn handle_for(path: impl AsRef<Path>) -> PayloadHandle {
        PayloadHandle::new(path.as_ref().to_string_lossy())
    }

    fn resolve(&self, handle: &PayloadHandle) -> PathBuf {
        let path = Path::new(handle.as_str());
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl PayloadStore for FsPayloadStore {
    async fn exists(&self, handle: &PayloadHandle) -> bool {
        tokio::fs::metadata(self.resolve(handle))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn stage(&self, handle: &PayloadHandle, dest: &Path) -> EngineResult<()> {
        tokio::fs::copy(self.resolve(handle), dest).await?;
        Ok(())
    }
}

/// Store holding payloads in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPayloadStore {
    payloads: Arc<RwLock<HashMap<PayloadHandle, Arc<Vec<u8>>>>>,
}

impl MemoryPayloadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `bytes` and return a fresh handle for them.
    pub async fn insert(&self, bytes: impl Into<Vec<u8>>) -> PayloadHandle {
        let handle = PayloadHandle::new(format!("mem:{}", Uuid::new_v4()));
        self.payloads
            .write()
            .await
            .insert(handle.clone(), Arc::new(bytes.into()));
        handle
    }

    pub async fn remove(&self, handle: &PayloadHandle) -> bool {
        self.payloads.write().await.remove(handle).is_some()
    }

    pub async fn len(&self) -> usize {
        self.payloads.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.payloads.read().await.is_empty()
    }
}

#[async_trait]
impl PayloadStore for MemoryPayloadStore {
    async fn exists(&self, handle: &PayloadHandle) -> bool {
        self.payloads.read().await.contains_key(handle)
    }

    async fn stage(&self, handle: &PayloadHandle, dest: &Path) -> EngineResult<()> {
        let bytes = self.payloads.read().await.get(handle).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("payload {} not found", handle),
            )
        })?;
        tokio::fs::write(dest, bytes.as_slice()).await?;
        Ok(())
    }
}
