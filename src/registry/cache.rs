//! Read-through snapshot cache.
//!
//! # Responsibilities
//! - Load each snapshot file from disk on first use
//! - Serve every later read from memory
//! - Decode records from the shared bytes per caller
//!
//! # Design Decisions
//! - One lock per resource, held only across check-and-populate
//! - Populated bytes are immutable; no refresh, no eviction
//! - Decoding happens outside the lock on the caller's own copy

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{ApiError, ApiResult, DecodeOrigin};
use crate::observability::metrics;
use crate::registry::types::{Envelope, Record, ResourceKind};

#[derive(Default)]
struct Slot {
    bytes: Mutex<Option<Arc<[u8]>>>,
    disk_reads: AtomicU64,
}

/// Process-lifetime cache of raw snapshot documents.
pub struct SnapshotCache {
    directory: PathBuf,
    slots: [Slot; 4],
}

impl SnapshotCache {
    /// Create an empty cache over the given snapshot directory.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            slots: Default::default(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Return the raw snapshot bytes for `kind`, reading the file on first use.
    pub async fn load(&self, kind: ResourceKind) -> ApiResult<Arc<[u8]>> {
        let slot = &self.slots[kind.index()];
        let mut guard = slot.bytes.lock().await;
        if let Some(bytes) = guard.as_ref() {
            return Ok(bytes.clone());
        }

        let path = self.directory.join(kind.file_name());
        slot.disk_reads.fetch_add(1, Ordering::Relaxed);
        let bytes: Arc<[u8]> = match tokio::fs::read(&path).await {
            Ok(raw) => raw.into(),
            Err(e) => {
                tracing::error!(
                    resource = %kind,
                    path = %path.display(),
                    error = %e,
                    "Snapshot unreadable"
                );
                return Err(ApiError::CacheUnavailable { resource: kind });
            }
        };

        tracing::info!(resource = %kind, bytes = bytes.len(), "Snapshot loaded");
        metrics::record_snapshot_load(kind, bytes.len());

        *guard = Some(bytes.clone());
        Ok(bytes)
    }

    /// Decode every record of `T`'s collection.
    pub async fn records<T: Record>(&self) -> ApiResult<Vec<T>> {
        let bytes = self.load(T::KIND).await?;
        let envelope: Envelope<T> = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::decode(DecodeOrigin::Snapshot(T::KIND), e))?;
        Ok(envelope.data)
    }

    /// Number of times the snapshot file for `kind` was read from disk.
    pub fn disk_reads(&self, kind: ResourceKind) -> u64 {
        self.slots[kind.index()].disk_reads.load(Ordering::Relaxed)
    }

    pub async fn is_populated(&self, kind: ResourceKind) -> bool {
        self.slots[kind.index()].bytes.lock().await.is_some()
    }
}

impl std::fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}
