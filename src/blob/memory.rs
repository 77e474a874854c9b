//! In-process blob store backed by a map of live payloads.

use super::BlobStore;
use crate::types::PlaybackHandle;
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<PlaybackHandle, Bytes>>,
    download_dir: PathBuf,
}

impl MemoryBlobStore {
    /// Downloads land in the current directory.
    pub fn new() -> Self {
        Self::with_download_dir(".")
    }

    pub fn with_download_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            download_dir: dir.into(),
        }
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for MemoryBlobStore {
    fn create(&self, payload: Bytes) -> PlaybackHandle {
        let handle = PlaybackHandle::new(format!("blob:{}", Uuid::new_v4()));
        debug!(%handle, bytes = payload.len(), "created playback handle");
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle.clone(), payload);
        handle
    }

    fn resolve(&self, handle: &PlaybackHandle) -> Option<Bytes> {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(handle)
            .cloned()
    }

    fn revoke(&self, handle: &PlaybackHandle) -> bool {
        let removed = self
            .blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(handle)
            .is_some();
        if removed {
            debug!(%handle, "revoked playback handle");
        }
        removed
    }

    fn download(&self, payload: &[u8], filename: &str) -> Result<PathBuf> {
        validate_filename(filename)?;
        std::fs::create_dir_all(&self.download_dir)?;
        let path = self.download_dir.join(filename);
        std::fs::write(&path, payload)?;
        info!(path = %path.display(), bytes = payload.len(), "audio saved");
        Ok(path)
    }

    fn live_handles(&self) -> usize {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn validate_filename(filename: &str) -> Result<()> {
    let bad = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0']);
    if bad {
        return Err(Error::validation_with_context(
            format!("invalid download filename '{}'", filename),
            ErrorContext::new()
                .with_field_path("download.filename")
                .with_source("blob_store"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_resolves_to_identical_bytes() {
        let store = MemoryBlobStore::new();
        let payload = Bytes::from_static(b"ID3\x04\x00fake-mp3");
        let handle = store.create(payload.clone());
        assert!(handle.as_str().starts_with("blob:"));
        assert_eq!(store.resolve(&handle).unwrap(), payload);
        assert_eq!(store.live_handles(), 1);
    }

    #[test]
    fn revoke_is_idempotent() {
        let store = MemoryBlobStore::new();
        let handle = store.create(Bytes::from_static(b"abc"));
        assert!(store.revoke(&handle));
        assert!(!store.revoke(&handle));
        assert!(store.resolve(&handle).is_none());
        assert_eq!(store.live_handles(), 0);

        // A new payload never reuses a revoked handle.
        let next = store.create(Bytes::from_static(b"abc"));
        assert_ne!(next, handle);
    }

    #[test]
    fn download_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryBlobStore::with_download_dir(dir.path().join("nested"));
        let path = store
            .download(b"audio-bytes", "audio-internal-highLevel-1.mp3")
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"audio-bytes");
        assert_eq!(path.parent().unwrap(), dir.path().join("nested"));
    }

    #[test]
    fn download_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryBlobStore::with_download_dir(dir.path());
        for name in ["", "..", "../x.mp3", "a/b.mp3", "a\\b.mp3"] {
            let err = store.download(b"x", name).unwrap_err();
            assert!(matches!(err, Error::Validation { .. }), "{}", name);
        }
    }
}
