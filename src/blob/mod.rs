//! Blob storage capability: playback handles and downloads.
//!
//! Stands in for browser object URLs and anchor-click downloads so the
//! generation lifecycle can run (and be tested) without a browser.

mod memory;

pub use memory::MemoryBlobStore;

use crate::types::PlaybackHandle;
use crate::Result;
use bytes::Bytes;
use std::path::PathBuf;

pub trait BlobStore: Send + Sync {
    /// Register a payload and return a handle that resolves to it.
    fn create(&self, payload: Bytes) -> PlaybackHandle;

    /// The payload behind a live handle; `None` once revoked.
    fn resolve(&self, handle: &PlaybackHandle) -> Option<Bytes>;

    /// Invalidate a handle. Returns whether anything was freed; repeated calls are no-ops.
    fn revoke(&self, handle: &PlaybackHandle) -> bool;

    /// Save a payload under `filename` and return where it was written.
    fn download(&self, payload: &[u8], filename: &str) -> Result<PathBuf>;

    /// Number of handles created and not yet revoked.
    fn live_handles(&self) -> usize;
}
