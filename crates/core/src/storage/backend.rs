//! Blob backend contract.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;

use super::error::StorageError;

/// Minimal object-store contract used by the attachment layer.
///
/// Names are flat within a namespace. Implementations must be safe to share
/// across request handlers.
pub trait BlobBackend: Send + Sync {
    /// Store `content` under `name`, replacing nothing (callers pass fresh names).
    fn put(
        &self,
        namespace: &str,
        name: &str,
        content: Bytes,
        content_type: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Whether an object is present.
    fn exists(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<bool, StorageError>> + Send;

    /// Remove an object. Returns `true` if something was removed.
    fn delete(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<bool, StorageError>> + Send;

    /// Permanent, unsigned URL of an object.
    fn url_for(&self, namespace: &str, name: &str) -> String;

    /// Time-limited read-only URL of an object.
    fn signed_url_for(
        &self,
        namespace: &str,
        name: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;
}
