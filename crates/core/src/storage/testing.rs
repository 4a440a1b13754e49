//! In-memory blob backend with call counters and failure injection.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;

use super::backend::BlobBackend;
use super::error::StorageError;

#[derive(Debug, Clone)]
pub(crate) struct StoredObject {
    pub content: Bytes,
    pub content_type: String,
}

#[derive(Debug, Default)]
pub(crate) struct FakeBackend {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    puts: AtomicUsize,
    deletes: AtomicUsize,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn get(&self, namespace: &str, name: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn contains(&self, namespace: &str, name: &str) -> bool {
        self.get(namespace, name).is_some()
    }

    pub fn insert(&self, namespace: &str, name: &str, content_type: &str) {
        self.objects.lock().unwrap().insert(
            (namespace.to_string(), name.to_string()),
            StoredObject {
                content: Bytes::from_static(b"seeded"),
                content_type: content_type.to_string(),
            },
        );
    }
}

impl BlobBackend for FakeBackend {
    async fn put(
        &self,
        namespace: &str,
        name: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::operation("injected put failure"));
        }
        self.objects.lock().unwrap().insert(
            (namespace.to_string(), name.to_string()),
            StoredObject {
                content,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn exists(&self, namespace: &str, name: &str) -> Result<bool, StorageError> {
        Ok(self.contains(namespace, name))
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<bool, StorageError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::operation("injected delete failure"));
        }
        Ok(self
            .objects
            .lock()
            .unwrap()
            .remove(&(namespace.to_string(), name.to_string()))
            .is_some())
    }

    fn url_for(&self, namespace: &str, name: &str) -> String {
        format!("https://blobs.test/{namespace}/{name}")
    }

    async fn signed_url_for(
        &self,
        namespace: &str,
        name: &str,
        ttl: Duration,
    ) -> Result<String, StorageError> {
        Ok(format!(
            "https://blobs.test/{namespace}/{name}?sig=fake&se={}",
            ttl.as_secs()
        ))
    }
}
