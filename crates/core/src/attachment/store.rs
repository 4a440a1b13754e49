//! Attachment lifecycle: validate, upload, delete, sign, download.

use std::sync::Arc;
use std::time::Duration;

use brightpath_shared::config::StorageConfig;
use bytes::Bytes;
use chrono::Utc;
use tracing::{error, info, warn};

use super::error::AttachmentError;
use super::policy::{AssetPolicies, AssetPolicy, extract_filename};
use super::types::{AssetKind, AssetUpload, SignedUrl, StoredAsset};
use crate::storage::{BlobBackend, StorageError};

/// Owns the naming, validation and storage of uploaded assets.
///
/// Never touches database records: callers persist the returned URL.
pub struct AttachmentStore<B: BlobBackend> {
    backend: Arc<B>,
    policies: AssetPolicies,
    http: reqwest::Client,
}

impl<B: BlobBackend> AttachmentStore<B> {
    /// Create a store with an explicit HTTP client for downloads.
    #[must_use]
    pub fn new(backend: Arc<B>, policies: AssetPolicies, http: reqwest::Client) -> Self {
        Self {
            backend,
            policies,
            http,
        }
    }

    /// Create a store from storage configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the download client cannot be built.
    pub fn from_config(backend: Arc<B>, config: &StorageConfig) -> Result<Self, AttachmentError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .build()
            .map_err(|e| AttachmentError::Configuration(e.to_string()))?;
        Ok(Self::new(backend, AssetPolicies::from_config(config), http))
    }

    /// Policy for a kind.
    #[must_use]
    pub const fn policy(&self, kind: AssetKind) -> &AssetPolicy {
        self.policies.get(kind)
    }

    /// The underlying blob backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validate an upload and store it under a fresh name.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any backend call, or
    /// `StorageUpload` if the backend write fails.
    pub async fn validate_and_upload(
        &self,
        upload: AssetUpload,
        kind: AssetKind,
    ) -> Result<StoredAsset, AttachmentError> {
        let policy = self.policy(kind);
        let size_bytes = upload.size();
        let extension = policy.validate(size_bytes, upload.original_filename.as_deref())?;

        let generated_name = policy.generate_name(&extension);
        let content_type =
            policy.content_type(&extension, upload.declared_content_type.as_deref());
        let namespace = policy.namespace();

        if let Err(source) = self
            .backend
            .put(namespace, &generated_name, upload.content, &content_type)
            .await
        {
            error!(
                kind = %kind,
                namespace,
                name = %generated_name,
                error = %source,
                "Asset upload failed"
            );
            return Err(AttachmentError::StorageUpload {
                namespace: namespace.to_string(),
                source,
            });
        }

        let url = self.backend.url_for(namespace, &generated_name);
        info!(
            kind = %kind,
            namespace,
            name = %generated_name,
            size_bytes,
            content_type = %content_type,
            "Asset uploaded"
        );

        Ok(StoredAsset {
            namespace: namespace.to_string(),
            generated_name,
            content_type,
            size_bytes,
            url,
        })
    }

    /// Delete a stored asset. Never fails.
    ///
    /// Returns `true` only if an object existed and was removed. Absent
    /// objects and backend errors yield `false` and a warning.
    pub async fn delete(&self, generated_name: &str, kind: AssetKind) -> bool {
        if generated_name.is_empty() {
            return false;
        }
        let namespace = self.policy(kind).namespace();

        match self.backend.delete(namespace, generated_name).await {
            Ok(true) => {
                info!(kind = %kind, namespace, name = generated_name, "Asset deleted");
                true
            }
            Ok(false) => {
                warn!(
                    kind = %kind,
                    namespace,
                    name = generated_name,
                    "Asset not found, nothing deleted"
                );
                false
            }
            Err(e) => {
                warn!(
                    kind = %kind,
                    namespace,
                    name = generated_name,
                    error = %e,
                    "Asset deletion failed"
                );
                false
            }
        }
    }

    /// Delete the asset a stored URL points at. `false` when there is none.
    pub async fn delete_by_url(&self, url: Option<&str>, kind: AssetKind) -> bool {
        match extract_filename(url) {
            Some(name) => self.delete(name, kind).await,
            None => false,
        }
    }

    /// Best-effort delete of the asset a record referenced before `current`
    /// replaced it.
    ///
    /// Call only after the record points at `current`. Returns `true` when the
    /// superseded object was removed; a failed delete leaves an orphan and is
    /// only logged.
    pub async fn supersede(
        &self,
        superseded_url: Option<&str>,
        current: &StoredAsset,
        kind: AssetKind,
    ) -> bool {
        let Some(old) =
            extract_filename(superseded_url).filter(|old| *old != current.generated_name)
        else {
            return false;
        };
        let deleted = self.delete(old, kind).await;
        if !deleted {
            warn!(kind = %kind, name = old, "Superseded asset left in storage");
        }
        deleted
    }

    /// Delete the asset behind `url` for an explicit removal.
    ///
    /// Returns `true` when the reference may be cleared: the object was
    /// deleted, or it is already gone.
    pub async fn release(&self, url: &str, kind: AssetKind) -> bool {
        let Some(name) = extract_filename(Some(url)).filter(|name| !name.is_empty()) else {
            return true;
        };
        if self.delete(name, kind).await {
            return true;
        }
        matches!(self.exists(name, kind).await, Ok(false))
    }

    /// Whether an asset is present.
    ///
    /// # Errors
    ///
    /// Returns the backend error if presence cannot be determined.
    pub async fn exists(
        &self,
        generated_name: &str,
        kind: AssetKind,
    ) -> Result<bool, StorageError> {
        self.backend
            .exists(self.policy(kind).namespace(), generated_name)
            .await
    }

    /// Permanent URL of an asset.
    #[must_use]
    pub fn url_for(&self, generated_name: &str, kind: AssetKind) -> String {
        self.backend
            .url_for(self.policy(kind).namespace(), generated_name)
    }

    /// Issue a read-only URL valid for `expiry_minutes`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidExpiry` for a zero lifetime, or `SignedUrl` if the
    /// backend cannot presign.
    pub async fn generate_signed_url(
        &self,
        generated_name: &str,
        kind: AssetKind,
        expiry_minutes: u32,
    ) -> Result<SignedUrl, AttachmentError> {
        if expiry_minutes == 0 {
            return Err(AttachmentError::InvalidExpiry);
        }
        let namespace = self.policy(kind).namespace();
        let expires_at = Utc::now() + chrono::Duration::minutes(i64::from(expiry_minutes));
        let ttl = Duration::from_secs(u64::from(expiry_minutes) * 60);

        let url = self
            .backend
            .signed_url_for(namespace, generated_name, ttl)
            .await
            .map_err(|source| AttachmentError::SignedUrl {
                namespace: namespace.to_string(),
                source,
            })?;

        Ok(SignedUrl { url, expires_at })
    }

    /// Fetch an asset's bytes through its permanent URL.
    ///
    /// # Errors
    ///
    /// Returns `Download` on network failure or a 4xx/5xx response.
    pub async fn download_by_url(&self, url: &str) -> Result<Bytes, AttachmentError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AttachmentError::download(url, e.to_string()))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            warn!(url, status = status.as_u16(), "Asset download rejected");
            return Err(AttachmentError::download(url, format!("HTTP {status}")));
        }

        response
            .bytes()
            .await
            .map_err(|e| AttachmentError::download(url, e.to_string()))
    }
}
