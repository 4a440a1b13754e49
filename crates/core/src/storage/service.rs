//! Blob backend implementation using Apache OpenDAL.

use std::collections::HashMap;
use std::time::Duration;

use brightpath_shared::config::{StorageConfig, StorageProvider};
use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};

use super::backend::BlobBackend;
use super::error::StorageError;

/// OpenDAL-backed blob store holding one operator per namespace.
///
/// Built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct OpendalBackend {
    provider: StorageProvider,
    public_base_url: Option<String>,
    operators: HashMap<String, Operator>,
}

impl OpendalBackend {
    /// Create a backend for the three asset namespaces in the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let namespaces = [
            config.namespaces.profile_images.as_str(),
            config.namespaces.course_images.as_str(),
            config.namespaces.course_resources.as_str(),
        ];
        Self::new(
            config.provider.clone(),
            config.public_base_url.clone(),
            &namespaces,
        )
    }

    /// Create a backend for an explicit set of namespaces.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn new(
        provider: StorageProvider,
        public_base_url: Option<String>,
        namespaces: &[&str],
    ) -> Result<Self, StorageError> {
        let mut operators = HashMap::with_capacity(namespaces.len());
        for namespace in namespaces {
            if namespace.is_empty() {
                return Err(StorageError::configuration("namespace must not be empty"));
            }
            let operator = Self::create_operator(&provider, namespace)?;
            operators.insert((*namespace).to_string(), operator);
        }

        Ok(Self {
            provider,
            public_base_url: public_base_url
                .map(|base| base.trim_end_matches('/').to_string())
                .filter(|base| !base.is_empty()),
            operators,
        })
    }

    /// Create OpenDAL operator for one namespace.
    fn create_operator(
        provider: &StorageProvider,
        namespace: &str,
    ) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                region,
                access_key_id,
                secret_access_key,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(namespace)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                endpoint,
            } => {
                let endpoint = endpoint
                    .clone()
                    .unwrap_or_else(|| azure_endpoint(account));
                let builder = services::Azblob::default()
                    .endpoint(&endpoint)
                    .account_name(account)
                    .account_key(access_key)
                    .container(namespace);
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let dir = root.join(namespace);
                let builder = services::Fs::default().root(
                    dir.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish(),
        };
        Ok(operator)
    }

    fn operator(&self, namespace: &str) -> Result<&Operator, StorageError> {
        self.operators
            .get(namespace)
            .ok_or_else(|| StorageError::unknown_namespace(namespace))
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

impl BlobBackend for OpendalBackend {
    async fn put(
        &self,
        namespace: &str,
        name: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let op = self.operator(namespace)?;

        // Filesystem and memory services reject the content-type option.
        if op.info().full_capability().write_with_content_type {
            op.write_with(name, content)
                .content_type(content_type)
                .await
                .map_err(StorageError::from)?;
        } else {
            op.write(name, content).await.map_err(StorageError::from)?;
        }
        Ok(())
    }

    async fn exists(&self, namespace: &str, name: &str) -> Result<bool, StorageError> {
        match self.operator(namespace)?.stat(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<bool, StorageError> {
        // OpenDAL deletes are idempotent, so presence is checked first.
        if !self.exists(namespace, name).await? {
            return Ok(false);
        }
        self.operator(namespace)?
            .delete(name)
            .await
            .map_err(StorageError::from)?;
        Ok(true)
    }

    fn url_for(&self, namespace: &str, name: &str) -> String {
        let base = self
            .public_base_url
            .clone()
            .unwrap_or_else(|| provider_base_url(&self.provider));
        format!("{base}/{namespace}/{name}")
    }

    async fn signed_url_for(
        &self,
        namespace: &str,
        name: &str,
        ttl: Duration,
    ) -> Result<String, StorageError> {
        let presigned = self
            .operator(namespace)?
            .presign_read(name, ttl)
            .await
            .map_err(StorageError::from)?;
        Ok(presigned.uri().to_string())
    }
}

fn azure_endpoint(account: &str) -> String {
    format!("https://{account}.blob.core.windows.net")
}

/// Base URL under which `<namespace>/<name>` is publicly addressable.
fn provider_base_url(provider: &StorageProvider) -> String {
    match provider {
        StorageProvider::S3 { endpoint, .. } => endpoint.trim_end_matches('/').to_string(),
        StorageProvider::AzureBlob {
            account, endpoint, ..
        } => endpoint.as_ref().map_or_else(
            || azure_endpoint(account),
            |e| e.trim_end_matches('/').to_string(),
        ),
        StorageProvider::LocalFs { root } => {
            format!("file://{}", root.display().to_string().trim_end_matches('/'))
        }
        StorageProvider::Memory => "memory:/".to_string(),
    }
}
