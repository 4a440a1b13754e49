//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound for a single request, uploads and downloads included.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Maximum accepted request body (multipart uploads).
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    60
}

fn default_max_body_bytes() -> usize {
    50 * 1024 * 1024
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Storage provider settings.
///
/// Each asset namespace maps to one bucket (S3), one container (Azure) or one
/// sub-directory (local filesystem).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage (AWS S3, Cloudflare R2, MinIO, Supabase).
    S3 {
        /// Endpoint URL, e.g. `https://s3.amazonaws.com`.
        endpoint: String,
        /// Region.
        #[serde(default = "default_region")]
        region: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
    },

    /// Azure Blob Storage.
    AzureBlob {
        /// Storage account name.
        account: String,
        /// Storage account key.
        access_key: String,
        /// Endpoint override (Azurite, sovereign clouds).
        #[serde(default)]
        endpoint: Option<String>,
    },

    /// Local filesystem, for development.
    LocalFs {
        /// Root directory; namespaces become sub-directories.
        root: PathBuf,
    },

    /// In-process memory store, for tests and demos.
    Memory,
}

fn default_region() -> String {
    "auto".to_string()
}

impl Default for StorageProvider {
    fn default() -> Self {
        Self::LocalFs {
            root: PathBuf::from("./data/uploads"),
        }
    }
}

impl StorageProvider {
    /// Short provider name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local_fs",
            Self::Memory => "memory",
        }
    }
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Backend provider.
    #[serde(default)]
    pub provider: StorageProvider,
    /// Base for permanent URLs (`<base>/<namespace>/<name>`). Derived from the
    /// provider when unset.
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// Timeout for fetching a stored asset back by URL.
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
    /// Lifetime of signed URLs when the caller does not pick one.
    #[serde(default = "default_signed_url_expiry")]
    pub signed_url_expiry_minutes: u32,
    /// Namespace names per asset kind.
    #[serde(default)]
    pub namespaces: NamespaceConfig,
    /// Policy shared by profile and course images.
    #[serde(default)]
    pub images: ImagePolicyConfig,
    /// Policy for course resources.
    #[serde(default)]
    pub resources: ResourcePolicyConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::default(),
            public_base_url: None,
            download_timeout_secs: default_download_timeout(),
            signed_url_expiry_minutes: default_signed_url_expiry(),
            namespaces: NamespaceConfig::default(),
            images: ImagePolicyConfig::default(),
            resources: ResourcePolicyConfig::default(),
        }
    }
}

fn default_download_timeout() -> u64 {
    30
}

fn default_signed_url_expiry() -> u32 {
    60
}

/// Namespace (bucket / container) names.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NamespaceConfig {
    /// Profile images.
    #[serde(default = "default_profile_images_ns")]
    pub profile_images: String,
    /// Course cover images.
    #[serde(default = "default_course_images_ns")]
    pub course_images: String,
    /// Course PDF resources.
    #[serde(default = "default_course_resources_ns")]
    pub course_resources: String,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            profile_images: default_profile_images_ns(),
            course_images: default_course_images_ns(),
            course_resources: default_course_resources_ns(),
        }
    }
}

fn default_profile_images_ns() -> String {
    "profile-images".to_string()
}

fn default_course_images_ns() -> String {
    "course-images".to_string()
}

fn default_course_resources_ns() -> String {
    "course-resources".to_string()
}

/// Image upload policy.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ImagePolicyConfig {
    /// Maximum image size in bytes.
    #[serde(default = "default_image_max_size")]
    pub max_size_bytes: u64,
    /// Accepted extensions, with or without the leading dot.
    #[serde(default = "default_image_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for ImagePolicyConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: default_image_max_size(),
            allowed_extensions: default_image_extensions(),
        }
    }
}

fn default_image_max_size() -> u64 {
    2 * 1024 * 1024
}

fn default_image_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "gif", "bmp"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Course resource upload policy.
///
/// Unrestricted by default. Set `allowed_extensions = ["pdf"]` and a size cap
/// to harden it.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ResourcePolicyConfig {
    /// Maximum resource size in bytes; unbounded when unset.
    #[serde(default)]
    pub max_size_bytes: Option<u64>,
    /// Accepted extensions; any when unset.
    #[serde(default)]
    pub allowed_extensions: Option<Vec<String>>,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BRIGHTPATH").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_defaults() {
        let storage = StorageConfig::default();

        assert_eq!(storage.namespaces.profile_images, "profile-images");
        assert_eq!(storage.namespaces.course_images, "course-images");
        assert_eq!(storage.namespaces.course_resources, "course-resources");
        assert_eq!(storage.images.max_size_bytes, 2 * 1024 * 1024);
        assert_eq!(
            storage.images.allowed_extensions,
            vec!["jpg", "jpeg", "png", "gif", "bmp"]
        );
        assert_eq!(storage.resources, ResourcePolicyConfig::default());
        assert!(storage.resources.max_size_bytes.is_none());
        assert!(storage.resources.allowed_extensions.is_none());
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("BRIGHTPATH__DATABASE__URL", Some("postgres://db/brightpath")),
                ("BRIGHTPATH__SERVER__PORT", Some("9090")),
                ("BRIGHTPATH__STORAGE__PROVIDER__TYPE", Some("memory")),
                (
                    "BRIGHTPATH__STORAGE__NAMESPACES__COURSE_IMAGES",
                    Some("covers"),
                ),
            ],
            || {
                let config = AppConfig::load().expect("config should load");

                assert_eq!(config.database.url, "postgres://db/brightpath");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.storage.provider, StorageProvider::Memory);
                assert_eq!(config.storage.namespaces.course_images, "covers");
                assert_eq!(config.storage.namespaces.profile_images, "profile-images");
            },
        );
    }

    #[test]
    fn test_load_requires_database_url() {
        temp_env::with_var_unset("BRIGHTPATH__DATABASE__URL", || {
            assert!(AppConfig::load().is_err());
        });
    }

    #[test]
    fn test_provider_names() {
        assert_eq!(StorageProvider::Memory.name(), "memory");
        assert_eq!(StorageProvider::default().name(), "local_fs");
        let azure = StorageProvider::AzureBlob {
            account: "acct".into(),
            access_key: "key".into(),
            endpoint: None,
        };
        assert_eq!(azure.name(), "azure_blob");
    }
}
