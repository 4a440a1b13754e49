//! Blob storage backends using Apache OpenDAL.
//!
//! Each asset namespace is a separate bucket (S3), container (Azure Blob) or
//! directory (local filesystem). Supported providers:
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3, MinIO
//! - Azure Blob Storage
//! - Local filesystem (development only)
//! - In-process memory (tests, demos)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 BlobBackend (put/exists/delete/url)              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                 OpendalBackend: one Operator per namespace      │
//! │ op.write_with("name", data)  │ op.presign_read("name", ttl)      │
//! │ op.stat("name")              │ op.delete("name")                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod backend;
mod error;
mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::BlobBackend;
pub use error::StorageError;
pub use service::OpendalBackend;
