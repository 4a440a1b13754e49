//! File attachment lifecycle.
//!
//! This module owns how uploaded assets are:
//! - Validated against a per-kind policy (size, filename, extension)
//! - Named (`<prefix>_<uuid>.<ext>`) and stored in the kind's namespace
//! - Deleted best-effort when superseded
//! - Shared through signed URLs or fetched back by URL
//!
//! Database records only ever hold the returned URL.

mod error;
mod policy;
mod store;
mod types;

pub use error::AttachmentError;
pub use policy::{
    AssetPolicies, AssetPolicy, ContentTypeRule, content_type_for_extension, extension_of,
    extract_filename,
};
pub use store::AttachmentStore;
pub use types::{AssetKind, AssetUpload, SignedUrl, StoredAsset};
