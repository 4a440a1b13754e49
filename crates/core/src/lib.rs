//! Core business logic for BrightPath.
//!
//! This crate contains business logic with no database or server dependencies.
//! Persistence is reached through repository traits implemented by the db
//! crate; blobs through the `BlobBackend` trait.
//!
//! # Modules
//!
//! - `storage` - Blob backends (OpenDAL: S3, Azure Blob, local filesystem, memory)
//! - `attachment` - Upload validation, naming, replacement and deletion of assets
//! - `user` - Users and profile images
//! - `course` - Courses, cover images and PDF resources
//! - `enrollment` - Enrollment of users in courses

pub mod attachment;
pub mod course;
pub mod enrollment;
pub mod storage;
pub mod user;
