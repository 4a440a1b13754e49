//! Course service implementation.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::error::CourseError;
use super::types::{Course, CourseDetails, CreateCourseInput, NewCourse, ResourceDownload};
use crate::attachment::{
    AssetKind, AssetUpload, AttachmentStore, SignedUrl, StoredAsset, extract_filename,
};
use crate::storage::BlobBackend;

/// Repository trait for course persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait CourseRepository: Send + Sync {
    /// List all courses.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Course>, CourseError>> + Send;

    /// Find course by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Course>, CourseError>> + Send;

    /// Insert a course.
    fn create(
        &self,
        input: CreateCourseInput,
    ) -> impl std::future::Future<Output = Result<Course, CourseError>> + Send;

    /// Update course fields. `None` if the course does not exist.
    fn update(
        &self,
        id: Uuid,
        details: CourseDetails,
    ) -> impl std::future::Future<Output = Result<Option<Course>, CourseError>> + Send;

    /// Set or clear the image URL. `None` if the course does not exist.
    fn set_image_url(
        &self,
        id: Uuid,
        url: Option<String>,
    ) -> impl std::future::Future<Output = Result<Option<Course>, CourseError>> + Send;

    /// Set or clear the resource URL. `None` if the course does not exist.
    fn set_resource_url(
        &self,
        id: Uuid,
        url: Option<String>,
    ) -> impl std::future::Future<Output = Result<Option<Course>, CourseError>> + Send;

    /// Delete a course and its enrollments. Returns `false` if it did not exist.
    fn delete(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, CourseError>> + Send;
}

/// Which of a course's two attachment slots an operation targets.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Image,
    Resource,
}

impl Slot {
    const fn kind(self) -> AssetKind {
        match self {
            Self::Image => AssetKind::CourseImage,
            Self::Resource => AssetKind::CourseResource,
        }
    }

    fn url(self, course: &Course) -> Option<&str> {
        match self {
            Self::Image => course.image_url.as_deref(),
            Self::Resource => course.resource_url.as_deref(),
        }
    }

    const fn missing(self, id: Uuid) -> CourseError {
        match self {
            Self::Image => CourseError::NoImage(id),
            Self::Resource => CourseError::NoResource(id),
        }
    }

    const fn not_removed(self, id: Uuid) -> CourseError {
        match self {
            Self::Image => CourseError::ImageNotRemoved(id),
            Self::Resource => CourseError::ResourceNotRemoved(id),
        }
    }
}

/// Course service coordinating records, images and resources.
pub struct CourseService<R: CourseRepository, B: BlobBackend> {
    repo: Arc<R>,
    attachments: Arc<AttachmentStore<B>>,
}

impl<R: CourseRepository, B: BlobBackend> CourseService<R, B> {
    /// Create a new course service.
    #[must_use]
    pub fn new(repo: Arc<R>, attachments: Arc<AttachmentStore<B>>) -> Self {
        Self { repo, attachments }
    }

    /// List all courses.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails.
    pub async fn list(&self) -> Result<Vec<Course>, CourseError> {
        self.repo.list().await
    }

    /// Get course by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if course not found or database operation fails.
    pub async fn get(&self, id: Uuid) -> Result<Course, CourseError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(CourseError::NotFound(id))
    }

    /// Create a course. Attachments are uploaded before the row is written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Course fields are invalid
    /// - Either upload fails (no course is stored)
    /// - Database operation fails
    pub async fn create(&self, input: NewCourse) -> Result<Course, CourseError> {
        input.details.validate()?;

        let image = self.upload_optional(input.image, AssetKind::CourseImage).await?;
        let resource = match self
            .upload_optional(input.resource, AssetKind::CourseResource)
            .await
        {
            Ok(resource) => resource,
            Err(e) => {
                self.discard(image.as_ref(), AssetKind::CourseImage).await;
                return Err(e);
            }
        };

        let create = CreateCourseInput {
            details: input.details,
            image_url: image.as_ref().map(|s| s.url.clone()),
            resource_url: resource.as_ref().map(|s| s.url.clone()),
        };

        match self.repo.create(create).await {
            Ok(course) => {
                info!(course_id = %course.id, name = %course.name, "Course created");
                Ok(course)
            }
            Err(e) => {
                self.discard(image.as_ref(), AssetKind::CourseImage).await;
                self.discard(resource.as_ref(), AssetKind::CourseResource)
                    .await;
                Err(e)
            }
        }
    }

    /// Update course fields. Attachment URLs are not editable here.
    ///
    /// # Errors
    ///
    /// Returns an error if fields are invalid or the course is missing.
    pub async fn update(&self, id: Uuid, details: CourseDetails) -> Result<Course, CourseError> {
        details.validate()?;
        self.repo
            .update(id, details)
            .await?
            .ok_or(CourseError::NotFound(id))
    }

    /// Delete a course, then best-effort delete its image and resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the course is missing or the row cannot be deleted.
    pub async fn delete(&self, id: Uuid) -> Result<(), CourseError> {
        let course = self.get(id).await?;
        if !self.repo.delete(id).await? {
            return Err(CourseError::NotFound(id));
        }
        info!(course_id = %id, "Course deleted");

        for slot in [Slot::Image, Slot::Resource] {
            if let Some(url) = slot.url(&course)
                && !self.attachments.delete_by_url(Some(url), slot.kind()).await
            {
                warn!(course_id = %id, url, "Attachment of deleted course left in storage");
            }
        }
        Ok(())
    }

    /// Replace the cover image.
    ///
    /// The new upload is saved on the course before the old one is deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the course is missing, the upload fails, or the
    /// course could not be saved. On a failed save the new upload is
    /// discarded and the old asset is kept.
    pub async fn replace_image(
        &self,
        id: Uuid,
        upload: AssetUpload,
    ) -> Result<Course, CourseError> {
        self.replace(id, upload, Slot::Image).await
    }

    /// Remove the cover image.
    ///
    /// # Errors
    ///
    /// Returns an error if the course is missing, has no image, or storage
    /// refused the delete.
    pub async fn remove_image(&self, id: Uuid) -> Result<Course, CourseError> {
        self.remove(id, Slot::Image).await
    }

    /// Replace the course resource.
    ///
    /// The new upload is saved on the course before the old one is deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the course is missing, the upload fails, or the
    /// course could not be saved. On a failed save the new upload is
    /// discarded and the old asset is kept.
    pub async fn replace_resource(
        &self,
        id: Uuid,
        upload: AssetUpload,
    ) -> Result<Course, CourseError> {
        self.replace(id, upload, Slot::Resource).await
    }

    /// Remove the course resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the course is missing, has no resource, or storage
    /// refused the delete.
    pub async fn remove_resource(&self, id: Uuid) -> Result<Course, CourseError> {
        self.remove(id, Slot::Resource).await
    }

    /// Permanent URL of the course resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the course is missing or has no resource.
    pub async fn resource_url(&self, id: Uuid) -> Result<String, CourseError> {
        self.get(id)
            .await?
            .resource_url
            .ok_or(CourseError::NoResource(id))
    }

    /// Fetch the course resource for download as `<course name>.pdf`.
    ///
    /// # Errors
    ///
    /// Returns an error if the course is missing, has no resource, or the
    /// download fails.
    pub async fn download_resource(&self, id: Uuid) -> Result<ResourceDownload, CourseError> {
        let course = self.get(id).await?;
        let url = course
            .resource_url
            .as_deref()
            .ok_or(CourseError::NoResource(id))?;
        let content = self.attachments.download_by_url(url).await?;

        Ok(ResourceDownload {
            filename: format!("{}.pdf", course.name),
            content,
        })
    }

    /// Time-limited URL for the cover image.
    ///
    /// # Errors
    ///
    /// Returns an error if the course is missing, has no image, or the backend
    /// cannot sign.
    pub async fn image_signed_url(
        &self,
        id: Uuid,
        expiry_minutes: u32,
    ) -> Result<SignedUrl, CourseError> {
        self.signed_url(id, Slot::Image, expiry_minutes).await
    }

    /// Time-limited URL for the course resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the course is missing, has no resource, or the
    /// backend cannot sign.
    pub async fn resource_signed_url(
        &self,
        id: Uuid,
        expiry_minutes: u32,
    ) -> Result<SignedUrl, CourseError> {
        self.signed_url(id, Slot::Resource, expiry_minutes).await
    }

    async fn upload_optional(
        &self,
        upload: Option<AssetUpload>,
        kind: AssetKind,
    ) -> Result<Option<StoredAsset>, CourseError> {
        match upload {
            Some(upload) => Ok(Some(self.attachments.validate_and_upload(upload, kind).await?)),
            None => Ok(None),
        }
    }

    /// Drop a blob uploaded for a course that was never stored.
    async fn discard(&self, stored: Option<&StoredAsset>, kind: AssetKind) {
        if let Some(stored) = stored {
            self.attachments.delete(&stored.generated_name, kind).await;
        }
    }

    async fn replace(
        &self,
        id: Uuid,
        upload: AssetUpload,
        slot: Slot,
    ) -> Result<Course, CourseError> {
        let course = self.get(id).await?;
        let stored = self
            .attachments
            .validate_and_upload(upload, slot.kind())
            .await?;

        // The old blob goes only once the row no longer references it
        let updated = match self.persist(id, slot, Some(stored.url.clone())).await {
            Ok(updated) => updated,
            Err(e) => {
                self.discard(Some(&stored), slot.kind()).await;
                return Err(e);
            }
        };
        self.attachments
            .supersede(slot.url(&course), &stored, slot.kind())
            .await;

        info!(
            course_id = %id,
            kind = %slot.kind(),
            name = %stored.generated_name,
            "Course attachment replaced"
        );
        Ok(updated)
    }

    async fn remove(&self, id: Uuid, slot: Slot) -> Result<Course, CourseError> {
        let course = self.get(id).await?;
        let url = slot.url(&course).ok_or_else(|| slot.missing(id))?;

        if !self.attachments.release(url, slot.kind()).await {
            warn!(course_id = %id, url, "Course attachment kept, storage delete failed");
            return Err(slot.not_removed(id));
        }

        let updated = self.persist(id, slot, None).await?;
        info!(course_id = %id, kind = %slot.kind(), "Course attachment removed");
        Ok(updated)
    }

    async fn persist(
        &self,
        id: Uuid,
        slot: Slot,
        url: Option<String>,
    ) -> Result<Course, CourseError> {
        let updated = match slot {
            Slot::Image => self.repo.set_image_url(id, url).await?,
            Slot::Resource => self.repo.set_resource_url(id, url).await?,
        };
        updated.ok_or(CourseError::NotFound(id))
    }

    async fn signed_url(
        &self,
        id: Uuid,
        slot: Slot,
        expiry_minutes: u32,
    ) -> Result<SignedUrl, CourseError> {
        let course = self.get(id).await?;
        let name = extract_filename(slot.url(&course)).ok_or_else(|| slot.missing(id))?;
        Ok(self
            .attachments
            .generate_signed_url(name, slot.kind(), expiry_minutes)
            .await?)
    }
}
