//! User service implementation.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::error::UserError;
use super::types::{CreateUserInput, RegisterUser, UpdateUserInput, User, validate_identity};
use crate::attachment::{AssetKind, AssetUpload, AttachmentStore, SignedUrl, extract_filename};
use crate::storage::BlobBackend;

/// Repository trait for user persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait UserRepository: Send + Sync {
    /// Insert a user. Fails with `UsernameTaken` on a duplicate username.
    fn create(
        &self,
        input: CreateUserInput,
    ) -> impl std::future::Future<Output = Result<User, UserError>> + Send;

    /// Find user by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<User>, UserError>> + Send;

    /// Find user by username.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, UserError>> + Send;

    /// Update username and email. `None` if the user does not exist.
    fn update(
        &self,
        id: Uuid,
        input: UpdateUserInput,
    ) -> impl std::future::Future<Output = Result<Option<User>, UserError>> + Send;

    /// Set or clear the profile image URL. `None` if the user does not exist.
    fn set_profile_image_url(
        &self,
        id: Uuid,
        url: Option<String>,
    ) -> impl std::future::Future<Output = Result<Option<User>, UserError>> + Send;
}

/// User service coordinating records and profile images.
pub struct UserService<R: UserRepository, B: BlobBackend> {
    repo: Arc<R>,
    attachments: Arc<AttachmentStore<B>>,
}

impl<R: UserRepository, B: BlobBackend> UserService<R, B> {
    /// Create a new user service.
    #[must_use]
    pub fn new(repo: Arc<R>, attachments: Arc<AttachmentStore<B>>) -> Self {
        Self { repo, attachments }
    }

    /// Register a user, uploading the profile image first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Username or email is invalid
    /// - Username is taken
    /// - Image upload fails (no user is stored)
    pub async fn register(&self, input: RegisterUser) -> Result<User, UserError> {
        validate_identity(&input.username, &input.email)?;
        if self.repo.find_by_username(&input.username).await?.is_some() {
            return Err(UserError::UsernameTaken(input.username));
        }

        let stored = match input.profile_image {
            Some(upload) => Some(
                self.attachments
                    .validate_and_upload(upload, AssetKind::ProfileImage)
                    .await?,
            ),
            None => None,
        };

        let create = CreateUserInput {
            username: input.username,
            email: input.email,
            profile_image_url: stored.as_ref().map(|s| s.url.clone()),
        };

        match self.repo.create(create).await {
            Ok(user) => {
                info!(user_id = %user.id, username = %user.username, "User registered");
                Ok(user)
            }
            Err(e) => {
                // The row was never written; drop the blob uploaded for it.
                if let Some(stored) = stored {
                    self.attachments
                        .delete(&stored.generated_name, AssetKind::ProfileImage)
                        .await;
                }
                Err(e)
            }
        }
    }

    /// Get user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if user not found or database operation fails.
    pub async fn get(&self, id: Uuid) -> Result<User, UserError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Update username and email.
    ///
    /// # Errors
    ///
    /// Returns an error if input is invalid, the user is missing, or the new
    /// username belongs to someone else.
    pub async fn update(&self, id: Uuid, input: UpdateUserInput) -> Result<User, UserError> {
        validate_identity(&input.username, &input.email)?;
        if let Some(existing) = self.repo.find_by_username(&input.username).await?
            && existing.id != id
        {
            return Err(UserError::UsernameTaken(input.username));
        }

        self.repo
            .update(id, input)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Replace the profile image: upload new, persist, then delete old best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is missing or the upload fails. A failed
    /// delete of the previous image does not fail the operation.
    pub async fn replace_profile_image(
        &self,
        id: Uuid,
        upload: AssetUpload,
    ) -> Result<User, UserError> {
        let user = self.get(id).await?;
        let stored = self
            .attachments
            .validate_and_upload(upload, AssetKind::ProfileImage)
            .await?;

        // The old blob goes only once the row no longer references it
        let saved = self
            .repo
            .set_profile_image_url(id, Some(stored.url.clone()))
            .await
            .and_then(|updated| updated.ok_or(UserError::NotFound(id)));
        let updated = match saved {
            Ok(updated) => updated,
            Err(e) => {
                self.attachments
                    .delete(&stored.generated_name, AssetKind::ProfileImage)
                    .await;
                return Err(e);
            }
        };
        self.attachments
            .supersede(
                user.profile_image_url.as_deref(),
                &stored,
                AssetKind::ProfileImage,
            )
            .await;

        info!(user_id = %id, name = %stored.generated_name, "Profile image replaced");
        Ok(updated)
    }

    /// Remove the profile image. The reference is cleared only once storage
    /// no longer holds the object.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is missing, has no image, or storage
    /// refused the delete.
    pub async fn remove_profile_image(&self, id: Uuid) -> Result<User, UserError> {
        let user = self.get(id).await?;
        let url = user
            .profile_image_url
            .as_deref()
            .ok_or(UserError::NoProfileImage(id))?;

        if !self.attachments.release(url, AssetKind::ProfileImage).await {
            warn!(user_id = %id, url, "Profile image kept, storage delete failed");
            return Err(UserError::ImageNotRemoved(id));
        }

        let updated = self
            .repo
            .set_profile_image_url(id, None)
            .await?
            .ok_or(UserError::NotFound(id))?;
        info!(user_id = %id, "Profile image removed");
        Ok(updated)
    }

    /// Time-limited URL for the profile image.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is missing, has no image, or the backend
    /// cannot sign.
    pub async fn profile_image_signed_url(
        &self,
        id: Uuid,
        expiry_minutes: u32,
    ) -> Result<SignedUrl, UserError> {
        let user = self.get(id).await?;
        let name = extract_filename(user.profile_image_url.as_deref())
            .ok_or(UserError::NoProfileImage(id))?;
        Ok(self
            .attachments
            .generate_signed_url(name, AssetKind::ProfileImage, expiry_minutes)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use chrono::Utc;

    use super::*;
    use crate::attachment::{AssetPolicies, AttachmentError};
    use crate::storage::testing::FakeBackend;

    /// Mock repository for testing.
    #[derive(Default)]
    struct MockUserRepository {
        users: Mutex<HashMap<Uuid, User>>,
        fail_create: bool,
        fail_set_image: AtomicBool,
    }

    impl UserRepository for MockUserRepository {
        async fn create(&self, input: CreateUserInput) -> Result<User, UserError> {
            if self.fail_create {
                return Err(UserError::repository("connection reset"));
            }
            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4(),
                username: input.username,
                email: input.email,
                profile_image_url: input.profile_image_url,
                created_at: now,
                updated_at: now,
            };
            self.users.lock().unwrap().insert(user.id, user.clone());
            Ok(user)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError> {
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.username == username)
                .cloned())
        }

        async fn update(
            &self,
            id: Uuid,
            input: UpdateUserInput,
        ) -> Result<Option<User>, UserError> {
            let mut users = self.users.lock().unwrap();
            Ok(users.get_mut(&id).map(|u| {
                u.username = input.username;
                u.email = input.email;
                u.clone()
            }))
        }

        async fn set_profile_image_url(
            &self,
            id: Uuid,
            url: Option<String>,
        ) -> Result<Option<User>, UserError> {
            if self.fail_set_image.load(Ordering::SeqCst) {
                return Err(UserError::repository("connection reset"));
            }
            let mut users = self.users.lock().unwrap();
            Ok(users.get_mut(&id).map(|u| {
                u.profile_image_url = url;
                u.clone()
            }))
        }
    }

    struct Fixture {
        backend: Arc<FakeBackend>,
        repo: Arc<MockUserRepository>,
        service: UserService<MockUserRepository, FakeBackend>,
    }

    fn fixture_with(repo: MockUserRepository) -> Fixture {
        let backend = Arc::new(FakeBackend::new());
        let store = Arc::new(AttachmentStore::new(
            Arc::clone(&backend),
            AssetPolicies::default(),
            reqwest::Client::new(),
        ));
        let repo = Arc::new(repo);
        Fixture {
            backend,
            repo: Arc::clone(&repo),
            service: UserService::new(repo, store),
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MockUserRepository::default())
    }

    fn register(username: &str, image: Option<AssetUpload>) -> RegisterUser {
        RegisterUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            profile_image: image,
        }
    }

    fn object_name(url: Option<&str>) -> String {
        extract_filename(url).expect("has image").to_string()
    }

    #[tokio::test]
    async fn test_register_with_profile_image() {
        let fx = fixture();
        let user = fx
            .service
            .register(register("alice", Some(AssetUpload::new(vec![1u8; 2048], "me.jpeg"))))
            .await
            .unwrap();

        let url = user.profile_image_url.clone().expect("image url");
        assert!(url.contains("/profile-images/profile_"));
        assert!(fx.backend.contains("profile-images", &object_name(Some(url.as_str()))));
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let fx = fixture();
        fx.service.register(register("bob", None)).await.unwrap();

        let err = fx.service.register(register("bob", None)).await.unwrap_err();
        assert!(matches!(err, UserError::UsernameTaken(name) if name == "bob"));
    }

    #[tokio::test]
    async fn test_register_aborts_on_invalid_image() {
        let fx = fixture();
        let err = fx
            .service
            .register(register(
                "carol",
                Some(AssetUpload::new(vec![0u8; 3 * 1024 * 1024], "big.png")),
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UserError::Attachment(AttachmentError::FileTooLarge { .. })
        ));
        assert!(fx.service.repo.find_by_username("carol").await.unwrap().is_none());
        assert_eq!(fx.backend.put_count(), 0);
    }

    #[tokio::test]
    async fn test_register_discards_image_when_insert_fails() {
        let fx = fixture_with(MockUserRepository {
            fail_create: true,
            ..MockUserRepository::default()
        });

        let err = fx
            .service
            .register(register("dave", Some(AssetUpload::new(b"img".to_vec(), "a.png"))))
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Repository(_)));
        assert_eq!(fx.backend.put_count(), 1);
        assert_eq!(fx.backend.object_count(), 0);
    }

    #[tokio::test]
    async fn test_update_rejects_taken_username() {
        let fx = fixture();
        fx.service.register(register("erin", None)).await.unwrap();
        let frank = fx.service.register(register("frank", None)).await.unwrap();

        let err = fx
            .service
            .update(
                frank.id,
                UpdateUserInput {
                    username: "erin".into(),
                    email: "frank@example.com".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::UsernameTaken(_)));

        // Keeping one's own username is fine.
        let updated = fx
            .service
            .update(
                frank.id,
                UpdateUserInput {
                    username: "frank".into(),
                    email: "f@example.org".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email, "f@example.org");
    }

    #[tokio::test]
    async fn test_replace_profile_image_deletes_old() {
        let fx = fixture();
        let user = fx
            .service
            .register(register("gina", Some(AssetUpload::new(b"old".to_vec(), "old.png"))))
            .await
            .unwrap();
        let old = object_name(user.profile_image_url.as_deref());

        let updated = fx
            .service
            .replace_profile_image(user.id, AssetUpload::new(b"new".to_vec(), "new.gif"))
            .await
            .unwrap();

        let new = object_name(updated.profile_image_url.as_deref());
        assert_ne!(old, new);
        assert!(new.ends_with(".gif"));
        assert!(!fx.backend.contains("profile-images", &old));
        assert!(fx.backend.contains("profile-images", &new));
    }

    #[tokio::test]
    async fn test_replace_profile_image_survives_delete_failure() {
        let fx = fixture();
        let user = fx
            .service
            .register(register("hank", Some(AssetUpload::new(b"old".to_vec(), "old.png"))))
            .await
            .unwrap();
        fx.backend.fail_deletes(true);

        let updated = fx
            .service
            .replace_profile_image(user.id, AssetUpload::new(b"new".to_vec(), "new.png"))
            .await
            .unwrap();

        assert_ne!(updated.profile_image_url, user.profile_image_url);
        assert_eq!(fx.backend.object_count(), 2);
    }

    #[tokio::test]
    async fn test_replace_profile_image_keeps_old_when_save_fails() {
        let fx = fixture();
        let user = fx
            .service
            .register(register("iris", Some(AssetUpload::new(b"old".to_vec(), "old.png"))))
            .await
            .unwrap();
        let old = object_name(user.profile_image_url.as_deref());
        fx.repo.fail_set_image.store(true, Ordering::SeqCst);

        let err = fx
            .service
            .replace_profile_image(user.id, AssetUpload::new(b"new".to_vec(), "new.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Repository(_)));
        let stored = fx.service.get(user.id).await.unwrap();
        assert_eq!(stored.profile_image_url, user.profile_image_url);
        assert!(fx.backend.contains("profile-images", &old));
        assert_eq!(fx.backend.object_count(), 1);
    }

    #[tokio::test]
    async fn test_replace_profile_image_unknown_user() {
        let fx = fixture();
        let err = fx
            .service
            .replace_profile_image(Uuid::new_v4(), AssetUpload::new(b"x".to_vec(), "x.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::NotFound(_)));
        assert_eq!(fx.backend.put_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_profile_image() {
        let fx = fixture();
        let user = fx
            .service
            .register(register("ivy", Some(AssetUpload::new(b"img".to_vec(), "a.bmp"))))
            .await
            .unwrap();

        let updated = fx.service.remove_profile_image(user.id).await.unwrap();
        assert!(updated.profile_image_url.is_none());
        assert_eq!(fx.backend.object_count(), 0);

        let err = fx.service.remove_profile_image(user.id).await.unwrap_err();
        assert!(matches!(err, UserError::NoProfileImage(_)));
    }

    #[tokio::test]
    async fn test_remove_profile_image_keeps_reference_on_failure() {
        let fx = fixture();
        let user = fx
            .service
            .register(register("jack", Some(AssetUpload::new(b"img".to_vec(), "a.png"))))
            .await
            .unwrap();
        fx.backend.fail_deletes(true);

        let err = fx.service.remove_profile_image(user.id).await.unwrap_err();
        assert!(matches!(err, UserError::ImageNotRemoved(_)));
        let unchanged = fx.service.get(user.id).await.unwrap();
        assert_eq!(unchanged.profile_image_url, user.profile_image_url);
    }

    #[tokio::test]
    async fn test_profile_image_signed_url() {
        let fx = fixture();
        let user = fx
            .service
            .register(register("kate", Some(AssetUpload::new(b"img".to_vec(), "a.png"))))
            .await
            .unwrap();

        let signed = fx
            .service
            .profile_image_signed_url(user.id, 30)
            .await
            .unwrap();
        assert!(signed.url.contains("se=1800"));

        let plain = fx.service.register(register("liam", None)).await.unwrap();
        let err = fx
            .service
            .profile_image_signed_url(plain.id, 30)
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::NoProfileImage(_)));
    }
}
