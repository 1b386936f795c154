//! Service layer for user registration and lookup.
//!
//! Every write refreshes the [`DirectoryResolver`] from the repository before
//! returning, so a just-created user resolves immediately.

use crate::error::ErrorKind;
use crate::user::{
    domain::{NotificationSetting, User, UserDomainError, UserId},
    ports::{UserRepository, UserRepositoryError},
    services::{DirectoryError, DirectoryResolver},
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

/// Request payload for registering a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserRequest {
    id: Option<String>,
    email: String,
    name: String,
    notification_settings: Vec<NotificationSetting>,
}

impl CreateUserRequest {
    /// Creates a request with the required fields. An ID is generated unless
    /// one is supplied with [`CreateUserRequest::with_id`].
    #[must_use]
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            name: name.into(),
            notification_settings: Vec::new(),
        }
    }

    /// Uses a caller-chosen identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets notification preferences.
    #[must_use]
    pub fn with_notification_settings(
        mut self,
        settings: impl IntoIterator<Item = NotificationSetting>,
    ) -> Self {
        self.notification_settings = settings.into_iter().collect();
        self
    }
}

/// Service-level errors for user registration.
#[derive(Debug, Error)]
pub enum UserRegistryError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] UserDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
    /// Directory resolution or uniqueness check failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    /// No user exists with the given identifier.
    #[error("user {0} not found")]
    NotFound(UserId),
}

impl UserRegistryError {
    /// Returns the transport-neutral error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) => ErrorKind::Validation,
            Self::Repository(err) => err.kind(),
            Self::Directory(err) => err.kind(),
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

/// Result type for user registry operations.
pub type UserRegistryResult<T> = Result<T, UserRegistryError>;

/// User registration and directory orchestration service.
///
/// Clones share the repository, directory, and write lock.
pub struct UserRegistryService<U>
where
    U: UserRepository,
{
    repository: Arc<U>,
    directory: Arc<DirectoryResolver>,
    write_lock: Arc<Mutex<()>>,
}

impl<U> Clone for UserRegistryService<U>
where
    U: UserRepository,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            directory: Arc::clone(&self.directory),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<U> UserRegistryService<U>
where
    U: UserRepository,
{
    /// Creates a new registry service with an empty directory.
    #[must_use]
    pub fn new(repository: Arc<U>) -> Self {
        Self {
            repository,
            directory: Arc::new(DirectoryResolver::new()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the directory resolver kept current by this service.
    #[must_use]
    pub fn directory(&self) -> Arc<DirectoryResolver> {
        Arc::clone(&self.directory)
    }

    /// Registers a new user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRegistryError::Domain`] for invalid input,
    /// [`UserRegistryError::Directory`] when the name or email is taken, and
    /// [`UserRegistryError::Repository`] when persistence fails.
    pub async fn create_user(&self, request: CreateUserRequest) -> UserRegistryResult<User> {
        let CreateUserRequest {
            id,
            email,
            name,
            notification_settings,
        } = request;
        let user_id = match id {
            Some(raw) => UserId::new(raw)?,
            None => UserId::generate(),
        };
        let user = User::new(user_id, email, name)?
            .with_notification_settings(notification_settings);

        let _guard = self.write_lock.lock().await;
        self.rebuild_directory().await?;
        self.directory.validate_name_unique(user.name(), None)?;
        self.directory.validate_email_unique(user.email(), None)?;
        self.repository.store(&user).await?;
        self.rebuild_directory().await?;
        info!(user_id = %user.id(), name = user.name(), "registered user");
        Ok(user)
    }

    /// Persists changes to an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRegistryError::Directory`] when the new name or email
    /// collides with another user, or repository errors.
    pub async fn update_user(&self, user: User) -> UserRegistryResult<User> {
        let _guard = self.write_lock.lock().await;
        self.rebuild_directory().await?;
        self.directory
            .validate_name_unique(user.name(), Some(user.id()))?;
        self.directory
            .validate_email_unique(user.email(), Some(user.id()))?;
        self.repository.update(&user).await?;
        self.rebuild_directory().await?;
        info!(user_id = %user.id(), "updated user");
        Ok(user)
    }

    /// Finds a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UserRegistryError::NotFound`] when the user does not exist.
    pub async fn find_by_id(&self, id: &UserId) -> UserRegistryResult<User> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserRegistryError::NotFound(id.clone()))
    }

    /// Returns every registered user.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn list_users(&self) -> UserRegistryResult<Vec<User>> {
        Ok(self.repository.list().await?)
    }

    /// Resolves an ID, email, name, or name prefix to a user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRegistryError::Directory`] when resolution fails.
    pub fn resolve_user(&self, identifier: &str) -> UserRegistryResult<User> {
        Ok(self.directory.resolve_user(identifier)?)
    }

    /// Rebuilds the directory from the repository once any in-flight write
    /// has finished.
    ///
    /// # Errors
    ///
    /// Returns repository errors, or directory errors when the stored
    /// population violates name or email uniqueness.
    pub async fn refresh_directory(&self) -> UserRegistryResult<()> {
        let _guard = self.write_lock.lock().await;
        self.rebuild_directory().await
    }

    /// Rebuilds the directory; the caller must hold the write lock.
    async fn rebuild_directory(&self) -> UserRegistryResult<()> {
        let users = self.repository.list().await?;
        self.directory.update_users(&users)?;
        Ok(())
    }
}
