//! User aggregate.

use super::{NotificationSetting, UserDomainError, UserId};
use serde::{Deserialize, Serialize};

/// A user owning a task population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: String,
    name: String,
    notification_settings: Vec<NotificationSetting>,
}

impl User {
    /// Creates a validated user.
    ///
    /// Name and email are trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::EmptyName`], [`UserDomainError::EmptyEmail`]
    /// or [`UserDomainError::InvalidEmail`] when validation fails.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, UserDomainError> {
        let raw_name: String = name.into();
        let name_value = validate_name(&raw_name)?;
        let email_value = validate_email(email.into())?;
        Ok(Self {
            id,
            email: email_value,
            name: name_value,
            notification_settings: Vec::new(),
        })
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

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the notification preferences.
    #[must_use]
    pub fn notification_settings(&self) -> &[NotificationSetting] {
        &self.notification_settings
    }

    /// Renames the user.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::EmptyName`] when the name is blank.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), UserDomainError> {
        let raw_name: String = name.into();
        self.name = validate_name(&raw_name)?;
        Ok(())
    }

    /// Changes the email address.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::EmptyEmail`] or
    /// [`UserDomainError::InvalidEmail`] when validation fails.
    pub fn change_email(&mut self, email: impl Into<String>) -> Result<(), UserDomainError> {
        self.email = validate_email(email.into())?;
        Ok(())
    }

    /// Replaces notification preferences.
    pub fn set_notification_settings(&mut self, settings: Vec<NotificationSetting>) {
        self.notification_settings = settings;
    }
}

fn validate_name(raw: &str) -> Result<String, UserDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UserDomainError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

fn validate_email(raw: String) -> Result<String, UserDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UserDomainError::EmptyEmail);
    }
    let is_valid = trimmed
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !is_valid || trimmed.chars().any(char::is_whitespace) {
        return Err(UserDomainError::InvalidEmail(raw));
    }
    Ok(trimmed.to_owned())
}
