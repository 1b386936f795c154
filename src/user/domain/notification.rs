//! Notification preferences attached to users.
//!
//! Delivery of notifications happens outside this crate; these types only
//! describe what a user asked for.

use super::ParseNotificationError;
use serde::{Deserialize, Serialize};

/// Event that triggers a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A task was assigned to the user.
    OnAssign,
    /// One of the user's tasks was started.
    OnStart,
    /// One of the user's tasks was completed.
    OnComplete,
    /// A task reached its due date.
    OnDue,
    /// A task is due within `days_before` days.
    DaysBeforeDue,
}

impl NotificationKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnAssign => "on_assign",
            Self::OnStart => "on_start",
            Self::OnComplete => "on_complete",
            Self::OnDue => "on_due",
            Self::DaysBeforeDue => "n_days_before_due",
        }
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = ParseNotificationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "on_assign" => Ok(Self::OnAssign),
            "on_start" => Ok(Self::OnStart),
            "on_complete" => Ok(Self::OnComplete),
            "on_due" => Ok(Self::OnDue),
            "n_days_before_due" => Ok(Self::DaysBeforeDue),
            _ => Err(ParseNotificationError(value.to_owned())),
        }
    }
}

/// Channel through which a notification is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationMethod {
    /// Email delivery.
    Email,
    /// In-application notice.
    InApp,
    /// Text message.
    Sms,
    /// Push notification.
    Push,
}

impl NotificationMethod {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::InApp => "in_app",
            Self::Sms => "sms",
            Self::Push => "push",
        }
    }
}

impl TryFrom<&str> for NotificationMethod {
    type Error = ParseNotificationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "in_app" => Ok(Self::InApp),
            "sms" => Ok(Self::Sms),
            "push" => Ok(Self::Push),
            _ => Err(ParseNotificationError(value.to_owned())),
        }
    }
}

/// A single notification preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSetting {
    /// Triggering event.
    pub kind: NotificationKind,
    /// Whether the preference is active.
    pub enabled: bool,
    /// Delivery channels.
    pub methods: Vec<NotificationMethod>,
    /// Lead time for [`NotificationKind::DaysBeforeDue`]; ignored otherwise.
    pub days_before: u32,
}

impl NotificationSetting {
    /// Creates an enabled setting with no delivery methods.
    #[must_use]
    pub const fn new(kind: NotificationKind) -> Self {
        Self {
            kind,
            enabled: true,
            methods: Vec::new(),
            days_before: 0,
        }
    }

    /// Sets the delivery methods.
    #[must_use]
    pub fn with_methods(mut self, methods: impl IntoIterator<Item = NotificationMethod>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Sets the lead time in days.
    #[must_use]
    pub const fn with_days_before(mut self, days_before: u32) -> Self {
        self.days_before = days_before;
        self
    }

    /// Disables the setting.
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
