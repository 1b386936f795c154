//! Domain model for users and their notification preferences.

mod error;
mod ids;
mod notification;
mod user;

pub use error::{ParseNotificationError, UserDomainError};
pub use ids::UserId;
pub use notification::{NotificationKind, NotificationMethod, NotificationSetting};
pub use user::User;
