//! Runtime configuration for the task lifecycle service.

use serde::Deserialize;
use thiserror::Error;

/// Inbox capacity applied when none (or zero) is configured.
pub const DEFAULT_MAX_INBOX_SIZE: usize = 5;

/// Number of suggestions offered alongside failed resolutions by default.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Lifecycle service configuration.
///
/// # Examples
///
/// ```
/// use tasker::config::LifecycleConfig;
///
/// let config = LifecycleConfig::from_toml_str("max_inbox_size = 3").expect("valid TOML");
/// assert_eq!(config.max_inbox_size, 3);
/// assert_eq!(config.suggestion_limit, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Maximum number of Inbox tasks per user.
    pub max_inbox_size: usize,
    /// Maximum number of suggestions returned by suggestion helpers.
    pub suggestion_limit: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_inbox_size: DEFAULT_MAX_INBOX_SIZE,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

impl LifecycleConfig {
    /// Creates a configuration with the given inbox capacity.
    ///
    /// A capacity of zero falls back to [`DEFAULT_MAX_INBOX_SIZE`].
    #[must_use]
    pub fn with_max_inbox_size(max_inbox_size: usize) -> Self {
        Self {
            max_inbox_size,
            ..Self::default()
        }
        .normalized()
    }

    /// Parses a configuration from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is not valid TOML or a
    /// value has the wrong type.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let parsed: Self = toml::from_str(source)?;
        Ok(parsed.normalized())
    }

    const fn normalized(mut self) -> Self {
        if self.max_inbox_size == 0 {
            self.max_inbox_size = DEFAULT_MAX_INBOX_SIZE;
        }
        self
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("invalid lifecycle configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
