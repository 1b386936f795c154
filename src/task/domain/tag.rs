//! Typed tag values attached to tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point on the globe with an optional human-readable address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographicLocation {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Free-form address; may be empty.
    pub address: String,
}

/// Value stored under a task tag key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TagValue {
    /// Plain text.
    Text(String),
    /// Geographic location.
    Location(GeographicLocation),
    /// Point in time.
    Time(DateTime<Utc>),
}

impl TagValue {
    /// Returns the canonical name of the variant.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Location(_) => "location",
            Self::Time(_) => "time",
        }
    }

    /// Returns the text payload, if this is a text tag.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Location(_) | Self::Time(_) => None,
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<GeographicLocation> for TagValue {
    fn from(value: GeographicLocation) -> Self {
        Self::Location(value)
    }
}

impl From<DateTime<Utc>> for TagValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Time(value)
    }
}
