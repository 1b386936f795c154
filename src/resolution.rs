//! Shared contract for turning partial identifiers into canonical ones.
//!
//! Both the task identifier resolver and the user directory report failures
//! through [`ResolutionError`], so callers can re-prompt with the candidate
//! list regardless of which population was searched.

use crate::error::ErrorKind;
use thiserror::Error;

/// Failure to resolve a partial identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// The identifier was empty after trimming.
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    /// Nothing matched the identifier.
    #[error("no match found for '{0}'")]
    NotFound(String),

    /// More than one candidate matched the identifier.
    #[error("ambiguous identifier '{input}', matches: {}", .candidates.join(", "))]
    Ambiguous {
        /// The identifier as supplied by the caller.
        input: String,
        /// Matching candidates in ascending order.
        candidates: Vec<String>,
    },
}

impl ResolutionError {
    /// Returns the transport-neutral error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyIdentifier => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Ambiguous { .. } => ErrorKind::Ambiguous,
        }
    }

    /// Returns the sorted candidate list for ambiguous matches.
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        match self {
            Self::Ambiguous { candidates, .. } => candidates,
            Self::EmptyIdentifier | Self::NotFound(_) => &[],
        }
    }
}

/// Applies the 0 / 1 / many decision to a candidate list.
///
/// `label` names each candidate in the ambiguity report.
///
/// # Errors
///
/// Returns [`ResolutionError::NotFound`] for no candidates and
/// [`ResolutionError::Ambiguous`] (with sorted, de-duplicated labels) for
/// more than one.
pub fn decide<T>(
    input: &str,
    mut candidates: Vec<T>,
    label: impl Fn(&T) -> &str,
) -> Result<T, ResolutionError> {
    if candidates.len() > 1 {
        let mut labels: Vec<String> = candidates
            .iter()
            .map(|candidate| label(candidate).to_owned())
            .collect();
        labels.sort_unstable();
        labels.dedup();
        return Err(ResolutionError::Ambiguous {
            input: input.to_owned(),
            candidates: labels,
        });
    }
    candidates
        .pop()
        .ok_or_else(|| ResolutionError::NotFound(input.to_owned()))
}

/// Case-insensitive prefix scan used for best-effort suggestions.
///
/// Returns matching values sorted ascending, de-duplicated, and truncated to
/// `limit`.
pub fn suggest_by_prefix<'a, I>(partial: &str, values: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = partial.to_lowercase();
    let mut suggestions: Vec<String> = values
        .into_iter()
        .filter(|value| value.to_lowercase().starts_with(&needle))
        .map(str::to_owned)
        .collect();
    suggestions.sort_unstable();
    suggestions.dedup();
    suggestions.truncate(limit);
    suggestions
}
