//! Transport-neutral error taxonomy.
//!
//! Every public error type in the crate reports one of these kinds through a
//! `kind()` method. Transport adapters (RPC services, CLIs) map kinds onto
//! their own status codes without matching on individual variants.

use std::fmt;

/// Coarse classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input such as an empty name or mismatched lengths.
    Validation,
    /// A referenced task or user does not exist.
    NotFound,
    /// A partial identifier matched two or more candidates.
    Ambiguous,
    /// A task was started before all of its inflows completed.
    DependencyNotSatisfied,
    /// The owner's inbox is full.
    CapacityExceeded,
    /// A proposed dependency edge would close a cycle.
    CycleDetected,
    /// Two tasks do not share the same location.
    LocationMismatch,
    /// Two users share a name.
    DuplicateName,
    /// Two users share an email address.
    DuplicateEmail,
    /// The store already holds (or once held) the identifier.
    Conflict,
    /// The backing store failed.
    Persistence,
}

impl ErrorKind {
    /// Returns the canonical snake-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Ambiguous => "ambiguous",
            Self::DependencyNotSatisfied => "dependency_not_satisfied",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::CycleDetected => "cycle_detected",
            Self::LocationMismatch => "location_mismatch",
            Self::DuplicateName => "duplicate_name",
            Self::DuplicateEmail => "duplicate_email",
            Self::Conflict => "conflict",
            Self::Persistence => "persistence",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
