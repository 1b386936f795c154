//! Flat-map resolver from user identifiers, names, and emails to users.
//!
//! User populations are small, so lookups use hash maps rather than a trie.
//! Ambiguity is reported through the shared [`ResolutionError`] contract.

use crate::error::ErrorKind;
use crate::resolution::{self, ResolutionError};
use crate::user::domain::{User, UserId};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Errors raised by the directory resolver.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// The identifier could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Two distinct users share a name (case-insensitive).
    #[error("duplicate user name '{0}' (names must be unique)")]
    DuplicateName(String),

    /// Two distinct users share an email address (case-insensitive).
    #[error("duplicate user email '{0}' (emails must be unique)")]
    DuplicateEmail(String),

    /// No user has the given identifier.
    #[error("user '{0}' does not exist")]
    UnknownUser(UserId),
}

impl DirectoryError {
    /// Returns the transport-neutral error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Resolution(err) => err.kind(),
            Self::DuplicateName(_) => ErrorKind::DuplicateName,
            Self::DuplicateEmail(_) => ErrorKind::DuplicateEmail,
            Self::UnknownUser(_) => ErrorKind::NotFound,
        }
    }
}

/// Which secondary keys a resolution may match besides the exact ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    /// Match exact names and unique name prefixes.
    pub names: bool,
    /// Match exact email addresses.
    pub emails: bool,
}

impl Lookup {
    /// Exact identifier only.
    pub const ID_ONLY: Self = Self {
        names: false,
        emails: false,
    };
    /// Identifier, then name.
    pub const BY_NAME: Self = Self {
        names: true,
        emails: false,
    };
    /// Identifier, then email.
    pub const BY_EMAIL: Self = Self {
        names: false,
        emails: true,
    };
    /// Identifier, email, name, then name prefix.
    pub const ALL: Self = Self {
        names: true,
        emails: true,
    };
}

#[derive(Debug, Default)]
struct DirectoryIndex {
    users: Vec<User>,
    by_id: HashMap<UserId, usize>,
    by_name: HashMap<String, usize>,
    by_email: HashMap<String, usize>,
}

impl DirectoryIndex {
    fn build(users: Vec<User>) -> Result<Self, DirectoryError> {
        let mut index = Self::default();
        for (position, user) in users.iter().enumerate() {
            let name_key = user.name().to_lowercase();
            if index.by_name.insert(name_key, position).is_some() {
                return Err(DirectoryError::DuplicateName(user.name().to_owned()));
            }
            let email_key = user.email().to_lowercase();
            if index.by_email.insert(email_key.clone(), position).is_some() {
                return Err(DirectoryError::DuplicateEmail(email_key));
            }
            index.by_id.insert(user.id().clone(), position);
        }
        index.users = users;
        Ok(index)
    }

    fn at(&self, position: Option<&usize>) -> Option<&User> {
        position.and_then(|&found| self.users.get(found))
    }
}

/// Resolver over the current user population.
///
/// Rebuilt wholesale by [`DirectoryResolver::update_users`]; readers never
/// observe a half-built index.
#[derive(Debug, Default)]
pub struct DirectoryResolver {
    index: RwLock<DirectoryIndex>,
}

impl DirectoryResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the indexed population.
    ///
    /// Absent entries are skipped and repeated identifiers are indexed once.
    /// The incoming set is validated before anything is committed, so a
    /// rejected update leaves the previous index in place.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::DuplicateName`] or
    /// [`DirectoryError::DuplicateEmail`] when two distinct users collide
    /// case-insensitively.
    pub fn update_users<'a, I, T>(&self, users: I) -> Result<(), DirectoryError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<&'a User>>,
    {
        let mut seen = HashSet::new();
        let incoming: Vec<User> = users
            .into_iter()
            .filter_map(Into::<Option<&'a User>>::into)
            .filter(|user| seen.insert(user.id().clone()))
            .cloned()
            .collect();
        let rebuilt = DirectoryIndex::build(incoming)?;
        debug!(users = rebuilt.users.len(), "rebuilt user directory");
        *self.index.write() = rebuilt;
        Ok(())
    }

    /// Resolves an identifier against IDs, emails, names, and name prefixes.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Resolution`] when the identifier is empty,
    /// unknown, or an ambiguous name prefix.
    pub fn resolve_user(&self, identifier: &str) -> Result<User, DirectoryError> {
        self.resolve_user_with(identifier, Lookup::ALL)
    }

    /// Resolves an identifier using only the enabled lookups.
    ///
    /// Order: exact ID, exact email, exact name, then unique name prefix.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Resolution`] when the identifier is empty,
    /// unknown, or an ambiguous name prefix.
    pub fn resolve_user_with(&self, identifier: &str, lookup: Lookup) -> Result<User, DirectoryError> {
        if identifier.trim().is_empty() {
            return Err(ResolutionError::EmptyIdentifier.into());
        }
        let index = self.index.read();

        if let Some(user) = index.at(index.by_id.get(identifier)) {
            return Ok(user.clone());
        }

        let folded = identifier.to_lowercase();
        if lookup.emails
            && let Some(user) = index.at(index.by_email.get(&folded))
        {
            return Ok(user.clone());
        }

        if !lookup.names {
            return Err(ResolutionError::NotFound(identifier.to_owned()).into());
        }

        if let Some(user) = index.at(index.by_name.get(&folded)) {
            return Ok(user.clone());
        }

        let matches: Vec<&User> = index
            .users
            .iter()
            .filter(|user| user.name().to_lowercase().starts_with(&folded))
            .collect();
        resolution::decide(identifier, matches, |user| user.name())
            .map(Clone::clone)
            .map_err(DirectoryError::from)
    }

    /// Resolves an identifier (ID only) to a user ID.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Resolution`] when no user has the ID.
    pub fn resolve_user_id(&self, identifier: &str) -> Result<UserId, DirectoryError> {
        self.resolve_user_with(identifier, Lookup::ID_ONLY)
            .map(|user| user.id().clone())
    }

    /// Suggests names, emails, and IDs starting with `identifier`.
    #[must_use]
    pub fn suggest_users(&self, identifier: &str, limit: usize) -> Vec<String> {
        let index = self.index.read();
        let keys = index
            .users
            .iter()
            .flat_map(|user| [user.name(), user.email(), user.id().as_str()]);
        resolution::suggest_by_prefix(identifier, keys, limit)
    }

    /// Checks that a user with the given ID is indexed.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::UnknownUser`] when it is not.
    pub fn validate_user_exists(&self, id: &UserId) -> Result<(), DirectoryError> {
        if self.index.read().by_id.contains_key(id) {
            Ok(())
        } else {
            Err(DirectoryError::UnknownUser(id.clone()))
        }
    }

    /// Checks that no other user already uses `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::DuplicateName`] when a user other than
    /// `exclude` holds the name.
    pub fn validate_name_unique(
        &self,
        name: &str,
        exclude: Option<&UserId>,
    ) -> Result<(), DirectoryError> {
        let index = self.index.read();
        match index.at(index.by_name.get(&name.trim().to_lowercase())) {
            Some(holder) if Some(holder.id()) != exclude => {
                Err(DirectoryError::DuplicateName(name.trim().to_owned()))
            }
            _ => Ok(()),
        }
    }

    /// Checks that no other user already uses `email`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::DuplicateEmail`] when a user other than
    /// `exclude` holds the address.
    pub fn validate_email_unique(
        &self,
        email: &str,
        exclude: Option<&UserId>,
    ) -> Result<(), DirectoryError> {
        let folded = email.trim().to_lowercase();
        let index = self.index.read();
        match index.at(index.by_email.get(&folded)) {
            Some(holder) if Some(holder.id()) != exclude => Err(DirectoryError::DuplicateEmail(folded)),
            _ => Ok(()),
        }
    }

    /// Returns a snapshot of every indexed user.
    #[must_use]
    pub fn all_users(&self) -> Vec<User> {
        self.index.read().users.clone()
    }
}
