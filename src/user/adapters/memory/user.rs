//! In-memory repository for users.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::user::{
    domain::{User, UserId},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};

/// Thread-safe in-memory user repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl ToString) -> UserRepositoryError {
    UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let mut users = self.state.write().map_err(poisoned)?;
        if users.contains_key(user.id()) {
            return Err(UserRepositoryError::DuplicateUser(user.id().clone()));
        }
        users.insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> UserRepositoryResult<Option<User>> {
        let users = self.state.read().map_err(poisoned)?;
        Ok(users.get(id).cloned())
    }

    async fn update(&self, user: &User) -> UserRepositoryResult<()> {
        let mut users = self.state.write().map_err(poisoned)?;
        let slot = users
            .get_mut(user.id())
            .ok_or_else(|| UserRepositoryError::NotFound(user.id().clone()))?;
        *slot = user.clone();
        Ok(())
    }

    async fn list(&self) -> UserRepositoryResult<Vec<User>> {
        let users = self.state.read().map_err(poisoned)?;
        let mut listed: Vec<User> = users.values().cloned().collect();
        listed.sort_by(|left, right| left.id().cmp(right.id()));
        Ok(listed)
    }
}
