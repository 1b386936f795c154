//! Short-ID addressing for tasks.
//!
//! [`TaskIdResolver`] keeps one prefix trie per user plus a trie over the
//! whole population, so that resolving without a user pools matches across
//! every owner. The index is rebuilt wholesale by
//! [`TaskIdResolver::update_tasks`] and swapped in under a write lock.

mod trie;

use crate::resolution::{self, ResolutionError};
use crate::task::domain::{Task, TaskId};
use crate::user::domain::UserId;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use trie::TrieNode;

#[derive(Debug, Default)]
struct ResolverIndex {
    all: TrieNode,
    by_user: HashMap<UserId, TrieNode>,
    owners: HashMap<TaskId, UserId>,
}

impl ResolverIndex {
    fn build<'a>(tasks: impl Iterator<Item = &'a Task>) -> Self {
        let mut index = Self::default();
        for task in tasks {
            if index
                .owners
                .insert(task.id().clone(), task.user_id().clone())
                .is_some()
            {
                continue;
            }
            index.all.insert(task.id());
            index
                .by_user
                .entry(task.user_id().clone())
                .or_default()
                .insert(task.id());
        }
        index
    }

    fn owned_by(&self, id: &TaskId, user_id: &UserId) -> bool {
        self.owners.get(id) == Some(user_id)
    }
}

fn resolve_in(trie: Option<&TrieNode>, partial: &str) -> Result<TaskId, ResolutionError> {
    let candidates: Vec<&TaskId> = trie
        .and_then(|node| node.find(partial))
        .map(TrieNode::candidates)
        .unwrap_or_default()
        .iter()
        .collect();
    resolution::decide(partial, candidates, |id| id.as_str()).cloned()
}

fn prefixes_of<'a>(
    trie: &TrieNode,
    ids: impl Iterator<Item = &'a TaskId>,
) -> BTreeMap<TaskId, String> {
    ids.filter_map(|id| {
        trie.minimum_unique_prefix(id)
            .map(|prefix| (id.clone(), prefix))
    })
    .collect()
}

/// Resolver from partial task identifiers to stored ones.
#[derive(Debug, Default)]
pub struct TaskIdResolver {
    index: RwLock<ResolverIndex>,
}

impl TaskIdResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the indexed population.
    ///
    /// Absent entries are skipped; a repeated identifier is indexed once,
    /// under its first owner.
    pub fn update_tasks<'a, I, T>(&self, tasks: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<&'a Task>>,
    {
        let rebuilt = ResolverIndex::build(
            tasks
                .into_iter()
                .filter_map(Into::<Option<&'a Task>>::into),
        );
        debug!(
            tasks = rebuilt.owners.len(),
            users = rebuilt.by_user.len(),
            "rebuilt task identifier index"
        );
        *self.index.write() = rebuilt;
    }

    /// Resolves `partial` across every user's tasks.
    ///
    /// A full stored identifier is returned as-is; otherwise matching is a
    /// case-insensitive prefix walk.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::EmptyIdentifier`],
    /// [`ResolutionError::NotFound`], or [`ResolutionError::Ambiguous`] with
    /// the sorted matching identifiers.
    pub fn resolve_task_id(&self, partial: &str) -> Result<TaskId, ResolutionError> {
        let trimmed = non_empty(partial)?;
        let index = self.index.read();
        if let Some((id, _)) = index.owners.get_key_value(trimmed) {
            return Ok(id.clone());
        }
        resolve_in(Some(&index.all), trimmed)
    }

    /// Resolves `partial` among the tasks owned by `user_id`.
    ///
    /// A full identifier owned by someone else is not returned directly;
    /// it goes through the user's own trie like any other input.
    ///
    /// # Errors
    ///
    /// As for [`TaskIdResolver::resolve_task_id`].
    pub fn resolve_task_id_for_user(
        &self,
        partial: &str,
        user_id: &UserId,
    ) -> Result<TaskId, ResolutionError> {
        let trimmed = non_empty(partial)?;
        let index = self.index.read();
        if let Some((id, owner)) = index.owners.get_key_value(trimmed)
            && owner == user_id
        {
            return Ok(id.clone());
        }
        resolve_in(index.by_user.get(user_id), trimmed)
    }

    /// Returns the shortest prefix that resolves to `id` across all users.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::NotFound`] when `id` is not indexed.
    pub fn get_minimum_unique_prefix(&self, id: &TaskId) -> Result<String, ResolutionError> {
        self.index
            .read()
            .all
            .minimum_unique_prefix(id)
            .ok_or_else(|| ResolutionError::NotFound(id.to_string()))
    }

    /// Returns the shortest prefix that resolves to `id` within `user_id`'s
    /// tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::NotFound`] when `id` is not indexed for
    /// that user.
    pub fn get_minimum_unique_prefix_for_user(
        &self,
        id: &TaskId,
        user_id: &UserId,
    ) -> Result<String, ResolutionError> {
        let index = self.index.read();
        index
            .by_user
            .get(user_id)
            .filter(|_| index.owned_by(id, user_id))
            .and_then(|trie| trie.minimum_unique_prefix(id))
            .ok_or_else(|| ResolutionError::NotFound(id.to_string()))
    }

    /// Maps every indexed identifier to its minimum unique prefix.
    #[must_use]
    pub fn list_tasks_with_prefixes(&self) -> BTreeMap<TaskId, String> {
        let index = self.index.read();
        prefixes_of(&index.all, index.owners.keys())
    }

    /// Maps each of `user_id`'s identifiers to its per-user minimum unique
    /// prefix.
    #[must_use]
    pub fn list_tasks_with_prefixes_for_user(&self, user_id: &UserId) -> BTreeMap<TaskId, String> {
        let index = self.index.read();
        let Some(trie) = index.by_user.get(user_id) else {
            return BTreeMap::new();
        };
        let owned = index
            .owners
            .iter()
            .filter(|(_, owner)| *owner == user_id)
            .map(|(id, _)| id);
        prefixes_of(trie, owned)
    }

    /// Best-effort suggestions: identifiers starting with `partial`,
    /// case-insensitively, sorted and truncated to `max_suggestions`.
    #[must_use]
    pub fn suggest_similar_ids(
        &self,
        partial: &str,
        user_id: Option<&UserId>,
        max_suggestions: usize,
    ) -> Vec<String> {
        let index = self.index.read();
        let ids = index
            .owners
            .iter()
            .filter(|(_, owner)| user_id.is_none_or(|wanted| wanted == *owner))
            .map(|(id, _)| id.as_str());
        resolution::suggest_by_prefix(partial.trim(), ids, max_suggestions)
    }

    /// Returns whether `id` is indexed.
    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.index.read().owners.contains_key(id)
    }

    /// Returns the number of indexed identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.read().owners.len()
    }

    /// Returns whether nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.read().owners.is_empty()
    }
}

fn non_empty(partial: &str) -> Result<&str, ResolutionError> {
    let trimmed = partial.trim();
    if trimmed.is_empty() {
        return Err(ResolutionError::EmptyIdentifier);
    }
    Ok(trimmed)
}
