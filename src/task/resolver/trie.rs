//! Case-insensitive prefix trie over task identifiers.

use crate::task::domain::TaskId;
use std::collections::HashMap;

/// Lower-cases identifier characters for matching.
fn fold(value: &str) -> impl Iterator<Item = char> + '_ {
    value.chars().flat_map(char::to_lowercase)
}

/// One node of the trie.
///
/// `candidates` holds every stored identifier whose folded form passes
/// through this node, in insertion order and original case.
#[derive(Debug, Default)]
pub(super) struct TrieNode {
    children: HashMap<char, TrieNode>,
    candidates: Vec<TaskId>,
}

impl TrieNode {
    pub(super) fn insert(&mut self, id: &TaskId) {
        let mut node = self;
        for ch in fold(id.as_str()) {
            node = node.children.entry(ch).or_default();
            node.candidates.push(id.clone());
        }
    }

    /// Returns the node reached by `partial`, if the walk stays on the trie.
    pub(super) fn find(&self, partial: &str) -> Option<&Self> {
        let mut node = self;
        for ch in fold(partial) {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }

    pub(super) fn candidates(&self) -> &[TaskId] {
        &self.candidates
    }

    /// Shortest folded prefix whose node holds only `id`.
    ///
    /// Falls back to the full identifier when every prefix is shared, which
    /// happens when `id` is itself a prefix of another identifier. Returns
    /// `None` when `id` is not in the trie.
    pub(super) fn minimum_unique_prefix(&self, id: &TaskId) -> Option<String> {
        let mut node = self;
        let mut prefix = String::new();
        for ch in fold(id.as_str()) {
            node = node.children.get(&ch)?;
            prefix.push(ch);
            if node.candidates.len() == 1 {
                return node.candidates.contains(id).then_some(prefix);
            }
        }
        node.candidates
            .contains(id)
            .then(|| id.as_str().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::TrieNode;
    use crate::task::domain::TaskId;

    fn id(value: &str) -> TaskId {
        TaskId::new(value).expect("valid task id")
    }

    #[test]
    fn every_node_on_the_path_collects_the_identifier() {
        let mut root = TrieNode::default();
        root.insert(&id("AbC"));
        root.insert(&id("abd"));

        let shared = root.find("ab").expect("shared node");
        assert_eq!(shared.candidates(), [id("AbC"), id("abd")]);
        let single = root.find("ABC").expect("leaf node");
        assert_eq!(single.candidates(), [id("AbC")]);
        assert!(root.find("abz").is_none());
    }

    #[test]
    fn identifier_that_prefixes_another_falls_back_to_itself() {
        let mut root = TrieNode::default();
        root.insert(&id("abc"));
        root.insert(&id("abcd"));

        assert_eq!(root.minimum_unique_prefix(&id("abc")).as_deref(), Some("abc"));
        assert_eq!(root.minimum_unique_prefix(&id("abcd")).as_deref(), Some("abcd"));
        assert_eq!(root.minimum_unique_prefix(&id("zzz")), None);
    }
}
