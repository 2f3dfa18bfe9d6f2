//! Parent → ordered children index
//!
//! Derived from a [`NodeStore`] and kept in step with it by [`OutlineTree`],
//! which calls [`ChildIndex::place`] for every record it writes. The renderer
//! and every position computation read sibling order from here rather than
//! sorting the store on each access.
//!
//! [`OutlineTree`]: crate::tree::OutlineTree

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::db::{FractionalOrderCalculator, NodeStore};

/// Map: parent_id → child ids sorted by (`pos`, `id`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildIndex {
    children: HashMap<String, Vec<String>>,
}

impl ChildIndex {
    /// Build the full index from a store snapshot
    pub fn build<S: NodeStore + ?Sized>(store: &S) -> Self {
        let mut grouped: HashMap<String, Vec<&crate::models::Node>> = HashMap::new();
        for node in store.all() {
            grouped.entry(node.parent_id.clone()).or_default().push(node);
        }

        let children = grouped
            .into_iter()
            .map(|(parent_id, mut nodes)| {
                nodes.sort_by(|a, b| FractionalOrderCalculator::sibling_cmp(a, b));
                let ids = nodes.into_iter().map(|n| n.id.clone()).collect();
                (parent_id, ids)
            })
            .collect();

        Self { children }
    }

    /// Ordered child ids of `parent_id` (empty if none)
    pub fn children(&self, parent_id: &str) -> &[String] {
        self.children
            .get(parent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn child_count(&self, parent_id: &str) -> usize {
        self.children(parent_id).len()
    }

    pub fn has_children(&self, parent_id: &str) -> bool {
        !self.children(parent_id).is_empty()
    }

    pub fn first_child(&self, parent_id: &str) -> Option<&str> {
        self.children(parent_id).first().map(String::as_str)
    }

    pub fn last_child(&self, parent_id: &str) -> Option<&str> {
        self.children(parent_id).last().map(String::as_str)
    }

    /// Rank of `id` among the children of `parent_id`
    pub fn position_of(&self, parent_id: &str, id: &str) -> Option<usize> {
        self.children(parent_id).iter().position(|c| c == id)
    }

    /// The sibling immediately after `id`
    pub fn next_sibling(&self, parent_id: &str, id: &str) -> Option<&str> {
        let siblings = self.children(parent_id);
        let idx = self.position_of(parent_id, id)?;
        siblings.get(idx + 1).map(String::as_str)
    }

    /// The sibling immediately before `id` (its elder sibling)
    pub fn prev_sibling(&self, parent_id: &str, id: &str) -> Option<&str> {
        let siblings = self.children(parent_id);
        let idx = self.position_of(parent_id, id)?;
        idx.checked_sub(1)
            .and_then(|i| siblings.get(i))
            .map(String::as_str)
    }

    /// Parent ids that currently have at least one child
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Drop `id` from the children of `parent_id`. Returns whether it was present.
    pub fn remove(&mut self, parent_id: &str, id: &str) -> bool {
        let Some(list) = self.children.get_mut(parent_id) else {
            return false;
        };
        let Some(idx) = list.iter().position(|c| c == id) else {
            return false;
        };
        list.remove(idx);
        if list.is_empty() {
            self.children.remove(parent_id);
        }
        true
    }

    /// Re-slot `id` after its record was written to `store`
    ///
    /// `previous_parent` is the parent the node had before the write (if it
    /// existed). The node is removed from there and inserted into its current
    /// parent's list at the rank given by its (`pos`, `id`).
    pub fn place<S: NodeStore + ?Sized>(
        &mut self,
        store: &S,
        id: &str,
        previous_parent: Option<&str>,
    ) {
        if let Some(previous) = previous_parent {
            self.remove(previous, id);
        }

        let Some(node) = store.get(id) else {
            return;
        };
        self.remove(&node.parent_id, id);

        let list = self.children.entry(node.parent_id.clone()).or_default();
        let at = list.partition_point(|sibling_id| match store.get(sibling_id) {
            Some(sibling) => {
                FractionalOrderCalculator::sibling_cmp(sibling, node) == Ordering::Less
            }
            None => true,
        });
        list.insert(at, id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryNodeStore;
    use crate::models::{Node, HOME_ID};

    fn store() -> MemoryNodeStore {
        MemoryNodeStore::from_nodes(vec![
            Node::new("b", HOME_ID, 2.0, ""),
            Node::new("a", HOME_ID, 1.0, ""),
            Node::new("c", HOME_ID, 3.0, ""),
            Node::new("a1", "a", 1.0, ""),
        ])
    }

    #[test]
    fn test_build_sorts_siblings() {
        let index = ChildIndex::build(&store());
        assert_eq!(index.children(HOME_ID), ["a", "b", "c"]);
        assert_eq!(index.children("a"), ["a1"]);
        assert!(index.children("zzz").is_empty());
        assert_eq!(index.first_child(HOME_ID), Some("a"));
        assert_eq!(index.last_child(HOME_ID), Some("c"));
    }

    #[test]
    fn test_build_breaks_pos_ties_by_id() {
        let store = MemoryNodeStore::from_nodes(vec![
            Node::new("y", HOME_ID, 1.0, ""),
            Node::new("x", HOME_ID, 1.0, ""),
        ]);
        let index = ChildIndex::build(&store);
        assert_eq!(index.children(HOME_ID), ["x", "y"]);
    }

    #[test]
    fn test_sibling_lookups() {
        let index = ChildIndex::build(&store());
        assert_eq!(index.next_sibling(HOME_ID, "a"), Some("b"));
        assert_eq!(index.next_sibling(HOME_ID, "c"), None);
        assert_eq!(index.prev_sibling(HOME_ID, "b"), Some("a"));
        assert_eq!(index.prev_sibling(HOME_ID, "a"), None);
        assert_eq!(index.position_of(HOME_ID, "c"), Some(2));
        assert_eq!(index.position_of(HOME_ID, "a1"), None);
    }

    #[test]
    fn test_place_moves_between_parents_and_matches_rebuild() {
        let mut store = store();
        let mut index = ChildIndex::build(&store);

        // Move c under a, before a1
        store.put(Node::new("c", "a", 0.5, ""));
        index.place(&store, "c", Some(HOME_ID));
        assert_eq!(index.children(HOME_ID), ["a", "b"]);
        assert_eq!(index.children("a"), ["c", "a1"]);

        // Reposition within the same parent
        store.put(Node::new("b", HOME_ID, 0.1, ""));
        index.place(&store, "b", Some(HOME_ID));
        assert_eq!(index.children(HOME_ID), ["b", "a"]);

        assert_eq!(index, ChildIndex::build(&store));
    }

    #[test]
    fn test_remove_drops_empty_lists() {
        let mut index = ChildIndex::build(&store());
        assert!(index.remove("a", "a1"));
        assert!(!index.remove("a", "a1"));
        assert!(!index.has_children("a"));
        assert!(!index.parents().any(|p| p == "a"));
    }
}
