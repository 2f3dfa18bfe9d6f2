//! NodeStore Trait - Snapshot Source Abstraction
//!
//! `OutlineTree` reads and writes node records through `NodeStore` so the host
//! can back it with whatever in-memory structure it already keeps (a reactive
//! store, a CRDT document view, a plain map). [`MemoryNodeStore`] is the
//! default `HashMap`-backed implementation.
//!
//! # Design Decisions
//!
//! 1. **Synchronous**: all position arithmetic runs over an in-memory snapshot
//!    and never blocks; durable writes go through
//!    [`PersistenceClient`](crate::services::PersistenceClient) instead
//! 2. **Ownership Semantics**: `put` takes ownership of the record and returns
//!    the replaced one, if any
//! 3. **No deletes**: nodes are soft-deleted by reparenting to limbo
//!
//! # Examples
//!
//! ```rust
//! use outline_core::db::{MemoryNodeStore, NodeStore};
//! use outline_core::models::{Node, HOME_ID};
//!
//! let mut store = MemoryNodeStore::new();
//! store.put(Node::new("a", HOME_ID, 1.0, "first"));
//! assert_eq!(store.get("a").map(|n| n.text.as_str()), Some("first"));
//! assert_eq!(store.len(), 1);
//! ```

use std::collections::HashMap;

use crate::models::Node;

/// Snapshot source for the outline tree
///
/// Implementations must be `Send` so a tree can be shared with the background
/// workers behind an async mutex.
pub trait NodeStore: Send {
    /// Get node by ID
    ///
    /// Returns `None` if the node doesn't exist (not an error).
    fn get(&self, id: &str) -> Option<&Node>;

    /// Iterate over every node in the store, in no particular order
    fn all(&self) -> Box<dyn Iterator<Item = &Node> + '_>;

    /// Insert or replace a node, returning the previous record with the same id
    fn put(&mut self, node: Node) -> Option<Node>;

    /// Number of nodes in the store
    fn len(&self) -> usize {
        self.all().count()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

/// `HashMap`-backed node store
#[derive(Debug, Clone, Default)]
pub struct MemoryNodeStore {
    nodes: HashMap<String, Node>,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing records (later duplicates replace earlier ones)
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let nodes = nodes
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect();
        Self { nodes }
    }
}

impl NodeStore for MemoryNodeStore {
    fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    fn all(&self) -> Box<dyn Iterator<Item = &Node> + '_> {
        Box::new(self.nodes.values())
    }

    fn put(&mut self, node: Node) -> Option<Node> {
        self.nodes.insert(node.id.clone(), node)
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}
