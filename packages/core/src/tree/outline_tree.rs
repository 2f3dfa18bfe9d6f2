//! OutlineTree - node store, child index and session state in one place
//!
//! `OutlineTree` owns a [`NodeStore`] snapshot and the [`ChildIndex`] derived
//! from it. Every write goes through [`OutlineTree::write`], which re-slots the
//! node in the index and records it as dirty, so the index can never drift from
//! the store it was built from.
//!
//! Alongside the data it holds the component-scoped UI state the operations
//! depend on: the current drag source and the zoomed-in view root.
//!
//! Position planning lives in `placement`, traversal in `navigation`, the
//! depth/fan-out guard in `shape`, and drift correction in `renormalize`.

use std::collections::{BTreeSet, HashSet};

use crate::db::{ChildIndex, MemoryNodeStore, NodeStore};
use crate::models::{is_sentinel, DropPosition, Node, NodeUpdate, HOME_ID, LIMBO_ID};
use crate::tree::OutlineError;

/// Nesting depth past which subtrees are forced collapsed
pub const MAX_LEVEL: usize = 10;

/// Child count at which a parent (level 2 or deeper) is forced collapsed
pub const MAX_ITEMS_IN_LEVEL2: usize = 100;

/// Notional upper bound for the last drop slot of a sibling list
pub const MAX_POS: f64 = 10000.0;

/// Fraction digits at which a `pos` is considered drifted
pub const PRECISION_DIGITS: usize = 5;

/// Tunables for rendering guards and position arithmetic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeLimits {
    pub max_level: usize,
    pub max_items_in_level2: usize,
    pub max_pos: f64,
    pub precision_digits: usize,
    /// Whether renormalization also rewrites `pinned_pos`
    pub renormalize_pinned: bool,
}

impl Default for TreeLimits {
    fn default() -> Self {
        Self {
            max_level: MAX_LEVEL,
            max_items_in_level2: MAX_ITEMS_IN_LEVEL2,
            max_pos: MAX_POS,
            precision_digits: PRECISION_DIGITS,
            renormalize_pinned: true,
        }
    }
}

/// Drag source recorded between drag-start and drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub dragged_id: String,
}

/// Records to hand to the persistence client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirtyBatch {
    /// Ids drained from the dirty set (re-queue these if the push fails)
    pub ids: Vec<String>,
    /// Dirty nodes plus their parents, deduplicated
    pub nodes: Vec<Node>,
}

impl DirtyBatch {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// In-memory outline with a derived child index
pub struct OutlineTree<S: NodeStore = MemoryNodeStore> {
    pub(crate) store: S,
    pub(crate) index: ChildIndex,
    pub(crate) root_id: String,
    pub(crate) view_root: String,
    pub(crate) limits: TreeLimits,
    dirty: BTreeSet<String>,
    drag: Option<DragState>,
}

impl OutlineTree<MemoryNodeStore> {
    /// Empty outline rooted at [`HOME_ID`]
    pub fn new() -> Self {
        Self::from_store(MemoryNodeStore::new())
    }

    /// Outline over existing records; nothing is marked dirty
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        Self::from_store(MemoryNodeStore::from_nodes(nodes))
    }
}

impl Default for OutlineTree<MemoryNodeStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: NodeStore> OutlineTree<S> {
    pub fn from_store(store: S) -> Self {
        let index = ChildIndex::build(&store);
        tracing::debug!("Built child index over {} nodes", store.len());
        Self {
            store,
            index,
            root_id: HOME_ID.to_string(),
            view_root: HOME_ID.to_string(),
            limits: TreeLimits::default(),
            dirty: BTreeSet::new(),
            drag: None,
        }
    }

    /// Use `root_id` as the document root instead of [`HOME_ID`]
    pub fn with_root(mut self, root_id: impl Into<String>) -> Self {
        self.root_id = root_id.into();
        self.view_root = self.root_id.clone();
        self
    }

    pub fn with_limits(mut self, limits: TreeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn limits(&self) -> &TreeLimits {
        &self.limits
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn index(&self) -> &ChildIndex {
        &self.index
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.store.get(id)
    }

    /// Ordered child ids of `parent_id`
    pub fn children(&self, parent_id: &str) -> &[String] {
        self.index.children(parent_id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    //
    // WRITES
    //

    /// Put `node` into the store, re-slot it in the index and mark it dirty
    pub(crate) fn write(&mut self, node: Node) -> Node {
        let id = node.id.clone();
        let snapshot = node.clone();
        let previous = self.store.put(node);
        let previous_parent = previous.as_ref().map(|n| n.parent_id.as_str());
        self.index.place(&self.store, &id, previous_parent);
        self.dirty.insert(id);
        snapshot
    }

    /// Insert a new record
    ///
    /// # Errors
    ///
    /// - `DuplicateNode` if the id is taken
    /// - `CyclicPlacement` if existing nodes already point at this id in a way
    ///   that would close a loop through `parent_id`
    /// - `ValidationFailed` for malformed records
    pub fn insert(&mut self, node: Node) -> Result<Node, OutlineError> {
        node.validate()?;

        if self.store.contains(&node.id) {
            return Err(OutlineError::duplicate_node(&node.id));
        }

        if self.would_cycle(&node.id, &node.parent_id) {
            return Err(OutlineError::cyclic_placement(&node.id, &node.parent_id));
        }

        Ok(self.write(node))
    }

    /// Apply a partial update in place
    ///
    /// An update that changes nothing returns the current record and leaves the
    /// node clean.
    pub fn update(&mut self, id: &str, update: NodeUpdate) -> Result<Node, OutlineError> {
        let current = self
            .store
            .get(id)
            .ok_or_else(|| OutlineError::node_not_found(id))?;

        if let Some(parent_id) = &update.parent_id {
            if parent_id != &current.parent_id && self.would_cycle(id, parent_id) {
                return Err(OutlineError::cyclic_placement(id, parent_id));
            }
        }

        let mut next = current.clone();
        if !next.apply_update(update) {
            return Ok(next);
        }
        next.validate()?;

        Ok(self.write(next))
    }

    fn modify(&mut self, id: &str, change: impl FnOnce(&mut Node)) -> Option<Node> {
        let mut node = self.store.get(id)?.clone();
        change(&mut node);
        Some(self.write(node))
    }

    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> Option<Node> {
        let text = text.into();
        self.modify(id, |node| node.text = text)
    }

    /// Flip completion state, stamping `checked_date` when checking
    pub fn toggle_checked(&mut self, id: &str) -> Option<Node> {
        self.modify(id, |node| node.set_checked(!node.checked))
    }

    pub fn toggle_collapsed(&mut self, id: &str) -> Option<Node> {
        self.modify(id, |node| node.collapsed = !node.collapsed)
    }

    /// Soft-delete: reparent to limbo. Descendants stay attached to the node.
    pub fn delete(&mut self, id: &str) -> Option<Node> {
        if self.store.get(id)?.is_deleted() {
            return None;
        }

        if self.drag_source() == Some(id) {
            self.cancel_drag();
        }
        if self.view_root == id || self.is_ancestor(id, &self.view_root) {
            self.reset_zoom();
        }

        tracing::debug!("Moving node '{}' to limbo", id);
        self.modify(id, |node| node.parent_id = LIMBO_ID.to_string())
    }

    //
    // STRUCTURE QUERIES
    //

    /// Parent chain of `id`, nearest first, excluding sentinels
    ///
    /// Ids that are referenced but missing from the store are included and end
    /// the walk. A pre-existing loop in the data also ends it.
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.store.get(id).map(|n| n.parent_id.as_str());

        while let Some(parent_id) = current {
            if is_sentinel(parent_id) || !seen.insert(parent_id) {
                break;
            }
            chain.push(parent_id.to_string());
            if parent_id == self.root_id {
                break;
            }
            current = self.store.get(parent_id).map(|n| n.parent_id.as_str());
        }

        chain
    }

    /// Whether `ancestor_id` appears in the parent chain of `id`
    pub fn is_ancestor(&self, ancestor_id: &str, id: &str) -> bool {
        self.ancestors(id).iter().any(|a| a == ancestor_id)
    }

    /// Whether giving `node_id` the parent `new_parent_id` would close a loop
    pub fn would_cycle(&self, node_id: &str, new_parent_id: &str) -> bool {
        new_parent_id == node_id || self.is_ancestor(node_id, new_parent_id)
    }

    /// Nesting level of `id` below `root`; children of `root` are level 1
    pub fn depth_below(&self, id: &str, root: &str) -> Option<usize> {
        if id == root {
            return Some(0);
        }

        let mut depth = 1;
        let mut seen = HashSet::new();
        let mut current = self.store.get(id)?.parent_id.as_str();
        loop {
            if current == root {
                return Some(depth);
            }
            if is_sentinel(current) || !seen.insert(current) {
                return None;
            }
            current = self.store.get(current)?.parent_id.as_str();
            depth += 1;
        }
    }

    /// `id` and all of its descendants in pre-order
    pub fn subtree_ids(&self, id: &str) -> Vec<String> {
        if !self.store.contains(id) {
            return Vec::new();
        }

        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![id.to_string()];

        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            stack.extend(self.index.children(&current).iter().rev().cloned());
            out.push(current);
        }

        out
    }

    //
    // DIRTY TRACKING
    //

    pub fn mark_dirty(&mut self, id: impl Into<String>) {
        self.dirty.insert(id.into());
    }

    pub fn is_dirty(&self, id: &str) -> bool {
        self.dirty.contains(id)
    }

    pub fn dirty_len(&self) -> usize {
        self.dirty.len()
    }

    /// Drain the dirty set into a batch of records to push
    ///
    /// Each dirty node's parent rides along so the backend sees both ends of a
    /// reparenting. Sentinels and ids no longer in the store are skipped.
    pub fn take_dirty_batch(&mut self) -> DirtyBatch {
        let ids: Vec<String> = std::mem::take(&mut self.dirty).into_iter().collect();

        let mut included = HashSet::new();
        let mut nodes = Vec::new();
        for id in &ids {
            let Some(node) = self.store.get(id) else {
                continue;
            };
            for candidate in [node.id.as_str(), node.parent_id.as_str()] {
                if is_sentinel(candidate) || !included.insert(candidate.to_string()) {
                    continue;
                }
                if let Some(record) = self.store.get(candidate) {
                    nodes.push(record.clone());
                }
            }
        }

        DirtyBatch { ids, nodes }
    }

    /// Put ids back into the dirty set after a failed push
    pub fn requeue(&mut self, ids: impl IntoIterator<Item = String>) {
        self.dirty.extend(ids);
    }

    //
    // DRAG STATE
    //

    /// Record `id` as the drag source. Returns `false` if it doesn't exist.
    pub fn begin_drag(&mut self, id: &str) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        self.drag = Some(DragState {
            dragged_id: id.to_string(),
        });
        true
    }

    pub fn drag_source(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.dragged_id.as_str())
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Consume the pending drag and move its source next to `target_id`
    pub fn drop_on(
        &mut self,
        target_id: &str,
        position: DropPosition,
    ) -> Option<Node> {
        let drag = self.drag.take()?;
        self.move_via_drag(&drag.dragged_id, target_id, position)
    }

    //
    // ZOOM
    //

    /// The node currently acting as the visible root
    pub fn view_root(&self) -> &str {
        &self.view_root
    }

    /// Make `id` the visible root. Returns `false` for unknown or deleted nodes.
    pub fn zoom_into(&mut self, id: &str) -> bool {
        match self.store.get(id) {
            Some(node) if !node.is_deleted() => {
                self.view_root = id.to_string();
                true
            }
            _ => false,
        }
    }

    /// Step the view root up one level, stopping at the document root
    pub fn zoom_out(&mut self) -> &str {
        if self.view_root == self.root_id {
            return &self.view_root;
        }
        if let Some(node) = self.store.get(&self.view_root) {
            if !is_sentinel(&node.parent_id) || node.parent_id == self.root_id {
                self.view_root = node.parent_id.clone();
            } else {
                self.view_root = self.root_id.clone();
            }
        }
        &self.view_root
    }

    pub fn reset_zoom(&mut self) {
        self.view_root = self.root_id.clone();
    }
}
