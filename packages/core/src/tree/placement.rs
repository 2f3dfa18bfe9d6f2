//! Position planning for create / indent / outdent / drag
//!
//! Each `plan_*` method is a pure function of the store and child index: it
//! returns the `(parent_id, pos)` the affected node should take, or `None` when
//! the request is a no-op (unknown id, nothing to indent into, already at the
//! root, dropping a node on itself or into its own subtree). No sibling's `pos`
//! is ever touched; the new `pos` always lands strictly between the intended
//! neighbors, or one step past the single neighbor at an end.
//!
//! The matching un-prefixed methods (`indent`, `outdent`, `move_via_drag`, ...)
//! apply the plan and return the updated record.

use crate::db::{FractionalOrderCalculator, NodeStore};
use crate::models::{is_sentinel, DropPosition, Node, LIMBO_ID};
use crate::tree::{OutlineError, OutlineTree};

/// Target slot for a node: new parent and ordering key
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub parent_id: String,
    pub pos: f64,
}

impl Placement {
    pub fn new(parent_id: impl Into<String>, pos: f64) -> Self {
        Self {
            parent_id: parent_id.into(),
            pos,
        }
    }
}

impl<S: NodeStore> OutlineTree<S> {
    fn pos_of(&self, id: &str) -> Option<f64> {
        self.store.get(id).map(|n| n.pos)
    }

    /// Slot for a node created right after `node_id` ("Enter" at end of text)
    ///
    /// - `node_id` shows its children: become its first child, halfway between
    ///   0 and the current first child
    /// - `node_id` is the last sibling: `pos + 1`
    /// - otherwise: midpoint with the next sibling
    pub fn plan_insert_after(&self, node_id: &str) -> Option<Placement> {
        let node = self.store.get(node_id)?;
        if node.is_deleted() {
            return None;
        }

        let expanded = self
            .shape(node_id)
            .is_some_and(|shape| shape.shows_children());
        if expanded {
            if let Some(first) = self.index.first_child(node_id) {
                let pos = FractionalOrderCalculator::calculate_order(None, self.pos_of(first));
                return Some(Placement::new(node_id, pos));
            }
        }

        let next = self
            .index
            .next_sibling(&node.parent_id, node_id)
            .and_then(|id| self.pos_of(id));
        let pos = FractionalOrderCalculator::calculate_order(Some(node.pos), next);
        Some(Placement::new(node.parent_id.clone(), pos))
    }

    /// Slot at the end of `parent_id`'s children
    ///
    /// `parent_id` may be the document root even though it has no record;
    /// limbo and unknown ids yield `None`.
    pub fn plan_append_child(&self, parent_id: &str) -> Option<Placement> {
        if parent_id == LIMBO_ID {
            return None;
        }
        if parent_id != self.root_id {
            let parent = self.store.get(parent_id)?;
            if parent.is_deleted() {
                return None;
            }
        }

        let last = self
            .index
            .last_child(parent_id)
            .and_then(|id| self.pos_of(id));
        let pos = FractionalOrderCalculator::calculate_order(last, None);
        Some(Placement::new(parent_id, pos))
    }

    /// Slot for "Tab": last child of the elder sibling
    ///
    /// `None` when the node is the first among its siblings.
    pub fn plan_indent(&self, node_id: &str) -> Option<Placement> {
        let node = self.store.get(node_id)?;
        if node.is_deleted() {
            return None;
        }

        let Some(elder) = self.index.prev_sibling(&node.parent_id, node_id) else {
            tracing::debug!("Indent of '{}' skipped: no elder sibling", node_id);
            return None;
        };

        let last = self
            .index
            .last_child(elder)
            .and_then(|id| self.pos_of(id));
        let pos = FractionalOrderCalculator::calculate_order(last, None);
        Some(Placement::new(elder, pos))
    }

    /// Slot for "Shift+Tab": next sibling of the current parent
    ///
    /// `None` when the parent is the document root (or any sentinel).
    pub fn plan_outdent(&self, node_id: &str) -> Option<Placement> {
        let node = self.store.get(node_id)?;
        if node.parent_id == self.root_id || is_sentinel(&node.parent_id) {
            tracing::debug!("Outdent of '{}' skipped: already at root", node_id);
            return None;
        }

        let parent = self.store.get(&node.parent_id)?;
        if parent.is_deleted() {
            return None;
        }

        let next = self
            .index
            .next_sibling(&parent.parent_id, &parent.id)
            .and_then(|id| self.pos_of(id));
        let pos = FractionalOrderCalculator::calculate_order(Some(parent.pos), next);
        Some(Placement::new(parent.parent_id.clone(), pos))
    }

    /// Slot for dropping `dragged_id` above or below `target_id`
    ///
    /// Missing neighbors are replaced by the bounds `0` and `max_pos`. Drops
    /// that would place a node inside its own subtree are rejected.
    pub fn plan_move(
        &self,
        dragged_id: &str,
        target_id: &str,
        position: DropPosition,
    ) -> Option<Placement> {
        if dragged_id == target_id {
            return None;
        }

        self.store.get(dragged_id)?;
        let target = self.store.get(target_id)?;
        if target.is_deleted() {
            return None;
        }

        let parent_id = target.parent_id.as_str();
        if self.would_cycle(dragged_id, parent_id) {
            tracing::warn!(
                "Rejected drop of '{}' onto '{}': target is inside the dragged subtree",
                dragged_id,
                target_id
            );
            return None;
        }

        let siblings: Vec<&str> = self
            .index
            .children(parent_id)
            .iter()
            .map(String::as_str)
            .filter(|id| *id != dragged_id)
            .collect();
        let idx = siblings.iter().position(|id| *id == target_id)?;

        let (prev, next) = match position {
            DropPosition::Above => (idx.checked_sub(1).map(|i| siblings[i]), Some(target_id)),
            DropPosition::Below => (Some(target_id), siblings.get(idx + 1).copied()),
        };

        let pos = FractionalOrderCalculator::calculate_bounded_order(
            prev.and_then(|id| self.pos_of(id)),
            next.and_then(|id| self.pos_of(id)),
            self.limits.max_pos,
        );
        Some(Placement::new(parent_id, pos))
    }

    /// Move `node_id` to `placement`
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if `node_id` is unknown
    /// - `CyclicPlacement` if the new parent is the node or one of its descendants
    pub fn apply_placement(
        &mut self,
        node_id: &str,
        placement: Placement,
    ) -> Result<Node, OutlineError> {
        let mut node = self
            .store
            .get(node_id)
            .ok_or_else(|| OutlineError::node_not_found(node_id))?
            .clone();

        if placement.parent_id != node.parent_id && self.would_cycle(node_id, &placement.parent_id)
        {
            return Err(OutlineError::cyclic_placement(node_id, &placement.parent_id));
        }

        node.parent_id = placement.parent_id;
        node.pos = placement.pos;
        Ok(self.write(node))
    }

    fn commit(&mut self, node_id: &str, placement: Option<Placement>) -> Option<Node> {
        let placement = placement?;
        match self.apply_placement(node_id, placement) {
            Ok(node) => Some(node),
            Err(e) => {
                tracing::warn!("Placement of '{}' not applied: {}", node_id, e);
                None
            }
        }
    }

    /// Create `new_id` right after `node_id` (see [`Self::plan_insert_after`])
    ///
    /// Returns `Ok(None)` when `node_id` is unknown or deleted.
    pub fn create_after(
        &mut self,
        node_id: &str,
        new_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Option<Node>, OutlineError> {
        let Some(placement) = self.plan_insert_after(node_id) else {
            return Ok(None);
        };
        let node = Node::new(new_id, placement.parent_id, placement.pos, text);
        self.insert(node).map(Some)
    }

    /// Create `new_id` as the last child of `parent_id`
    pub fn append_child(
        &mut self,
        parent_id: &str,
        new_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Option<Node>, OutlineError> {
        let Some(placement) = self.plan_append_child(parent_id) else {
            return Ok(None);
        };
        let node = Node::new(new_id, placement.parent_id, placement.pos, text);
        self.insert(node).map(Some)
    }

    pub fn indent(&mut self, node_id: &str) -> Option<Node> {
        let placement = self.plan_indent(node_id);
        self.commit(node_id, placement)
    }

    pub fn outdent(&mut self, node_id: &str) -> Option<Node> {
        let placement = self.plan_outdent(node_id);
        self.commit(node_id, placement)
    }

    pub fn move_via_drag(
        &mut self,
        dragged_id: &str,
        target_id: &str,
        position: DropPosition,
    ) -> Option<Node> {
        let placement = self.plan_move(dragged_id, target_id, position);
        self.commit(dragged_id, placement)
    }
}
