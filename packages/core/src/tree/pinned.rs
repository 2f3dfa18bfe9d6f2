//! Flattened pinned view ordered by `pinned_pos`
//!
//! Independent of tree order: pinning appends to the end of the view, and
//! reordering uses the same midpoint scheme as sibling drag/drop.

use crate::db::{FractionalOrderCalculator, NodeStore};
use crate::models::{DropPosition, Node};
use crate::tree::OutlineTree;

impl<S: NodeStore> OutlineTree<S> {
    /// Pinned, non-deleted node ids in view order
    pub fn pinned_ids(&self) -> Vec<String> {
        let mut pinned: Vec<&Node> = self
            .store
            .all()
            .filter(|node| node.is_pinned() && !node.is_deleted())
            .collect();
        pinned.sort_by(|a, b| FractionalOrderCalculator::pinned_cmp(a, b));
        pinned.into_iter().map(|node| node.id.clone()).collect()
    }

    /// Pin `id` at the end of the pinned view. No-op if already pinned.
    pub fn pin(&mut self, id: &str) -> Option<Node> {
        let node = self.store.get(id)?;
        if node.is_pinned() || node.is_deleted() {
            return None;
        }

        let last = self
            .pinned_ids()
            .last()
            .and_then(|last| self.store.get(last))
            .and_then(|n| n.pinned_pos);
        let mut node = node.clone();
        node.pinned_pos = Some(FractionalOrderCalculator::calculate_order(last, None));
        Some(self.write(node))
    }

    pub fn unpin(&mut self, id: &str) -> Option<Node> {
        let node = self.store.get(id)?;
        if !node.is_pinned() {
            return None;
        }
        let mut node = node.clone();
        node.pinned_pos = None;
        Some(self.write(node))
    }

    /// New `pinned_pos` for dropping `dragged_id` next to `target_id` in the
    /// pinned view
    pub fn plan_pinned_move(
        &self,
        dragged_id: &str,
        target_id: &str,
        position: DropPosition,
    ) -> Option<f64> {
        if dragged_id == target_id {
            return None;
        }
        if !self.store.get(dragged_id)?.is_pinned() {
            return None;
        }

        let pinned: Vec<String> = self
            .pinned_ids()
            .into_iter()
            .filter(|id| id != dragged_id)
            .collect();
        let idx = pinned.iter().position(|id| id == target_id)?;

        let (prev, next) = match position {
            DropPosition::Above => (
                idx.checked_sub(1).map(|i| pinned[i].as_str()),
                Some(target_id),
            ),
            DropPosition::Below => (Some(target_id), pinned.get(idx + 1).map(String::as_str)),
        };
        let pinned_pos_of = |id: &str| self.store.get(id).and_then(|n| n.pinned_pos);

        Some(FractionalOrderCalculator::calculate_bounded_order(
            prev.and_then(pinned_pos_of),
            next.and_then(pinned_pos_of),
            self.limits.max_pos,
        ))
    }

    pub fn move_pinned(
        &mut self,
        dragged_id: &str,
        target_id: &str,
        position: DropPosition,
    ) -> Option<Node> {
        let pinned_pos = self.plan_pinned_move(dragged_id, target_id, position)?;
        let mut node = self.store.get(dragged_id)?.clone();
        node.pinned_pos = Some(pinned_pos);
        Some(self.write(node))
    }
}
