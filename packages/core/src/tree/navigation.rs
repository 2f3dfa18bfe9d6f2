//! Focus navigation over visible rows
//!
//! Arrow keys at a text-cursor boundary move focus to the previous or next
//! visible node. Both directions are read-only walks over the child index that
//! respect collapse state, the depth/fan-out guard and the current zoom.

use crate::db::NodeStore;
use crate::models::is_sentinel;
use crate::tree::OutlineTree;

/// Arrow key pressed at a cursor boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMove {
    Up,
    Down,
    /// Left at the start of the text
    Left,
    /// Right at the end of the text
    Right,
}

impl<S: NodeStore> OutlineTree<S> {
    /// Node that should receive focus after `movement` from `id`
    pub fn focus_target(&self, id: &str, movement: FocusMove) -> Option<String> {
        match movement {
            FocusMove::Up | FocusMove::Left => self.prev_visible(id),
            FocusMove::Down | FocusMove::Right => self.next_visible(id),
        }
    }

    /// Next visible node: first child if expanded, else next sibling, else the
    /// nearest ancestor's next sibling
    pub fn next_visible(&self, id: &str) -> Option<String> {
        let node = self.store.get(id)?;
        if id == self.view_root {
            return None;
        }

        if self.shape_at(node, self.level_of(id)).shows_children() {
            return self.index.first_child(id).map(str::to_string);
        }

        let mut current = node;
        loop {
            if let Some(next) = self.index.next_sibling(&current.parent_id, &current.id) {
                return Some(next.to_string());
            }
            if current.parent_id == self.view_root || is_sentinel(&current.parent_id) {
                return None;
            }
            current = self.store.get(&current.parent_id)?;
        }
    }

    /// Previous visible node: the elder sibling's deepest visible descendant,
    /// else the parent
    pub fn prev_visible(&self, id: &str) -> Option<String> {
        let node = self.store.get(id)?;
        if id == self.view_root {
            return None;
        }

        if let Some(elder) = self.index.prev_sibling(&node.parent_id, id) {
            return Some(self.deepest_visible_descendant(elder));
        }

        if node.parent_id == self.view_root || is_sentinel(&node.parent_id) {
            return None;
        }
        Some(node.parent_id.clone())
    }

    /// Follow last children down while they are visible
    pub fn deepest_visible_descendant(&self, id: &str) -> String {
        let mut current = id;
        let mut level = self.level_of(id);

        while let Some(node) = self.store.get(current) {
            if !self.shape_at(node, level).shows_children() {
                break;
            }
            match self.index.last_child(current) {
                Some(last) => {
                    current = last;
                    level += 1;
                }
                None => break,
            }
        }

        current.to_string()
    }
}
