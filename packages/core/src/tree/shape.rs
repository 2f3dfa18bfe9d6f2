//! Node shape and the depth/fan-out guard
//!
//! Rendering asks one question per row: does this node show its children?
//! [`NodeShape`] answers it from the node record plus the child index, and folds
//! in the guard that force-collapses subtrees nested deeper than `max_level` or,
//! from level 2 on, parents with `max_items_in_level2` or more children. The
//! guard only affects traversal and rendering; the data is left alone, and a
//! click on a guarded node zooms into it instead of toggling.

use crate::db::NodeStore;
use crate::models::Node;
use crate::tree::OutlineTree;

/// Why a node is forced collapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowReason {
    TooDeep,
    TooWide,
}

/// How a node presents its children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Leaf,
    Expanded { child_count: usize },
    Collapsed { child_count: usize },
    /// Forced collapsed by the guard; only reachable by zooming in
    Overflow {
        child_count: usize,
        reason: OverflowReason,
    },
}

impl NodeShape {
    pub fn shows_children(self) -> bool {
        matches!(self, NodeShape::Expanded { .. })
    }

    pub fn child_count(self) -> usize {
        match self {
            NodeShape::Leaf => 0,
            NodeShape::Expanded { child_count }
            | NodeShape::Collapsed { child_count }
            | NodeShape::Overflow { child_count, .. } => child_count,
        }
    }
}

/// Result of clicking a node's expand/collapse control
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    Toggled(Node),
    Zoomed(String),
    Ignored,
}

/// One rendered row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub id: String,
    /// Children of the view root are level 1
    pub level: usize,
    pub shape: NodeShape,
}

impl<S: NodeStore> OutlineTree<S> {
    /// Level of `id` relative to the view root, falling back to the document
    /// root for nodes outside the current zoom
    pub(crate) fn level_of(&self, id: &str) -> usize {
        self.depth_below(id, &self.view_root)
            .or_else(|| self.depth_below(id, &self.root_id))
            .unwrap_or(1)
    }

    pub(crate) fn shape_at(&self, node: &Node, level: usize) -> NodeShape {
        let child_count = self.index.child_count(&node.id);
        if child_count == 0 {
            return NodeShape::Leaf;
        }

        if level >= self.limits.max_level {
            return NodeShape::Overflow {
                child_count,
                reason: OverflowReason::TooDeep,
            };
        }

        if level >= 2 && child_count >= self.limits.max_items_in_level2 {
            return NodeShape::Overflow {
                child_count,
                reason: OverflowReason::TooWide,
            };
        }

        if node.collapsed {
            NodeShape::Collapsed { child_count }
        } else {
            NodeShape::Expanded { child_count }
        }
    }

    /// Shape of `id` at its current level, `None` if unknown
    pub fn shape(&self, id: &str) -> Option<NodeShape> {
        let node = self.store.get(id)?;
        Some(self.shape_at(node, self.level_of(id)))
    }

    /// Handle a click on the expand/collapse control of `id`
    pub fn click_toggle(&mut self, id: &str) -> ClickOutcome {
        match self.shape(id) {
            None | Some(NodeShape::Leaf) => ClickOutcome::Ignored,
            Some(NodeShape::Overflow { .. }) => {
                if self.zoom_into(id) {
                    ClickOutcome::Zoomed(id.to_string())
                } else {
                    ClickOutcome::Ignored
                }
            }
            Some(NodeShape::Expanded { .. } | NodeShape::Collapsed { .. }) => self
                .toggle_collapsed(id)
                .map(ClickOutcome::Toggled)
                .unwrap_or(ClickOutcome::Ignored),
        }
    }

    /// Pre-order list of rows under the view root
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<(&str, usize)> = self
            .index
            .children(&self.view_root)
            .iter()
            .rev()
            .map(|id| (id.as_str(), 1))
            .collect();

        while let Some((id, level)) = stack.pop() {
            let Some(node) = self.store.get(id) else {
                continue;
            };
            let shape = self.shape_at(node, level);
            if shape.shows_children() {
                stack.extend(
                    self.index
                        .children(id)
                        .iter()
                        .rev()
                        .map(|child| (child.as_str(), level + 1)),
                );
            }
            rows.push(VisibleRow {
                id: id.to_string(),
                level,
                shape,
            });
        }

        rows
    }

    /// Ancestor path of `id` from the top down, for a zoom breadcrumb bar
    pub fn breadcrumbs(&self, id: &str) -> Vec<String> {
        let mut path = self.ancestors(id);
        path.reverse();
        path
    }
}
