//! Outline tree: node store, child index and position arithmetic
//!
//! All structural edits (create, indent, outdent, drag/drop, delete) and the
//! read-side walks (visible rows, focus navigation, breadcrumbs) are methods on
//! [`OutlineTree`], split across submodules by concern.

mod error;
mod navigation;
mod outline_tree;
mod pinned;
mod placement;
mod renormalize;
mod shape;

#[cfg(test)]
mod outline_tree_test;

pub use error::OutlineError;
pub use navigation::FocusMove;
pub use outline_tree::{
    DirtyBatch, DragState, OutlineTree, TreeLimits, MAX_ITEMS_IN_LEVEL2, MAX_LEVEL, MAX_POS,
    PRECISION_DIGITS,
};
pub use placement::Placement;
pub use renormalize::RenormalizationReport;
pub use shape::{ClickOutcome, NodeShape, OverflowReason, VisibleRow};
