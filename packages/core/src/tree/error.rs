//! Error types for explicit tree mutations
//!
//! Position planners never fail: a missing reference simply yields no
//! placement. These errors cover the calls where the caller hands over a
//! record or a placement and needs to know why it was refused.

use thiserror::Error;

use crate::models::ValidationError;

/// Errors raised by `OutlineTree` write operations
///
/// ```rust
/// use outline_core::tree::OutlineError;
///
/// let err = OutlineError::cyclic_placement("a", "a-child");
/// assert_eq!(
///     err.to_string(),
///     "Placing node 'a' under 'a-child' would make it its own ancestor"
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutlineError {
    /// Referenced node does not exist
    #[error("Node '{node_id}' does not exist")]
    NodeNotFound { node_id: String },

    /// A node with this id is already in the store
    ///
    /// Ids are assigned by the creator and never reused.
    #[error("Node '{node_id}' already exists")]
    DuplicateNode { node_id: String },

    /// Reparenting would put a node inside its own subtree
    #[error("Placing node '{node_id}' under '{parent_id}' would make it its own ancestor")]
    CyclicPlacement { node_id: String, parent_id: String },

    /// The record itself is malformed
    #[error("Node validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

impl OutlineError {
    pub fn node_not_found(node_id: impl Into<String>) -> Self {
        Self::NodeNotFound {
            node_id: node_id.into(),
        }
    }

    pub fn duplicate_node(node_id: impl Into<String>) -> Self {
        Self::DuplicateNode {
            node_id: node_id.into(),
        }
    }

    pub fn cyclic_placement(node_id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self::CyclicPlacement {
            node_id: node_id.into(),
            parent_id: parent_id.into(),
        }
    }
}
