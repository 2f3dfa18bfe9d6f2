//! Node Data Structures
//!
//! This module defines the `Node` record that makes up an outline, the partial
//! `NodeUpdate` used for in-place mutation, and the sentinel parent ids.
//!
//! # Architecture
//!
//! - **Flat records**: the tree lives in `parent_id` pointers, not in nesting
//! - **Fractional ordering**: siblings sort ascending by `pos` (ties broken by `id`)
//! - **Soft delete**: deleting a node reparents it to [`LIMBO_ID`]; nothing is removed
//!
//! # Examples
//!
//! ```rust
//! use outline_core::models::{Node, HOME_ID};
//!
//! let node = Node::new("n-1", HOME_ID, 1.0, "Buy milk");
//! assert!(node.validate().is_ok());
//! assert!(!node.is_deleted());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Parent id of the top-level items of a document.
pub const HOME_ID: &str = "home";

/// Parent id of logically deleted nodes.
pub const LIMBO_ID: &str = "limbo";

/// Whether `id` is one of the sentinel parents that never take part in
/// position arithmetic.
pub fn is_sentinel(id: &str) -> bool {
    id == HOME_ID || id == LIMBO_ID
}

/// Validation errors for Node records
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid node ID: {0}")]
    InvalidId(String),

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),
}

/// Where a dragged node lands relative to the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Above,
    Below,
}

/// A single outline entry.
///
/// # Fields
///
/// - `id`: Caller-assigned identifier, never reassigned
/// - `parent_id`: Containing node, [`HOME_ID`] for top-level items, or [`LIMBO_ID`] once deleted
/// - `pos`: Sibling ordering key (ascending)
/// - `text`: Content string
/// - `checked` / `checked_date`: Completion state and when it was set
/// - `collapsed`: Whether children are hidden
/// - `pinned_pos`: Ordering key in the flattened pinned view (`None` = not pinned)
///
/// The serialized shape uses exactly these snake_case keys, which is also the
/// shape handed to the persistence client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,

    pub parent_id: String,

    pub pos: f64,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub checked: bool,

    #[serde(default)]
    pub checked_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub collapsed: bool,

    #[serde(default)]
    pub pinned_pos: Option<f64>,
}

impl Node {
    /// Create an unchecked, expanded, unpinned node
    pub fn new(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        pos: f64,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            pos,
            text: text.into(),
            checked: false,
            checked_date: None,
            collapsed: false,
            pinned_pos: None,
        }
    }

    /// Generate a fresh node id (UUID v4) for callers that don't bring their own.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Validate record shape
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - `id` or `parent_id` is empty
    /// - `id` is a sentinel id
    /// - the node references itself as parent
    /// - `pos` or `pinned_pos` is NaN or infinite
    ///
    /// ```rust
    /// # use outline_core::models::{Node, HOME_ID};
    /// let node = Node::new("a", "a", 1.0, "");
    /// assert!(node.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }

        if self.parent_id.is_empty() {
            return Err(ValidationError::MissingField("parent_id".to_string()));
        }

        if is_sentinel(&self.id) {
            return Err(ValidationError::InvalidId(format!(
                "'{}' is reserved",
                self.id
            )));
        }

        if self.parent_id == self.id {
            return Err(ValidationError::InvalidParent(
                "Node cannot be its own parent".to_string(),
            ));
        }

        if !self.pos.is_finite() {
            return Err(ValidationError::InvalidPosition(format!(
                "pos must be finite, got {}",
                self.pos
            )));
        }

        if let Some(pinned) = self.pinned_pos {
            if !pinned.is_finite() {
                return Err(ValidationError::InvalidPosition(format!(
                    "pinned_pos must be finite, got {}",
                    pinned
                )));
            }
        }

        Ok(())
    }

    /// Whether the node sits in limbo (logically deleted)
    pub fn is_deleted(&self) -> bool {
        self.parent_id == LIMBO_ID
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned_pos.is_some()
    }

    /// Set completion state, stamping or clearing `checked_date`
    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
        self.checked_date = if checked { Some(Utc::now()) } else { None };
    }

    /// Apply a partial update. Returns `true` when any field changed.
    pub fn apply_update(&mut self, update: NodeUpdate) -> bool {
        let mut changed = false;

        if let Some(text) = update.text {
            changed |= self.text != text;
            self.text = text;
        }

        if let Some(parent_id) = update.parent_id {
            changed |= self.parent_id != parent_id;
            self.parent_id = parent_id;
        }

        if let Some(pos) = update.pos {
            changed |= self.pos != pos;
            self.pos = pos;
        }

        if let Some(checked) = update.checked {
            if self.checked != checked {
                self.set_checked(checked);
                changed = true;
            }
        }

        if let Some(collapsed) = update.collapsed {
            changed |= self.collapsed != collapsed;
            self.collapsed = collapsed;
        }

        if let Some(pinned_pos) = update.pinned_pos {
            changed |= self.pinned_pos != pinned_pos;
            self.pinned_pos = pinned_pos;
        }

        changed
    }
}

/// Maps a present JSON field (including `null`) to `Some(..)` so that a missing
/// field stays `None` via `#[serde(default)]`.
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Partial node update
///
/// Only provided fields are applied. `pinned_pos` is nullable and uses the
/// double-Option pattern:
///
/// - `None`: Don't change the field
/// - `Some(None)`: Unpin
/// - `Some(Some(pos))`: Pin at `pos`
///
/// ```rust
/// # use outline_core::models::NodeUpdate;
/// let update = NodeUpdate::new().with_text("Renamed").with_collapsed(true);
/// assert!(!update.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub pinned_pos: Option<Option<f64>>,
}

impl NodeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_position(mut self, parent_id: impl Into<String>, pos: f64) -> Self {
        self.parent_id = Some(parent_id.into());
        self.pos = Some(pos);
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = Some(collapsed);
        self
    }

    pub fn with_pinned_pos(mut self, pinned_pos: Option<f64>) -> Self {
        self.pinned_pos = Some(pinned_pos);
        self
    }

    /// Check if update contains any changes
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.parent_id.is_none()
            && self.pos.is_none()
            && self.checked.is_none()
            && self.collapsed.is_none()
            && self.pinned_pos.is_none()
    }
}
