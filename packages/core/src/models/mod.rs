//! Data Models
//!
//! This module contains the core data structures of an outline:
//!
//! - `Node` - A single outline entry (tree pointer, ordering key, content, flags)
//! - `NodeUpdate` - Partial update applied in place
//! - Sentinel parent ids (`HOME_ID`, `LIMBO_ID`)

mod node;

pub use node::{is_sentinel, DropPosition, Node, NodeUpdate, ValidationError, HOME_ID, LIMBO_ID};
