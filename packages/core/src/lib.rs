//! Outline Core
//!
//! Ordering, structure and background maintenance for a tree-shaped outline
//! (notes, task lists, long-form writing).
//!
//! # Model
//!
//! - Every node points at its parent and carries a fractional `pos`; siblings
//!   sort by `pos`, ties broken by id
//! - Structural edits compute one new `(parent_id, pos)` for the moved node and
//!   never rewrite its siblings
//! - Repeated midpoint insertion erodes precision, so a debounced background
//!   pass rewrites drifted sibling lists to integer ranks
//! - Deletion reparents to the `limbo` sentinel; durable storage is external
//!
//! # Modules
//!
//! - [`models`] - `Node`, `NodeUpdate`, sentinel ids
//! - [`db`] - `NodeStore`, child index, fractional order arithmetic
//! - [`tree`] - `OutlineTree` operations, navigation, guards, renormalization
//! - [`services`] - Configuration, renormalization processor, sync worker
//! - [`logging`] - Default tracing subscriber

pub mod db;
pub mod logging;
pub mod models;
pub mod services;
pub mod tree;

// Re-export commonly used types
pub use db::{ChildIndex, FractionalOrderCalculator, MemoryNodeStore, NodeStore};
pub use models::*;
pub use services::{
    OutlineConfig, PersistenceClient, RenormalizationProcessor, SharedOutline, SyncStatus,
    SyncWorker,
};
pub use tree::{OutlineError, OutlineTree};
