//! Storage Layer
//!
//! This module holds the in-memory side of an outline:
//!
//! - `NodeStore` trait and the `MemoryNodeStore` default implementation
//! - `ChildIndex` - parent → ordered children, derived from the store
//! - `FractionalOrderCalculator` - midpoint arithmetic and precision checks
//!
//! Durable storage is external and reached through
//! [`PersistenceClient`](crate::services::PersistenceClient).

mod child_index;
pub mod fractional_ordering;
mod node_store;

pub use child_index::ChildIndex;
pub use fractional_ordering::FractionalOrderCalculator;
pub use node_store::{MemoryNodeStore, NodeStore};
