//! Background Services
//!
//! This module contains the workers that run alongside an interactive outline:
//!
//! - `RenormalizationProcessor` - Debounced, interval-driven renormalization
//! - `SyncWorker` - Periodic dirty-set flush through a `PersistenceClient`
//! - `OutlineConfig` - Tunables for both workers and the tree guards
//!
//! Both workers share the tree with the UI as a [`SharedOutline`]; the mutex
//! only serializes the single local writer against the background passes.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::MemoryNodeStore;
use crate::tree::OutlineTree;

pub mod config;
pub mod error;
pub mod persistence;
pub mod renormalization_processor;
pub mod sync_worker;

pub use config::OutlineConfig;
pub use error::{ConfigError, PersistenceError};
pub use persistence::{push_with_retry, PersistenceClient, RetryPolicy, SyncStatus};
pub use renormalization_processor::{
    RenormalizationProcessor, RenormalizationStats, RenormalizationWaker,
};
pub use sync_worker::SyncWorker;

/// Outline shared between the UI and the background workers
pub type SharedOutline<S = MemoryNodeStore> = Arc<Mutex<OutlineTree<S>>>;
