//! Storage layer for workflows
//!
//! Persists workflow aggregates and their activity logs.

mod memory;
mod traits;

pub use memory::InMemoryStorage;
pub use traits::{ActivityStorage, Storage, StorageResult, WorkflowStorage};
