//! Repository Module
//!
//! Data access layer over the in-memory store.
//! Each repository handles the table of a specific domain entity.

pub mod node;
pub mod task;

// Re-export for convenience
pub use node as node_repository;
pub use task as task_repository;
