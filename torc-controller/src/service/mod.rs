//! Service Module
//!
//! Business logic layer for the controller.
//! Services orchestrate between repositories and collaborators.

pub mod group;
pub mod network;
pub mod node;
pub mod task;

// Re-export for convenience
pub use group as group_service;
pub use network as network_service;
pub use node as node_service;
pub use task as task_service;
