//! Core domain types
//!
//! Runtime entities tracked by the controller. Nodes are seeded from the
//! configuration document; tasks are requested from service descriptors or
//! announced by the agents running them.

pub mod node;
pub mod task;
