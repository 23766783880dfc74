//! Data Transfer Objects for controller API communication
//!
//! Lightweight response and summary types shared by the controller,
//! the client library and the CLI.

pub mod node;
pub mod response;
pub mod route;
pub mod task;
