//! Torc Core
//!
//! Core types and abstractions for the Torc cluster controller.
//!
//! This crate contains:
//! - Config: the cluster configuration document (schema, loading, variable
//!   substitution, validation)
//! - Domain types: runtime entities tracked by the controller (Node, Task)
//! - DTOs: Data transfer objects for controller API communication

pub mod config;
pub mod domain;
pub mod dto;
