//! Route DTOs

use serde::{Deserialize, Serialize};

/// A host route programmed through the network agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Destination prefix, always a `/32` host route
    pub destination: String,

    /// Next hop
    pub via: String,
}
