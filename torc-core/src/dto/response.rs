//! Generic API responses

use serde::{Deserialize, Serialize};

/// Single-value response body used by the action endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleResponse {
    pub result: String,
}

impl SimpleResponse {
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
        }
    }

    /// The acknowledgement returned once an action has been applied
    pub fn done() -> Self {
        Self::new("done")
    }
}
