//! Server-side point identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric handle returned by a name lookup. Only meaningful for the server
/// the session was connected to when it was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub i32);

impl PointId {
    pub fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for PointId {
    fn from(raw: i32) -> Self {
        PointId(raw)
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
