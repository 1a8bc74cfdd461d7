//! Account and value primitives

use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount of any asset in its smallest unit.
///
/// Payment values are 18-decimal and get multiplied by the tradable scale
/// (10^6) during price conversion, so `u64` is not wide enough.
pub type Amount = u128;

/// Seconds since the Unix epoch, as supplied by the ordering substrate.
pub type Timestamp = u64;

/// Opaque account identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Address {
    fn from(id: String) -> Self {
        Self(id)
    }
}
