//! Identity types for tidesync.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlation id carried by an RPC request and echoed in its reply.
///
/// Assigned by the client, monotonically increasing per connection.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CallId(u64);

impl CallId {
    /// Create a new CallId with the given value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the numeric value of this CallId.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&CallId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn call_id_deserializes_from_number() {
        let id: CallId = serde_json::from_str("42").unwrap();
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn call_id_debug_format() {
        assert_eq!(format!("{:?}", CallId::new(3)), "CallId(3)");
    }
}
