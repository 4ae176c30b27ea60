use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque account identifier. The host's identity scheme is outside this
/// service; an account is whatever non-empty string the caller presents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The empty/whitespace sentinel, rejected everywhere an account is
    /// stored or credited.
    pub fn is_null(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sentinel() {
        assert!(AccountId::new("").is_null());
        assert!(AccountId::new("   ").is_null());
        assert!(!AccountId::new("alice").is_null());
    }
}
