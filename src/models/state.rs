//! Persisted notification state.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque token handed to the publisher.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

// Keep tokens out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Everything that survives between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationState {
    /// Names that have already been announced. Never pruned.
    #[serde(default)]
    pub announced_names: BTreeSet<String>,

    /// Publishing credential, set once by `authorize`
    #[serde(default)]
    pub credential: Option<Credential>,

    /// Time of the last write
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl NotificationState {
    pub fn is_announced(&self, name: &str) -> bool {
        self.announced_names.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("abc123");
        let debug = format!("{credential:?}");
        assert!(!debug.contains("abc123"));
    }

    #[test]
    fn test_missing_fields_default() {
        let state: NotificationState = serde_json::from_str("{}").unwrap();
        assert!(state.announced_names.is_empty());
        assert!(state.credential.is_none());
    }
}
