//! Storage for notification state.
//!
//! The state is small and rewritten in full on every change, so a run that
//! dies at any point has already committed every announcement decision it
//! returned from.
//!
//! ## Layout
//!
//! ```text
//! partywatch.json
//! {
//!   "announced_names": ["Foo Party", ...],
//!   "credential": { "token": "..." },
//!   "updated_at": "2026-10-17T09:00:00Z"
//! }
//! ```

pub mod local;
pub mod memory;

use chrono::Utc;

use crate::error::Result;
use crate::models::{Credential, NotificationState};

// Re-export for convenience
pub use local::LocalStateStore;
pub use memory::MemoryStateStore;

/// Trait for state backends.
pub trait StateStore {
    /// Load persisted state, or the default state if nothing was saved yet.
    fn load(&self) -> Result<NotificationState>;

    /// Overwrite the persisted state. Must be durable when it returns.
    fn save(&self, state: &NotificationState) -> Result<()>;
}

/// In-memory view of the notification state bound to its store.
///
/// Every mutation is flushed before the method returns.
#[derive(Debug)]
pub struct StateLedger<S: StateStore> {
    state: NotificationState,
    store: S,
}

impl<S: StateStore> StateLedger<S> {
    /// Load state from the store.
    pub fn open(store: S) -> Result<Self> {
        let state = store.load()?;
        log::debug!(
            "Loaded state with {} announced names",
            state.announced_names.len()
        );
        Ok(Self { state, store })
    }

    pub fn is_announced(&self, name: &str) -> bool {
        self.state.is_announced(name)
    }

    /// Record `name` as announced and persist.
    ///
    /// Returns `true` if the name was not recorded before. Calling this for a
    /// name that is already present still rewrites the state.
    pub fn mark_announced(&mut self, name: &str) -> Result<bool> {
        let inserted = self.state.announced_names.insert(name.to_string());
        self.flush()?;
        Ok(inserted)
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.state.credential.as_ref()
    }

    /// Replace the stored credential and persist.
    pub fn set_credential(&mut self, credential: Credential) -> Result<()> {
        self.state.credential = Some(credential);
        self.flush()
    }

    pub fn state(&self) -> &NotificationState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn flush(&mut self) -> Result<()> {
        self.state.updated_at = Some(Utc::now());
        self.store.save(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_announced_is_idempotent() {
        let mut ledger = StateLedger::open(MemoryStateStore::new()).unwrap();

        assert!(!ledger.is_announced("Foo"));
        assert!(ledger.mark_announced("Foo").unwrap());
        assert!(!ledger.mark_announced("Foo").unwrap());
        assert!(ledger.is_announced("Foo"));
        assert_eq!(ledger.state().announced_names.len(), 1);
    }

    #[test]
    fn test_every_mutation_is_flushed() {
        let mut ledger = StateLedger::open(MemoryStateStore::new()).unwrap();

        ledger.mark_announced("Foo").unwrap();
        assert_eq!(ledger.store().save_count(), 1);
        ledger.mark_announced("Foo").unwrap();
        assert_eq!(ledger.store().save_count(), 2);
        ledger.set_credential(Credential::new("token")).unwrap();
        assert_eq!(ledger.store().save_count(), 3);

        let saved = ledger.store().snapshot();
        assert!(saved.is_announced("Foo"));
        assert_eq!(saved.credential, Some(Credential::new("token")));
        assert!(saved.updated_at.is_some());
    }

    #[test]
    fn test_failed_save_is_reported() {
        let store = MemoryStateStore::new();
        store.fail_saves(true);
        let mut ledger = StateLedger::open(store).unwrap();

        assert!(ledger.mark_announced("Foo").is_err());
    }
}
