//! In-memory state store for tests and throwaway runs.

use std::cell::{Cell, RefCell};

use crate::error::{AppError, Result};
use crate::models::NotificationState;
use crate::storage::StateStore;

/// Keeps the last saved state in memory.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    saved: RefCell<NotificationState>,
    saves: Cell<usize>,
    fail: Cell<bool>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing state.
    pub fn with_state(state: NotificationState) -> Self {
        Self {
            saved: RefCell::new(state),
            ..Self::default()
        }
    }

    /// Start from whatever `store` currently holds. Later saves stay in
    /// memory and never reach `store`.
    pub fn from_store(store: &impl StateStore) -> Result<Self> {
        Ok(Self::with_state(store.load()?))
    }

    /// Copy of the last saved state.
    pub fn snapshot(&self) -> NotificationState {
        self.saved.borrow().clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// Make subsequent saves fail.
    pub fn fail_saves(&self, fail: bool) {
        self.fail.set(fail);
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<NotificationState> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &NotificationState) -> Result<()> {
        if self.fail.get() {
            return Err(AppError::Io(std::io::Error::other("save disabled")));
        }
        *self.saved.borrow_mut() = state.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
