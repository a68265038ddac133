use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::StoreError;
use super::json::JsonStore;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    #[serde(default)]
    pub count: u64,
}

/// All-time click total, no time window.
pub struct ClickCounter {
    store: JsonStore<CounterState>,
    lock: Mutex<()>,
}

impl ClickCounter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonStore::new(path),
            lock: Mutex::new(()),
        }
    }

    pub fn increment(&self) -> Result<u64, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut state = self.store.load();
        state.count = state.count.saturating_add(1);
        self.store.save(&state)?;

        Ok(state.count)
    }

    pub fn current(&self) -> u64 {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.load().count
    }
}
