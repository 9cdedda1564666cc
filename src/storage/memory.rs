use parking_lot::Mutex;

use super::{CounterStore, RecordStore, StorageError, INITIAL_COUNTER, RECEIPT_COUNTER_KEY};
use crate::models::{Bill, Notice};

#[derive(Debug)]
struct MemoryState {
    counter: Option<u64>,
    notices: Vec<Notice>,
    bills: Vec<Bill>,
}

/// In-process store with the same semantics as [`super::JsonFileStore`].
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                counter: None,
                notices: Vec::new(),
                bills: Vec::new(),
            }),
        }
    }

    /// Start with the counter already at `value`.
    pub fn with_counter(value: u64) -> Self {
        let store = Self::new();
        store.state.lock().counter = Some(value);
        store
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterStore for MemoryStore {
    fn peek(&self) -> u64 {
        self.state.lock().counter.unwrap_or(INITIAL_COUNTER)
    }

    fn take(&self) -> Result<u64, StorageError> {
        let mut state = self.state.lock();
        let current = state.counter.unwrap_or(INITIAL_COUNTER);
        let next = current
            .checked_add(1)
            .ok_or(StorageError::CounterOverflow {
                key: RECEIPT_COUNTER_KEY,
            })?;
        state.counter = Some(next);
        Ok(current)
    }
}

impl RecordStore for MemoryStore {
    fn list_notices(&self) -> Vec<Notice> {
        self.state.lock().notices.clone()
    }

    fn list_bills(&self) -> Vec<Bill> {
        self.state.lock().bills.clone()
    }

    fn append_notice(&self, notice: Notice) -> Result<(), StorageError> {
        self.state.lock().notices.push(notice);
        Ok(())
    }

    fn append_bill(&self, bill: Bill) -> Result<(), StorageError> {
        self.state.lock().bills.push(bill);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_returns_pre_increment_value() {
        let store = MemoryStore::with_counter(41);
        assert_eq!(store.take().unwrap(), 41);
        assert_eq!(store.take().unwrap(), 42);
        assert_eq!(store.peek(), 43);
    }

    #[test]
    fn test_uninitialized_counter_peeks_one() {
        let store = MemoryStore::new();
        assert_eq!(store.peek(), 1);
        assert_eq!(store.peek(), 1);
    }
}
