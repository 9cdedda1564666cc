//! Persisted state: the receipt counter and the notice/bill history.
//!
//! Three independently keyed entries make up the state. The key names are the
//! ones used by the browser-era storage and must not change, otherwise existing
//! data directories stop being read.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::models::{Bill, Notice};
use thiserror::Error;

pub const RECEIPT_COUNTER_KEY: &str = "ngo_receipt_counter";
pub const NOTICES_KEY: &str = "ngo_notices";
pub const BILLS_KEY: &str = "ngo_bills";

/// Value reported by an uninitialized counter.
pub const INITIAL_COUNTER: u64 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The entry exists but could not be read back; it is left untouched.
    #[error("failed to read '{key}': {reason}")]
    Read { key: &'static str, reason: String },
    #[error("receipt counter '{key}' is exhausted")]
    CounterOverflow { key: &'static str },
    #[error("failed to write '{key}': {source}")]
    Write {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize '{key}': {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Monotonic source of receipt numbers.
pub trait CounterStore: Send + Sync {
    /// Current value without mutation; `INITIAL_COUNTER` when nothing is stored.
    fn peek(&self) -> u64;

    /// Return the current value and persist `current + 1`.
    ///
    /// Fails rather than restarting from `INITIAL_COUNTER` when a stored value
    /// exists but cannot be read.
    fn take(&self) -> Result<u64, StorageError>;
}

/// Append-only history of generated records, in generation order.
///
/// Appends load the whole list, push, and write the whole list back. Two
/// independent writers would lose updates; callers serialize generation. An
/// append never replaces a list it could not read.
pub trait RecordStore: Send + Sync {
    fn list_notices(&self) -> Vec<Notice>;
    fn list_bills(&self) -> Vec<Bill>;
    fn append_notice(&self, notice: Notice) -> Result<(), StorageError>;
    fn append_bill(&self, bill: Bill) -> Result<(), StorageError>;
}
