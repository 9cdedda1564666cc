use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use super::{
    CounterStore, RecordStore, StorageError, BILLS_KEY, INITIAL_COUNTER, NOTICES_KEY,
    RECEIPT_COUNTER_KEY,
};
use crate::models::{Bill, Notice};

/// File-backed store keeping each entry as its own file under one directory.
///
/// The counter is plain decimal text; the two histories are JSON arrays.
pub struct JsonFileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn counter_path(&self) -> PathBuf {
        self.dir.join(RECEIPT_COUNTER_KEY)
    }

    fn list_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Stored counter value; `None` when no counter has been written yet.
    fn load_counter(&self) -> Result<Option<u64>, StorageError> {
        let read_err = |reason: String| StorageError::Read {
            key: RECEIPT_COUNTER_KEY,
            reason,
        };

        let raw = match fs::read_to_string(self.counter_path()) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(read_err(e.to_string())),
        };

        raw.trim()
            .trim_matches('"')
            .parse::<u64>()
            .map(Some)
            .map_err(|e| read_err(format!("'{}' is not a counter value ({})", raw.trim(), e)))
    }

    /// Stored list; a missing entry is an empty list.
    fn load_list<T: DeserializeOwned>(&self, key: &'static str) -> Result<Vec<T>, StorageError> {
        let data = match fs::read(self.list_path(key)) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::Read {
                    key,
                    reason: e.to_string(),
                })
            }
        };

        serde_json::from_slice(&data).map_err(|e| StorageError::Read {
            key,
            reason: e.to_string(),
        })
    }

    /// List for display; anything unreadable shows as empty.
    fn read_list<T: DeserializeOwned>(&self, key: &'static str) -> Vec<T> {
        self.load_list(key).unwrap_or_else(|e| {
            log::warn!("Showing '{}' as empty: {}", key, e);
            Vec::new()
        })
    }

    fn write_list<T: Serialize>(&self, key: &'static str, items: &[T]) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(items)
            .map_err(|source| StorageError::Serialize { key, source })?;
        self.write_atomic(key, &self.list_path(key), &data)
    }

    /// Write through a sibling temp file and rename it over the target.
    fn write_atomic(&self, key: &'static str, path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write { key, source };

        fs::create_dir_all(&self.dir).map_err(write_err)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(data).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

impl CounterStore for JsonFileStore {
    fn peek(&self) -> u64 {
        let _guard = self.lock.lock();
        match self.load_counter() {
            Ok(value) => value.unwrap_or(INITIAL_COUNTER),
            Err(e) => {
                log::warn!("Reporting receipt counter as {}: {}", INITIAL_COUNTER, e);
                INITIAL_COUNTER
            }
        }
    }

    fn take(&self) -> Result<u64, StorageError> {
        let _guard = self.lock.lock();
        let current = self.load_counter()?.unwrap_or(INITIAL_COUNTER);
        let next = current
            .checked_add(1)
            .ok_or(StorageError::CounterOverflow {
                key: RECEIPT_COUNTER_KEY,
            })?;
        self.write_atomic(
            RECEIPT_COUNTER_KEY,
            &self.counter_path(),
            next.to_string().as_bytes(),
        )?;
        log::debug!("Receipt counter advanced {} -> {}", current, next);
        Ok(current)
    }
}

impl RecordStore for JsonFileStore {
    fn list_notices(&self) -> Vec<Notice> {
        let _guard = self.lock.lock();
        self.read_list(NOTICES_KEY)
    }

    fn list_bills(&self) -> Vec<Bill> {
        let _guard = self.lock.lock();
        self.read_list(BILLS_KEY)
    }

    fn append_notice(&self, notice: Notice) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut notices: Vec<Notice> = self.load_list(NOTICES_KEY)?;
        notices.push(notice);
        self.write_list(NOTICES_KEY, &notices)?;
        log::info!("Notice history persisted ({} entries)", notices.len());
        Ok(())
    }

    fn append_bill(&self, bill: Bill) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut bills: Vec<Bill> = self.load_list(BILLS_KEY)?;
        bills.push(bill);
        self.write_list(BILLS_KEY, &bills)?;
        log::info!("Bill history persisted ({} entries)", bills.len());
        Ok(())
    }
}
