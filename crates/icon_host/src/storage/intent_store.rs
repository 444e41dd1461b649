//! Crash-durable intent storage contract and in-process adapters.

use std::{cell::RefCell, rc::Rc};

use thiserror::Error;

use crate::intent::{IntentRecord, SwitchIntent};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Intent store failures surfaced to the coordinator.
pub enum StoreError {
    /// Reading the backing storage failed.
    #[error("failed to read intent store: {0}")]
    Read(String),
    /// Writing the backing storage failed; the write must be treated as not durable.
    #[error("failed to write intent store: {0}")]
    Write(String),
    /// The stored payload could not be decoded.
    #[error("intent store is corrupt: {0}")]
    Corrupt(String),
}

/// Passive key/value persistence for the pending intent and the failure count.
///
/// Every write method is synchronously durable: when it returns `Ok`, a crash immediately after
/// must still observe the written value on the next read. Implementations hold no business logic.
pub trait DurableIntentStore {
    /// Overwrites the single pending-intent slot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] when the intent could not be made durable.
    fn record_pending(&self, intent: &SwitchIntent) -> Result<(), StoreError>;

    /// Reads the pending intent, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be read or decoded.
    fn read_pending(&self) -> Result<Option<SwitchIntent>, StoreError>;

    /// Empties the pending-intent slot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] when the removal could not be made durable.
    fn clear_pending(&self) -> Result<(), StoreError>;

    /// Reads the consecutive apply-failure count.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be read or decoded.
    fn failure_count(&self) -> Result<u32, StoreError>;

    /// Overwrites the consecutive apply-failure count.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] when the count could not be made durable.
    fn set_failure_count(&self, count: u32) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Store that never persists anything, for hosts without durable storage.
pub struct NoopIntentStore;

impl DurableIntentStore for NoopIntentStore {
    fn record_pending(&self, _intent: &SwitchIntent) -> Result<(), StoreError> {
        Ok(())
    }

    fn read_pending(&self) -> Result<Option<SwitchIntent>, StoreError> {
        Ok(None)
    }

    fn clear_pending(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn failure_count(&self) -> Result<u32, StoreError> {
        Ok(0)
    }

    fn set_failure_count(&self, _count: u32) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryIntentState {
    record: IntentRecord,
    fail_writes: bool,
    writes: usize,
    reads: usize,
}

#[derive(Debug, Clone, Default)]
/// In-memory intent store.
///
/// Clones share state, so dropping a coordinator and building a new one over a clone models a
/// process restart. Write failures can be injected with [`MemoryIntentStore::set_fail_writes`].
pub struct MemoryIntentStore {
    inner: Rc<RefCell<MemoryIntentState>>,
}

impl MemoryIntentStore {
    /// Creates a store pre-seeded with `record`.
    pub fn with_record(record: IntentRecord) -> Self {
        let store = Self::default();
        store.inner.borrow_mut().record = record;
        store
    }

    /// Makes every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    /// Returns the number of successful writes.
    pub fn write_count(&self) -> usize {
        self.inner.borrow().writes
    }

    /// Returns the number of reads, successful or not.
    pub fn read_count(&self) -> usize {
        self.inner.borrow().reads
    }

    /// Returns a copy of the stored record.
    pub fn snapshot(&self) -> IntentRecord {
        self.inner.borrow().record.clone()
    }

    fn read<T>(&self, read: impl FnOnce(&IntentRecord) -> T) -> T {
        let mut state = self.inner.borrow_mut();
        state.reads += 1;
        read(&state.record)
    }

    fn write(&self, write: impl FnOnce(&mut IntentRecord)) -> Result<(), StoreError> {
        let mut state = self.inner.borrow_mut();
        if state.fail_writes {
            return Err(StoreError::Write("injected write failure".to_string()));
        }
        write(&mut state.record);
        state.writes += 1;
        Ok(())
    }
}

impl DurableIntentStore for MemoryIntentStore {
    fn record_pending(&self, intent: &SwitchIntent) -> Result<(), StoreError> {
        self.write(|record| record.set_pending(intent))
    }

    fn read_pending(&self) -> Result<Option<SwitchIntent>, StoreError> {
        Ok(self.read(IntentRecord::pending_intent))
    }

    fn clear_pending(&self) -> Result<(), StoreError> {
        self.write(IntentRecord::clear_pending)
    }

    fn failure_count(&self) -> Result<u32, StoreError> {
        Ok(self.read(|record| record.error_count))
    }

    fn set_failure_count(&self, count: u32) -> Result<(), StoreError> {
        self.write(|record| record.error_count = count)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::IconIdentifier;

    fn intent(name: &str) -> SwitchIntent {
        SwitchIntent {
            requested_icon: IconIdentifier::new(name).expect("id"),
            created_at_unix_ms: 7,
        }
    }

    #[test]
    fn memory_store_overwrites_single_slot_and_clears() {
        let store = MemoryIntentStore::default();
        let store_obj: &dyn DurableIntentStore = &store;

        store_obj.record_pending(&intent("red")).expect("record red");
        store_obj.record_pending(&intent("purple")).expect("record purple");
        assert_eq!(
            store_obj.read_pending().expect("read"),
            Some(intent("purple"))
        );

        store_obj.clear_pending().expect("clear");
        assert_eq!(store_obj.read_pending().expect("read"), None);
        assert_eq!(store.write_count(), 3);
    }

    #[test]
    fn memory_store_clones_share_state_across_restart() {
        let store = MemoryIntentStore::default();
        store.record_pending(&intent("purple")).expect("record");
        store.set_failure_count(2).expect("count");

        let restarted = store.clone();
        drop(store);
        assert_eq!(restarted.read_pending().expect("read"), Some(intent("purple")));
        assert_eq!(restarted.failure_count().expect("count"), 2);
    }

    #[test]
    fn memory_store_injected_write_failure_leaves_state_untouched() {
        let store = MemoryIntentStore::default();
        store.set_fail_writes(true);

        let err = store.record_pending(&intent("red")).expect_err("write fails");
        assert!(matches!(err, StoreError::Write(_)));
        assert_eq!(store.set_failure_count(1), Err(err.clone()));
        assert_eq!(store.snapshot(), IntentRecord::default());
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn noop_store_is_empty_and_successful() {
        let store = NoopIntentStore;
        let store_obj: &dyn DurableIntentStore = &store;
        store_obj.record_pending(&intent("red")).expect("record");
        assert_eq!(store_obj.read_pending().expect("read"), None);
        store_obj.set_failure_count(3).expect("count");
        assert_eq!(store_obj.failure_count().expect("count"), 0);
        store_obj.clear_pending().expect("clear");
    }
}
