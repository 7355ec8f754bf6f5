//! Storage test double
//!
//! Returns canned responses and counts calls, so tests can check both
//! failure propagation and that validation happens before storage access.

use super::{Key, Mutation, Storage, Value};
use crate::error::StorageError;
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) struct MockStorage {
    response: Result<Option<Value>, StorageError>,
    calls: AtomicUsize,
}

impl MockStorage {
    /// Every key is absent
    pub(crate) fn new() -> Self {
        Self::returning(Ok(None))
    }

    /// Every method answers with `response` (errors included)
    pub(crate) fn returning(response: Result<Option<Value>, StorageError>) -> Self {
        MockStorage {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    /// Total number of storage calls so far
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Storage for MockStorage {
    fn get(&self, _key: &Key) -> Result<Option<Value>, StorageError> {
        self.record();
        self.response.clone()
    }

    fn update(
        &self,
        _key: &Key,
        f: &mut dyn FnMut(Option<&mut Value>) -> Mutation,
    ) -> Result<(), StorageError> {
        self.record();
        let mut current = self.response.clone()?;
        f(current.as_mut());
        Ok(())
    }

    fn delete(&self, _key: &Key) -> Result<bool, StorageError> {
        self.record();
        self.response.clone().map(|v| v.is_some())
    }

    fn keys(&self) -> Result<Vec<Key>, StorageError> {
        self.record();
        self.response.clone().map(|_| Vec::new())
    }
}
