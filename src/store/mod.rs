//! Storage module
//!
//! Provides the typed value model and the storage contract commands run
//! against. This module is independent of command handling (loose coupling).

mod bitmap;
mod memory;
mod value;
pub mod sweeper;

#[cfg(test)]
pub(crate) mod mock;

pub use bitmap::{BitMap, WORD_BITS};
pub use memory::MemoryStorage;
pub use value::{Kind, Payload, Value};

use crate::error::StorageError;
use bytes::Bytes;

/// Opaque, binary-safe key
pub type Key = Bytes;

/// What a read-modify-write closure wants done with the key
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Leave the slot as it is (including any in-place edits)
    Keep,

    /// Store a new value, dropping the previous one
    Replace(Value),

    /// Delete the key
    Remove,
}

/// Storage contract
///
/// A backend owns every value it holds. Commands only see owned snapshots
/// (`get`) or a mutable borrow that lives for the duration of one `update`
/// closure, so nothing can outlive a single command execution.
///
/// Expired values must behave as absent in every method, whether or not
/// they have been physically removed yet.
pub trait Storage: Send + Sync {
    /// Snapshot of the live value stored at `key`
    ///
    /// Returns Ok(None) if the key is absent or expired. An Err is a backend
    /// fault and must be propagated by the caller.
    fn get(&self, key: &Key) -> Result<Option<Value>, StorageError>;

    /// Atomic read-modify-write of a single key
    ///
    /// The closure receives the live value (None if absent or expired) and
    /// runs while the backend serializes other writers of the same key.
    fn update(
        &self,
        key: &Key,
        f: &mut dyn FnMut(Option<&mut Value>) -> Mutation,
    ) -> Result<(), StorageError>;

    /// Delete a key, returns true if a live value was removed
    fn delete(&self, key: &Key) -> Result<bool, StorageError>;

    /// All live keys, in no particular order
    fn keys(&self) -> Result<Vec<Key>, StorageError>;

    /// Store `value` at `key`, replacing whatever was there
    fn put(&self, key: Key, value: Value) -> Result<(), StorageError> {
        let mut value = Some(value);
        self.update(&key, &mut |_| match value.take() {
            Some(v) => Mutation::Replace(v),
            None => Mutation::Keep,
        })
    }
}
