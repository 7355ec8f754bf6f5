//! In-memory storage implementation

use super::value::Value;
use super::{Key, Mutation, Storage};
use crate::config::Config;
use crate::error::StorageError;
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hash, Hasher};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

/// Type alias for our hash map with SipHasher
type ShardMap = HashMap<Key, Value, BuildHasherDefault<SipHasher13>>;

/// In-memory storage backend
///
/// Keys are spread over a fixed number of lock shards by SipHash-1-3. Writers of the same
/// key are serialized by the shard's write lock, readers get a consistent
/// clone under the read lock. Expiration is lazy: reads ignore expired
/// values, writes purge them, and `purge_expired` can sweep proactively.
pub struct MemoryStorage {
    shards: Vec<RwLock<ShardMap>>,
}

fn new_shard(capacity: usize) -> ShardMap {
    ShardMap::with_capacity_and_hasher(capacity, BuildHasherDefault::default())
}

impl MemoryStorage {
    /// Create a single-shard storage with default capacity
    pub fn new() -> Self {
        Self::with_shards(1, 1024)
    }

    /// Create a storage with `num_shards` shards of `capacity` slots each
    ///
    /// A shard count of zero is raised to one.
    pub fn with_shards(num_shards: usize, capacity: usize) -> Self {
        let shards = (0..num_shards.max(1))
            .map(|_| RwLock::new(new_shard(capacity)))
            .collect();

        MemoryStorage { shards }
    }

    /// Create a storage sized from the configuration
    pub fn from_config(config: &Config) -> Self {
        Self::with_shards(config.shards, config.initial_capacity)
    }

    /// Create a single-shard storage pre-filled with `values`
    ///
    /// Values are inserted as given, expired ones included.
    pub fn from_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<Key>,
    {
        let mut map = new_shard(1024);
        map.extend(values.into_iter().map(|(k, v)| (k.into(), v)));

        MemoryStorage {
            shards: vec![RwLock::new(map)],
        }
    }

    fn shard_index(&self, key: &Key) -> usize {
        let mut hasher = SipHasher13::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    fn shard_of(&self, key: &Key) -> &RwLock<ShardMap> {
        &self.shards[self.shard_index(key)]
    }

    fn read(shard: &RwLock<ShardMap>) -> Result<RwLockReadGuard<'_, ShardMap>, StorageError> {
        shard.read().map_err(|e| StorageError::Poisoned(e.to_string()))
    }

    fn write(shard: &RwLock<ShardMap>) -> Result<RwLockWriteGuard<'_, ShardMap>, StorageError> {
        shard.write().map_err(|e| StorageError::Poisoned(e.to_string()))
    }

    /// Number of live keys
    pub fn len(&self) -> Result<usize, StorageError> {
        let now = SystemTime::now();
        let mut total = 0;
        for shard in &self.shards {
            total += Self::read(shard)?
                .values()
                .filter(|v| !v.is_expired_at(now))
                .count();
        }
        Ok(total)
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// Remove expired values from every shard, returns how many were dropped
    pub fn purge_expired(&self) -> Result<usize, StorageError> {
        let now = SystemTime::now();
        let mut removed = 0;
        for shard in &self.shards {
            let mut map = Self::write(shard)?;
            let before = map.len();
            map.retain(|_, v| !v.is_expired_at(now));
            removed += before - map.len();
        }
        Ok(removed)
    }

    /// Approximate memory usage of live values in bytes
    pub fn memory_usage(&self) -> Result<usize, StorageError> {
        let now = SystemTime::now();
        let mut total = 0;
        for shard in &self.shards {
            total += Self::read(shard)?
                .iter()
                .filter(|(_, v)| !v.is_expired_at(now))
                .map(|(k, v)| k.len() + v.memory_usage())
                .sum::<usize>();
        }
        Ok(total)
    }

    /// Remove all keys
    pub fn clear(&self) -> Result<(), StorageError> {
        for shard in &self.shards {
            Self::write(shard)?.clear();
        }
        Ok(())
    }

    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &Key) -> Result<Option<Value>, StorageError> {
        let map = Self::read(self.shard_of(key))?;
        let now = SystemTime::now();

        Ok(map.get(key).filter(|v| !v.is_expired_at(now)).cloned())
    }

    fn update(
        &self,
        key: &Key,
        f: &mut dyn FnMut(Option<&mut Value>) -> Mutation,
    ) -> Result<(), StorageError> {
        let mut map = Self::write(self.shard_of(key))?;

        let expired = map
            .get(key)
            .map_or(false, |v| v.is_expired_at(SystemTime::now()));
        if expired {
            map.remove(key);
        }

        match f(map.get_mut(key)) {
            Mutation::Keep => {}
            Mutation::Replace(value) => {
                map.insert(key.clone(), value);
            }
            Mutation::Remove => {
                map.remove(key);
            }
        }

        Ok(())
    }

    fn delete(&self, key: &Key) -> Result<bool, StorageError> {
        let mut map = Self::write(self.shard_of(key))?;
        let now = SystemTime::now();

        Ok(map.remove(key).map_or(false, |v| !v.is_expired_at(now)))
    }

    fn keys(&self) -> Result<Vec<Key>, StorageError> {
        let now = SystemTime::now();
        let mut keys = Vec::new();
        for shard in &self.shards {
            keys.extend(
                Self::read(shard)?
                    .iter()
                    .filter(|(_, v)| !v.is_expired_at(now))
                    .map(|(k, _)| k.clone()),
            );
        }
        Ok(keys)
    }
}
