//! Value types for the key-value store

use super::bitmap::BitMap;
use bytes::Bytes;
use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, SystemTime};

/// Discriminator of a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    BitMap,
    List,
    Map,
}

impl Kind {
    /// Lowercase name, as reported by TYPE
    pub fn name(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::BitMap => "bitmap",
            Kind::List => "list",
            Kind::Map => "map",
        }
    }
}

/// Kind-specific data of a value
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// String value (binary-safe)
    String(Bytes),

    /// Bitmap of 64-bit words
    BitMap(BitMap),

    /// List of values (ordered)
    List(VecDeque<Bytes>),

    /// Field -> value map, iterated in field order
    Map(BTreeMap<Bytes, Bytes>),
}

/// A typed value with an optional absolute expiration time
///
/// The payload is only reachable through kind-specific accessors, so the
/// kind of a value never changes once it is created. Commands that need a
/// different kind replace the whole value.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    payload: Payload,

    /// None means the value never expires
    expire_at: Option<SystemTime>,
}

impl Value {
    fn from_payload(payload: Payload) -> Self {
        Value {
            payload,
            expire_at: None,
        }
    }

    /// Create a string value
    pub fn string(bytes: impl Into<Bytes>) -> Self {
        Self::from_payload(Payload::String(bytes.into()))
    }

    /// Create a bitmap value from raw words
    pub fn bitmap(words: Vec<u64>) -> Self {
        Self::from_payload(Payload::BitMap(BitMap::from_words(words)))
    }

    /// Create an empty bitmap
    pub fn empty_bitmap() -> Self {
        Self::from_payload(Payload::BitMap(BitMap::new()))
    }

    /// Create a list value
    pub fn list<I, B>(items: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self::from_payload(Payload::List(items.into_iter().map(Into::into).collect()))
    }

    /// Create an empty list
    pub fn empty_list() -> Self {
        Self::from_payload(Payload::List(VecDeque::new()))
    }

    /// Create a map value
    pub fn map<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Bytes>,
        V: Into<Bytes>,
    {
        Self::from_payload(Payload::Map(
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }

    /// Create an empty map
    pub fn empty_map() -> Self {
        Self::from_payload(Payload::Map(BTreeMap::new()))
    }

    /// Builder-style expiration
    pub fn with_ttl(mut self, expire_at: SystemTime) -> Self {
        self.expire_at = Some(expire_at);
        self
    }

    pub fn kind(&self) -> Kind {
        match self.payload {
            Payload::String(_) => Kind::String,
            Payload::BitMap(_) => Kind::BitMap,
            Payload::List(_) => Kind::List,
            Payload::Map(_) => Kind::Map,
        }
    }

    /// Read-only view of the payload
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Absolute expiration time, if any
    pub fn ttl(&self) -> Option<SystemTime> {
        self.expire_at
    }

    /// Set the absolute expiration time
    pub fn set_ttl(&mut self, expire_at: SystemTime) {
        self.expire_at = Some(expire_at);
    }

    /// Remove expiration, returns true if there was one
    pub fn clear_ttl(&mut self) -> bool {
        self.expire_at.take().is_some()
    }

    /// Check if the value has expired at `now`
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        matches!(self.expire_at, Some(at) if at <= now)
    }

    /// Check if the value has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(SystemTime::now())
    }

    /// Remaining TTL in whole seconds, rounded up
    ///
    /// Returns -1 when the value never expires and 0 once it has expired.
    pub fn ttl_seconds(&self, now: SystemTime) -> i64 {
        match self.expire_at {
            Some(at) => {
                let left = at.duration_since(now).unwrap_or(Duration::ZERO);
                let secs = left.as_secs() + u64::from(left.subsec_nanos() > 0);
                i64::try_from(secs).unwrap_or(i64::MAX)
            }
            None => -1,
        }
    }

    /// Try to get as string bytes
    pub fn as_string(&self) -> Option<&Bytes> {
        match &self.payload {
            Payload::String(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get as mutable string bytes
    pub fn as_string_mut(&mut self) -> Option<&mut Bytes> {
        match &mut self.payload {
            Payload::String(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get as bitmap
    pub fn as_bitmap(&self) -> Option<&BitMap> {
        match &self.payload {
            Payload::BitMap(bm) => Some(bm),
            _ => None,
        }
    }

    /// Try to get as mutable bitmap
    pub fn as_bitmap_mut(&mut self) -> Option<&mut BitMap> {
        match &mut self.payload {
            Payload::BitMap(bm) => Some(bm),
            _ => None,
        }
    }

    /// Try to get as list reference
    pub fn as_list(&self) -> Option<&VecDeque<Bytes>> {
        match &self.payload {
            Payload::List(list) => Some(list),
            _ => None,
        }
    }

    /// Try to get as mutable list
    pub fn as_list_mut(&mut self) -> Option<&mut VecDeque<Bytes>> {
        match &mut self.payload {
            Payload::List(list) => Some(list),
            _ => None,
        }
    }

    /// Try to get as map reference
    pub fn as_map(&self) -> Option<&BTreeMap<Bytes, Bytes>> {
        match &self.payload {
            Payload::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Try to get as mutable map
    pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<Bytes, Bytes>> {
        match &mut self.payload {
            Payload::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Calculate approximate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let payload = match &self.payload {
            Payload::String(bytes) => bytes.len(),
            Payload::BitMap(bm) => bm.memory_usage(),
            Payload::List(list) => {
                let items_size: usize = list.iter().map(|b| b.len()).sum();
                items_size + std::mem::size_of::<VecDeque<Bytes>>()
            }
            Payload::Map(map) => {
                let items_size: usize = map.iter().map(|(k, v)| k.len() + v.len()).sum();
                items_size + std::mem::size_of::<BTreeMap<Bytes, Bytes>>()
            }
        };
        payload + std::mem::size_of::<Option<SystemTime>>()
    }
}
