//! Decoded bencode value tree

use std::borrow::Cow;

/// A decoded bencode term.
///
/// Byte strings are kept as raw bytes; torrent fields such as `pieces` are
/// binary digests, not text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BencodeValue {
    Integer(i64),
    ByteString(Vec<u8>),
    List(Vec<BencodeValue>),
    Map(BencodeMap),
}

impl BencodeValue {
    /// Returns the integer payload, if this is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            BencodeValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the raw bytes, if this is a byte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            BencodeValue::ByteString(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the elements, if this is a list.
    pub fn as_list(&self) -> Option<&[BencodeValue]> {
        match self {
            BencodeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the map, if this is a map.
    pub fn as_map(&self) -> Option<&BencodeMap> {
        match self {
            BencodeValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Short variant name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            BencodeValue::Integer(_) => "integer",
            BencodeValue::ByteString(_) => "byte string",
            BencodeValue::List(_) => "list",
            BencodeValue::Map(_) => "map",
        }
    }

    /// Best-effort text rendering of a byte string for display.
    pub fn to_text_lossy(&self) -> Option<Cow<'_, str>> {
        self.as_bytes().map(String::from_utf8_lossy)
    }
}

/// Ordered map of byte-string keys to values.
///
/// Entries are kept in the order they were read or inserted. Re-encoding
/// reproduces that order, which keeps the info-hash stable for files whose
/// keys are not sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BencodeMap {
    entries: Vec<(Vec<u8>, BencodeValue)>,
}

impl BencodeMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any existing entry for the same key in place.
    ///
    /// Returns the replaced value, if there was one.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: BencodeValue) -> Option<BencodeValue> {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Appends an entry whose key the caller has already checked for uniqueness.
    pub(crate) fn push_unique(&mut self, key: Vec<u8>, value: BencodeValue) {
        self.entries.push((key, value));
    }

    /// Looks up a value by key.
    pub fn get(&self, key: &[u8]) -> Option<&BencodeValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.as_slice() == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Iterates entries in stored order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &BencodeValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_slice(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
