//! Ordered address index with floor lookup.
//!
//! Every address-keyed table in a module (functions, public symbols, the
//! lines of one function) is an [`AddressRangeIndex`]. Map files are not
//! guaranteed to be sorted, so entries go into a `BTreeMap` as they are
//! parsed instead of being appended and sorted afterwards.

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::types::Address;

/// Entries keyed by start address.
///
/// The index only knows start addresses. Whether a floor hit actually covers
/// the queried address depends on the entry's size, which is the caller's
/// business.
#[derive(Debug, Clone)]
pub struct AddressRangeIndex<T>
{
    entries: BTreeMap<Address, T>,
}

impl<T> Default for AddressRangeIndex<T>
{
    fn default() -> Self
    {
        Self { entries: BTreeMap::new() }
    }
}

impl<T> AddressRangeIndex<T>
{
    /// Create an empty index.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Insert `value` at `address`.
    ///
    /// An existing entry at the same address is replaced and returned, so the
    /// last definition in a map file wins.
    pub fn insert(&mut self, address: Address, value: T) -> Option<T>
    {
        self.entries.insert(address, value)
    }

    /// Entry with the greatest start address `<= address`.
    ///
    /// Returns `None` if the index is empty or every entry starts above
    /// `address`.
    pub fn retrieve(&self, address: Address) -> Option<(Address, &T)>
    {
        self.entries
            .range(..=address)
            .next_back()
            .map(|(start, value)| (*start, value))
    }

    /// Remove every entry.
    pub fn clear(&mut self)
    {
        self.entries.clear();
    }

    /// Number of entries.
    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    /// Returns `true` if the index holds no entries.
    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }

    /// Entries in ascending address order.
    pub fn iter(&self) -> btree_map::Iter<'_, Address, T>
    {
        self.entries.iter()
    }
}
