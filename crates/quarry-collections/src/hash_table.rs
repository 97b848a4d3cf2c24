//! Chained hash table built from two [`Array`]s.
//!
//! `buckets` owns every key/value pair in insertion order (compacted on
//! removal). `layout` is a derived index with one slot per stored pair:
//! slot `i` holds the storage index of the first pair whose key hashes to
//! `i`, and each pair links to the next pair of its chain by storage
//! index.
//!
//! Any structural change to `buckets` rebuilds `layout` and every chain
//! link from scratch, in O(slots + pairs). Links are indices, so a
//! reallocation of `buckets` never leaves one dangling.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, BuildHasherDefault, DefaultHasher, Hash};

use quarry_alloc::{context_allocator, AllocError, Allocator};

use crate::array::Array;

/// Deterministic hasher used when none is supplied.
pub type DefaultHashBuilder = BuildHasherDefault<DefaultHasher>;

/// One stored entry and its chain link.
#[derive(Clone, Copy, Debug)]
struct Pair<K, V> {
    key: K,
    value: V,
    /// Storage index of the next pair in the same chain.
    next: Option<usize>,
}

/// A hash map with chained buckets and storage-ordered iteration.
///
/// `push` does not look for an existing key: pushing a key twice stores
/// two pairs, and lookups return the earlier one until it is removed.
pub struct HashTable<'a, K, V, S = DefaultHashBuilder> {
    buckets: Array<'a, Pair<K, V>>,
    layout: Array<'a, Option<usize>>,
    hash_builder: S,
}

impl<K, V> HashTable<'static, K, V> {
    /// An empty table drawing from this thread's context allocator.
    pub fn new() -> Self {
        Self::new_in(context_allocator())
    }

    /// An empty table with room for `capacity` pairs, drawing from the
    /// context allocator.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        Self::with_capacity_in(capacity, context_allocator())
    }
}

impl<'a, K, V> HashTable<'a, K, V> {
    /// An empty table drawing from `alloc`. Allocates nothing.
    pub fn new_in(alloc: Allocator<'a>) -> Self {
        Self::with_hasher_in(DefaultHashBuilder::default(), alloc)
    }

    /// An empty table with room for `capacity` pairs.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn with_capacity_in(capacity: usize, alloc: Allocator<'a>) -> Result<Self, AllocError> {
        let mut table = Self::new_in(alloc);
        table.reserve(capacity)?;
        Ok(table)
    }
}

impl<'a, K, V, S> HashTable<'a, K, V, S> {
    /// An empty table hashing keys with `hash_builder`.
    pub fn with_hasher_in(hash_builder: S, alloc: Allocator<'a>) -> Self {
        Self {
            buckets: Array::new_in(alloc),
            layout: Array::new_in(alloc),
            hash_builder,
        }
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether the table holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of hash slots, which always equals [`len`](Self::len).
    pub fn slot_count(&self) -> usize {
        self.layout.len()
    }

    /// The allocator this table draws from.
    pub fn allocator(&self) -> Allocator<'a> {
        self.buckets.allocator()
    }

    /// The hasher in use.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Reserve room for `extra` more pairs in both arrays.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn reserve(&mut self, extra: usize) -> Result<(), AllocError> {
        self.buckets.reserve(extra)?;
        self.layout.reserve(extra)
    }

    /// Pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.buckets.iter().map(|pair| (&pair.key, &pair.value))
    }

    /// Pairs in storage order, values mutable.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> + '_ {
        self.buckets.iter_mut().map(|pair| (&pair.key, &mut pair.value))
    }

    /// Keys in storage order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.buckets.iter().map(|pair| &pair.key)
    }

    /// Values in storage order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.buckets.iter().map(|pair| &pair.value)
    }

    /// The value stored at storage index `index`.
    pub fn value_at(&self, index: usize) -> Option<&V> {
        self.buckets.get(index).map(|pair| &pair.value)
    }

    /// The value stored at storage index `index`, mutably.
    pub fn value_at_mut(&mut self, index: usize) -> Option<&mut V> {
        self.buckets.get_mut(index).map(|pair| &mut pair.value)
    }

    /// Duplicate the table into fresh storage from the same allocator.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn copy(&self) -> Result<Self, AllocError>
    where
        K: Copy,
        V: Copy,
        S: Clone,
    {
        self.copy_in(self.allocator())
    }

    /// Duplicate the table into fresh storage from `alloc`.
    ///
    /// A bitwise copy of both arrays; chain links are indices, so the copy
    /// is immediately consistent.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn copy_in<'b>(&self, alloc: Allocator<'b>) -> Result<HashTable<'b, K, V, S>, AllocError>
    where
        K: Copy,
        V: Copy,
        S: Clone,
    {
        Ok(HashTable {
            buckets: self.buckets.copy_in(alloc)?,
            layout: self.layout.copy_in(alloc)?,
            hash_builder: self.hash_builder.clone(),
        })
    }

    /// Drop every pair, release both arrays and return to the empty state.
    pub fn free(&mut self) {
        self.buckets.free();
        self.layout.free();
    }
}

impl<'a, K, V, S> HashTable<'a, K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Slot a key maps to: `hash(key) % len`.
    ///
    /// The modulus is the number of stored pairs, so every push or
    /// removal remaps keys to new slots.
    ///
    /// # Panics
    ///
    /// Panics if the table is empty.
    pub fn key_to_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        assert!(!self.buckets.is_empty(), "key_to_index on an empty table");
        (self.hash_builder.hash_one(key) % self.buckets.len() as u64) as usize
    }

    /// Append a pair, returning its storage index.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure; the table is unchanged and
    /// `key`/`value` are dropped.
    pub fn push(&mut self, key: K, value: V) -> Result<usize, AllocError> {
        let needed = self.buckets.len() + 1;
        if self.layout.capacity() < needed {
            self.layout.reserve(1)?;
        }
        let index = self.buckets.push(Pair {
            key,
            value,
            next: None,
        })?;
        self.refresh_layout();
        Ok(index)
    }

    /// Append a pair whose value bytes are all zero.
    ///
    /// # Safety
    ///
    /// The all-zero bit pattern must be a valid `V`.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub unsafe fn push_zeroed(&mut self, key: K) -> Result<usize, AllocError> {
        // SAFETY: forwarded caller contract.
        let value = unsafe { std::mem::zeroed() };
        self.push(key, value)
    }

    /// Rebuild every slot head and chain link from `buckets`.
    ///
    /// Chains list their pairs in ascending storage order. Called after
    /// every structural change; callers must have reserved `layout`
    /// capacity for `buckets.len()` slots.
    fn refresh_layout(&mut self) {
        let slots = self.buckets.len();
        self.layout.clear();
        for slot in &mut self.layout.spare_capacity_mut()[..slots] {
            slot.write(None);
        }
        // SAFETY: the first `slots` entries were initialised just above.
        unsafe { self.layout.set_len(slots) };

        // Prepending in reverse storage order yields ascending chains.
        for index in (0..slots).rev() {
            let slot = self.key_to_index(&self.buckets[index].key);
            self.buckets[index].next = self.layout[slot];
            self.layout[slot] = Some(index);
        }
    }

    /// Storage index of the first pair whose key equals `key`.
    pub fn find_index<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.buckets.is_empty() {
            return None;
        }
        let mut cursor = self.layout[self.key_to_index(key)];
        while let Some(index) = cursor {
            let pair = &self.buckets[index];
            if pair.key.borrow() == key {
                return Some(index);
            }
            cursor = pair.next;
        }
        None
    }

    /// The value stored under `key`.
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find_index(key).map(|index| &self.buckets[index].value)
    }

    /// The value stored under `key`, mutably.
    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.find_index(key)?;
        Some(&mut self.buckets[index].value)
    }

    /// Whether `key` is stored.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find_index(key).is_some()
    }

    /// Number of pairs sharing the slot `key` maps to.
    pub fn chain_len<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        if self.buckets.is_empty() {
            return 0;
        }
        let mut cursor = self.layout[self.key_to_index(key)];
        let mut len = 0;
        while let Some(index) = cursor {
            len += 1;
            cursor = self.buckets[index].next;
        }
        len
    }

    /// Remove the first pair stored under `key`, returning its value.
    ///
    /// Scans storage linearly and compacts it, so this is O(n) wherever
    /// the key sits.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let index = self.buckets.iter().position(|pair| pair.key.borrow() == key)?;
        Some(self.remove_by_index(index).1)
    }

    /// Remove the pair at storage index `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove_by_index(&mut self, index: usize) -> (K, V) {
        let pair = self.buckets.remove(index);
        self.refresh_layout();
        (pair.key, pair.value)
    }
}

impl<K, V> Default for HashTable<'static, K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq, V: PartialEq, S> PartialEq for HashTable<'_, K, V, S> {
    /// Equal when both hold the same pairs in the same storage order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashTable<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_alloc::Arena;
    use quarry_test_utils::CollidingKey;

    fn table() -> HashTable<'static, u32, &'static str> {
        HashTable::new_in(Allocator::heap())
    }

    #[test]
    fn empty_table_finds_nothing() {
        let t = table();
        assert_eq!(t.find(&1), None);
        assert!(!t.contains(&1));
        assert_eq!(t.chain_len(&1), 0);
        assert_eq!(t.slot_count(), 0);
    }

    #[test]
    fn push_then_find() {
        let mut t = table();
        assert_eq!(t.push(1, "one").unwrap(), 0);
        assert_eq!(t.push(2, "two").unwrap(), 1);
        assert_eq!(t.push(3, "three").unwrap(), 2);
        assert_eq!(t.find(&1), Some(&"one"));
        assert_eq!(t.find(&2), Some(&"two"));
        assert_eq!(t.find(&3), Some(&"three"));
        assert_eq!(t.find(&4), None);
        assert_eq!(t.slot_count(), 3);
    }

    #[test]
    fn find_mut_updates_value() {
        let mut t = table();
        t.push(7, "seven").unwrap();
        *t.find_mut(&7).unwrap() = "SEVEN";
        assert_eq!(t.find(&7), Some(&"SEVEN"));
    }

    #[test]
    fn duplicate_key_returns_first_pushed() {
        let mut t = table();
        t.push(5, "first").unwrap();
        t.push(5, "second").unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.find(&5), Some(&"first"));
        assert_eq!(t.remove(&5), Some("first"));
        assert_eq!(t.find(&5), Some(&"second"));
    }

    #[test]
    fn remove_keeps_others() {
        let mut t = table();
        for k in 0..10 {
            t.push(k, "v").unwrap();
        }
        assert_eq!(t.remove(&4), Some("v"));
        assert_eq!(t.remove(&4), None);
        assert_eq!(t.find(&4), None);
        for k in (0..10).filter(|&k| k != 4) {
            assert!(t.contains(&k), "lost key {k}");
        }
        assert_eq!(t.slot_count(), 9);
    }

    #[test]
    fn remove_by_index_returns_pair() {
        let mut t = table();
        t.push(1, "a").unwrap();
        t.push(2, "b").unwrap();
        assert_eq!(t.remove_by_index(0), (1, "a"));
        assert_eq!(t.value_at(0), Some(&"b"));
        assert_eq!(t.find(&2), Some(&"b"));
    }

    #[test]
    fn colliding_keys_chain_in_storage_order() {
        let mut t = HashTable::new_in(Allocator::heap());
        for id in 0..6 {
            t.push(CollidingKey(id), id * 10).unwrap();
        }
        assert_eq!(t.chain_len(&CollidingKey(0)), 6);
        for id in 0..6 {
            assert_eq!(t.find(&CollidingKey(id)), Some(&(id * 10)));
        }
        t.remove(&CollidingKey(2));
        assert_eq!(t.chain_len(&CollidingKey(0)), 5);
        assert_eq!(t.find(&CollidingKey(5)), Some(&50));
        assert_eq!(t.find(&CollidingKey(2)), None);
    }

    #[test]
    fn borrowed_lookup() {
        let mut t: HashTable<'_, String, u32> = HashTable::new_in(Allocator::heap());
        t.push("alpha".to_string(), 1).unwrap();
        t.push("beta".to_string(), 2).unwrap();
        assert_eq!(t.find("beta"), Some(&2));
        assert_eq!(t.remove("alpha"), Some(1));
        assert!(!t.contains("alpha"));
    }

    #[test]
    fn iteration_follows_storage_order() {
        let mut t = table();
        for k in [9, 3, 7] {
            t.push(k, "x").unwrap();
        }
        assert_eq!(t.keys().copied().collect::<Vec<_>>(), vec![9, 3, 7]);
        t.remove(&3);
        assert_eq!(t.keys().copied().collect::<Vec<_>>(), vec![9, 7]);
    }

    #[test]
    fn copy_is_consistent_and_independent() {
        let mut t: HashTable<'_, u32, u32> = HashTable::new_in(Allocator::heap());
        for k in 0..20 {
            t.push(k, k * k).unwrap();
        }
        let mut copy = t.copy().unwrap();
        assert_eq!(copy, t);
        for k in 0..20 {
            assert_eq!(copy.find(&k), Some(&(k * k)));
        }
        *copy.find_mut(&3).unwrap() = 0;
        assert_eq!(t.find(&3), Some(&9));
    }

    #[test]
    fn zeroed_value() {
        let mut t: HashTable<'_, u8, u64> = HashTable::new_in(Allocator::heap());
        // SAFETY: zero is a valid u64.
        let index = unsafe { t.push_zeroed(4) }.unwrap();
        assert_eq!(t.value_at(index), Some(&0));
        assert_eq!(t.find(&4), Some(&0));
    }

    #[test]
    fn push_failure_leaves_table_intact() {
        let arena = Arena::new(256).unwrap();
        let mut t: HashTable<'_, u64, u64> = HashTable::new_in(arena.allocator());
        let mut pushed = 0;
        while t.push(pushed, pushed + 1).is_ok() {
            pushed += 1;
        }
        assert_eq!(t.len() as u64, pushed);
        for k in 0..pushed {
            assert_eq!(t.find(&k), Some(&(k + 1)));
        }
    }

    #[test]
    fn with_capacity_uses_context_allocator() {
        let mut t: HashTable<'static, u32, u32> = HashTable::with_capacity(16).unwrap();
        assert!(t.allocator().same_source(&Allocator::heap()));
        t.push(1, 1).unwrap();
        assert_eq!(t.find(&1), Some(&1));

        let _guard = quarry_alloc::push_context_allocator(Allocator::null());
        let err = HashTable::<u32, u32>::with_capacity(16).unwrap_err();
        assert_eq!(err, AllocError::NullAllocator);
        assert!(HashTable::<u32, u32>::with_capacity(0).is_ok());
    }

    #[test]
    fn free_resets() {
        let mut t = table();
        t.push(1, "a").unwrap();
        t.free();
        assert!(t.is_empty());
        assert_eq!(t.find(&1), None);
        t.push(2, "b").unwrap();
        assert_eq!(t.find(&2), Some(&"b"));
    }

    #[test]
    fn debug_is_a_map() {
        let mut t = table();
        t.push(1, "a").unwrap();
        assert_eq!(format!("{t:?}"), r#"{1: "a"}"#);
    }

    mod proptests {
        use super::*;
        use indexmap::IndexMap;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn distinct_keys_round_trip(
                keys in proptest::collection::hash_set(any::<u32>(), 0..200),
                probe in any::<u32>(),
            ) {
                let mut t = HashTable::new_in(Allocator::heap());
                for &k in &keys {
                    t.push(k, k.wrapping_mul(31)).unwrap();
                }
                prop_assert_eq!(t.len(), keys.len());
                for &k in &keys {
                    prop_assert_eq!(t.find(&k), Some(&k.wrapping_mul(31)));
                }
                prop_assert_eq!(t.contains(&probe), keys.contains(&probe));
            }

            #[test]
            fn matches_indexmap_model(
                ops in proptest::collection::vec((any::<bool>(), 0u16..64, any::<i32>()), 1..150),
            ) {
                let mut t = HashTable::new_in(Allocator::heap());
                let mut model: IndexMap<u16, i32> = IndexMap::new();
                for (is_push, key, value) in ops {
                    if is_push {
                        if !model.contains_key(&key) {
                            t.push(key, value).unwrap();
                            model.insert(key, value);
                        }
                    } else {
                        prop_assert_eq!(t.remove(&key), model.shift_remove(&key));
                    }
                }
                prop_assert_eq!(t.len(), model.len());
                let stored: Vec<(u16, i32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
                let expected: Vec<(u16, i32)> = model.iter().map(|(k, v)| (*k, *v)).collect();
                prop_assert_eq!(stored, expected);
                for (k, v) in &model {
                    prop_assert_eq!(t.find(k), Some(v));
                }
            }

            #[test]
            fn every_pair_is_on_exactly_one_chain(keys in proptest::collection::hash_set(any::<u64>(), 1..100)) {
                let mut t = HashTable::new_in(Allocator::heap());
                for &k in &keys {
                    t.push(k, ()).unwrap();
                }
                let mut chained = 0;
                let mut seen_slots = std::collections::HashSet::new();
                for k in &keys {
                    if seen_slots.insert(t.key_to_index(k)) {
                        chained += t.chain_len(k);
                    }
                }
                prop_assert_eq!(chained, keys.len());
            }
        }
    }
}
