//! OrderedHashMap: separate chaining with a global insertion-order chain.
//!
//! Nodes live in a `SlotMap` arena. Each node sits in exactly one bucket
//! chain (singly linked through `next_bucket`) and once in the order
//! chain (doubly linked through `prev_ordered`/`next_ordered`). The full
//! hash is stored per node, so growing the bucket array never calls back
//! into `K: Hash`.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;
use slotmap::{DefaultKey, SlotMap};

/// Bucket count used by [`OrderedHashMap::new`].
pub const DEFAULT_CAPACITY: usize = 5;

/// A bucket chain holding this many nodes is full: the next new key that
/// lands there triggers a rehash.
pub const MAX_COLLISIONS: usize = 3;

#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("key not found")]
    KeyNotFound,
}

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    hash: u64,
    next_bucket: Option<DefaultKey>,
    prev_ordered: Option<DefaultKey>,
    next_ordered: Option<DefaultKey>,
}

pub struct OrderedHashMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    buckets: Vec<Option<DefaultKey>>,
    slots: SlotMap<DefaultKey, Node<K, V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<K, V> OrderedHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V, S> Default for OrderedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

/// Iterator over entries in insertion order.
pub struct Iter<'a, K, V> {
    slots: &'a SlotMap<DefaultKey, Node<K, V>>,
    current: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    /// Entry under the iterator without advancing.
    pub fn peek(&self) -> Option<(&'a K, &'a V)> {
        let node = self.slots.get(self.current?)?;
        Some((&node.key, &node.value))
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.slots.get(self.current?)?;
        self.current = node.next_ordered;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            current: self.current,
            remaining: self.remaining,
        }
    }
}

// Position identity only, like comparing raw node pointers.
impl<'a, K, V> PartialEq for Iter<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.current == other.current
    }
}

impl<'a, K, V> Eq for Iter<'a, K, V> {}

impl<K, V, S> OrderedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    /// A zero capacity is bumped to one bucket.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            buckets: vec![None; capacity.max(1)],
            slots: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    #[inline]
    fn bucket_index(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    fn find_slot<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let mut cursor = self.buckets[self.bucket_index(hash)];
        while let Some(k) = cursor {
            let node = self.slots.get(k)?;
            if node.hash == hash && node.key.borrow() == q {
                return Some(k);
            }
            cursor = node.next_bucket;
        }
        None
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_slot(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.find_slot(q)?;
        self.slots.get(k).map(|n| &n.value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.find_slot(q)?;
        self.slots.get_mut(k).map(|n| &mut n.value)
    }

    /// Checked access: fails with [`LookupError::KeyNotFound`] instead of
    /// inserting.
    pub fn at<Q>(&mut self, q: &Q) -> Result<&mut V, LookupError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_mut(q).ok_or(LookupError::KeyNotFound)
    }

    /// Insert or overwrite. An overwrite keeps the key's original position
    /// in iteration order and returns the previous value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.insert_full(key, value).1
    }

    pub fn insert_pair(&mut self, (key, value): (K, V)) -> Option<V> {
        self.insert(key, value)
    }

    /// Indexing with auto-vivification: returns the stored value, inserting
    /// `V::default()` first when the key is absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let k = match self.find_slot(&key) {
            Some(k) => k,
            None => self.insert_full(key, V::default()).0,
        };
        &mut self
            .slots
            .get_mut(k)
            .expect("entry must exist immediately after lookup or insert")
            .value
    }

    fn insert_full(&mut self, key: K, value: V) -> (DefaultKey, Option<V>) {
        let hash = self.make_hash(&key);
        loop {
            let idx = self.bucket_index(hash);
            let mut chain_len = 0;
            // Some node in the chain could end up in another bucket after
            // growing.
            let mut separable = false;
            let mut cursor = self.buckets[idx];
            while let Some(k) = cursor {
                let Some(node) = self.slots.get_mut(k) else {
                    break;
                };
                if node.hash == hash && node.key == key {
                    let old = core::mem::replace(&mut node.value, value);
                    return (k, Some(old));
                }
                separable |= node.hash != hash;
                chain_len += 1;
                cursor = node.next_bucket;
            }

            if chain_len >= MAX_COLLISIONS {
                if separable {
                    self.rehash();
                    continue;
                }
                log::trace!(
                    "bucket {} holds {} entries with identical hashes; chaining past the limit",
                    idx,
                    chain_len
                );
            }

            let k = self.slots.insert(Node {
                key,
                value,
                hash,
                next_bucket: self.buckets[idx],
                prev_ordered: self.tail,
                next_ordered: None,
            });
            self.buckets[idx] = Some(k);
            match self.tail.and_then(|t| self.slots.get_mut(t)) {
                Some(tail) => tail.next_ordered = Some(k),
                None => self.head = Some(k),
            }
            self.tail = Some(k);
            return (k, None);
        }
    }

    /// Double the bucket array and rethread every node by walking the
    /// order chain, which itself is left untouched.
    fn rehash(&mut self) {
        let old_capacity = self.buckets.len();
        let new_capacity = old_capacity.saturating_mul(2);
        log::debug!(
            "rehashing: capacity {} -> {} ({} entries)",
            old_capacity,
            new_capacity,
            self.slots.len()
        );

        let mut buckets = vec![None; new_capacity];
        let mut cursor = self.head;
        while let Some(k) = cursor {
            let Some(node) = self.slots.get_mut(k) else {
                break;
            };
            let idx = (node.hash % new_capacity as u64) as usize;
            node.next_bucket = buckets[idx];
            buckets[idx] = Some(k);
            cursor = node.next_ordered;
        }
        self.buckets = buckets;
    }

    /// Remove `q`, returning whether it was present.
    pub fn remove<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).is_some()
    }

    /// Remove `q` and hand back the owned pair. The order chain closes the
    /// gap; the remaining entries keep their relative order.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let idx = self.bucket_index(hash);
        let mut prev = None;
        let mut cursor = self.buckets[idx];
        while let Some(k) = cursor {
            let node = self.slots.get(k)?;
            if node.hash == hash && node.key.borrow() == q {
                break;
            }
            prev = Some(k);
            cursor = node.next_bucket;
        }
        let node = self.slots.remove(cursor?)?;

        // Unlink from the bucket chain.
        match prev.and_then(|p| self.slots.get_mut(p)) {
            Some(p) => p.next_bucket = node.next_bucket,
            None => self.buckets[idx] = node.next_bucket,
        }
        // Unlink from the order chain.
        match node.prev_ordered.and_then(|p| self.slots.get_mut(p)) {
            Some(p) => p.next_ordered = node.next_ordered,
            None => self.head = node.next_ordered,
        }
        match node.next_ordered.and_then(|n| self.slots.get_mut(n)) {
            Some(n) => n.prev_ordered = node.prev_ordered,
            None => self.tail = node.prev_ordered,
        }

        Some((node.key, node.value))
    }

    /// Drop every entry; the bucket count is kept.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.buckets.iter_mut().for_each(|b| *b = None);
        self.head = None;
        self.tail = None;
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            current: self.head,
            remaining: self.slots.len(),
        }
    }

    pub fn begin(&self) -> Iter<'_, K, V> {
        self.iter()
    }

    /// Past-the-end iterator; `begin() == end()` on an empty map.
    pub fn end(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            current: None,
            remaining: 0,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// Every key, in first-insertion order.
    pub fn all_keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.keys().cloned().collect()
    }

    /// Every `(key, value)` pair, in first-insertion order.
    pub fn all_elements(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    #[cfg(test)]
    pub(crate) fn max_chain_len(&self) -> usize {
        self.buckets
            .iter()
            .map(|&head| {
                let mut n = 0;
                let mut cursor = head;
                while let Some(k) = cursor {
                    n += 1;
                    cursor = self.slots[k].next_bucket;
                }
                n
            })
            .max()
            .unwrap_or(0)
    }

    /// Walks both chains and checks every link agrees.
    #[cfg(test)]
    pub(crate) fn assert_links_consistent(&self) {
        let mut seen = 0;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(k) = cursor {
            let node = &self.slots[k];
            assert_eq!(node.prev_ordered, prev, "order back-link mismatch");
            prev = Some(k);
            cursor = node.next_ordered;
            seen += 1;
        }
        assert_eq!(self.tail, prev, "tail must be last in order chain");
        assert_eq!(seen, self.slots.len(), "order chain must cover all nodes");

        let mut in_buckets = 0;
        for (idx, &head) in self.buckets.iter().enumerate() {
            let mut cursor = head;
            while let Some(k) = cursor {
                let node = &self.slots[k];
                assert_eq!(self.bucket_index(node.hash), idx, "node in wrong bucket");
                in_buckets += 1;
                cursor = node.next_bucket;
            }
        }
        assert_eq!(in_buckets, self.slots.len(), "bucket chains must cover all nodes");
    }
}

impl<'a, K, V, S> IntoIterator for &'a OrderedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> fmt::Debug for OrderedHashMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for OrderedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for pair in iter {
            self.insert_pair(pair);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for OrderedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::default();
        m.extend(iter);
        m
    }
}
