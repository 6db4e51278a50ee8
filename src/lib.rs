//! avl-ordered-map: two single-threaded in-memory containers.
//!
//! - [`AvlTree`]: a height-balanced binary search tree of distinct values
//!   with pre-order, in-order, post-order and breadth-first cursors.
//! - [`OrderedHashMap`]: a separate-chaining hash map that iterates in
//!   first-insertion order and doubles its bucket array when a chain
//!   fills up.
//!
//! Internal Design:
//!
//! AvlTree
//! - Nodes are owned through `Option<Box<Node<T>>>` links. Every height is
//!   cached (leaf = 0, empty = -1) and every structural change rebalances
//!   the touched path by taking the subtree out of its link, rotating,
//!   and writing the new root back.
//! - Removal of a node with two children moves its in-order predecessor's
//!   value into place and detaches the predecessor from the left subtree.
//! - Queries that may have no answer (`min_value`, `max_value`,
//!   `successor`, `predecessor`) return `Option`; there is no default
//!   sentinel.
//!
//! Traversal cursors
//! - A [`Cursor`] keeps its own stack (pre/in-order), stack of
//!   `(node, visited)` frames (post-order) or queue (breadth-first) of
//!   borrowed nodes. Cloning copies that frontier, so clones advance
//!   independently.
//! - Cursors compare by the identity of the node under them; `end()` is
//!   the cursor with no node.
//!
//! OrderedHashMap
//! - Nodes live in a `slotmap::SlotMap` and are linked by arena keys:
//!   `next_bucket` threads the bucket chain, `prev_ordered`/`next_ordered`
//!   thread the order chain. No `unsafe`, no reference counting.
//! - Each node stores its full `u64` hash. Lookups compare the stored hash
//!   before `K: Eq`, and rehashing never invokes `K: Hash`.
//! - Inserting a new key into a chain of `MAX_COLLISIONS` nodes doubles
//!   the capacity and retries. Rehashing rethreads buckets while walking
//!   the order chain, so insertion order survives unchanged.
//! - Keys whose full hashes are identical cannot be split by growing; they
//!   chain past the limit rather than doubling without bound.
//!
//! Error handling
//! - [`LookupError::KeyNotFound`] from [`OrderedHashMap::at`];
//!   [`OrderedHashMap::get_or_insert_default`] inserts instead.
//! - Duplicate tree inserts and removals of absent values report `false`.
//!
//! Notes and non-goals
//! - No internal synchronization; sharing across threads is the caller's
//!   job. Both containers are `Send`/`Sync` when their contents are.
//! - No serialization, no custom allocators.
//! - Rehash events are reported through the `log` facade at `debug`.

pub mod avl_tree;
pub mod ordered_hash_map;
mod ordered_hash_map_proptest;
pub mod traversal;

// Public surface
pub use avl_tree::AvlTree;
pub use ordered_hash_map::{Iter, LookupError, OrderedHashMap, DEFAULT_CAPACITY, MAX_COLLISIONS};
pub use traversal::{Cursor, Traversal};
