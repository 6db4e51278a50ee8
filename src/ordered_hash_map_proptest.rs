#![cfg(test)]

// Property tests for OrderedHashMap kept inside the crate so they can use
// the test-only chain inspection helpers.

use crate::ordered_hash_map::{LookupError, OrderedHashMap, MAX_COLLISIONS};
use proptest::prelude::*;
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    At(usize),
    Vivify(usize),
    Mutate(usize, i32),
    Contains(String),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::At),
            idx.clone().prop_map(OpI::Vivify),
            (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// Reference model: an association list in first-insertion order.
#[derive(Default)]
struct Model(Vec<(String, i32)>);

impl Model {
    fn position(&self, k: &str) -> Option<usize> {
        self.0.iter().position(|(mk, _)| mk == k)
    }
    fn insert(&mut self, k: String, v: i32) -> Option<i32> {
        match self.position(&k) {
            Some(i) => Some(core::mem::replace(&mut self.0[i].1, v)),
            None => {
                self.0.push((k, v));
                None
            }
        }
    }
    fn remove(&mut self, k: &str) -> Option<i32> {
        self.position(k).map(|i| self.0.remove(i).1)
    }
    fn get_mut(&mut self, k: &str) -> Option<&mut i32> {
        self.position(k).map(move |i| &mut self.0[i].1)
    }
}

fn run<S: BuildHasher>(
    mut sut: OrderedHashMap<String, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
    bound_chains: bool,
) -> Result<(), TestCaseError> {
    let mut model = Model::default();
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i].clone();
                let cap = sut.capacity();
                prop_assert_eq!(sut.insert(k.clone(), v), model.insert(k, v));
                prop_assert!(sut.capacity() == cap || sut.capacity() >= cap * 2);
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let expected = model.remove(k);
                prop_assert_eq!(sut.remove(k.as_str()), expected.is_some());
            }
            OpI::At(i) => {
                let k = &pool[i];
                match model.get_mut(k) {
                    Some(mv) => prop_assert_eq!(sut.at(k.as_str()).copied(), Ok(*mv)),
                    None => {
                        prop_assert!(!sut.contains_key(k.as_str()));
                        prop_assert_eq!(sut.at(k.as_str()), Err(LookupError::KeyNotFound));
                    }
                }
            }
            OpI::Vivify(i) => {
                let k = pool[i].clone();
                let expected = match model.get_mut(&k) {
                    Some(mv) => *mv,
                    None => {
                        model.insert(k.clone(), 0);
                        0
                    }
                };
                prop_assert_eq!(*sut.get_or_insert_default(k.clone()), expected);
                prop_assert!(sut.contains_key(&k));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                if let Some(mv) = model.get_mut(k) {
                    let vr = sut.get_mut(k.as_str());
                    prop_assert!(vr.is_some(), "present key must resolve");
                    if let Some(vr) = vr {
                        *vr = vr.wrapping_add(d);
                        *mv = mv.wrapping_add(d);
                    }
                } else {
                    prop_assert!(sut.get_mut(k.as_str()).is_none());
                }
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.position(&s).is_some());
            }
            OpI::Iterate => {
                let pairs: Vec<(String, i32)> =
                    sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(&pairs, &model.0);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.0.len());
        prop_assert_eq!(sut.is_empty(), model.0.is_empty());
        prop_assert_eq!(&sut.all_elements(), &model.0);
        if bound_chains {
            prop_assert!(sut.max_chain_len() <= MAX_COLLISIONS);
        }
        sut.assert_links_consistent();
    }
    Ok(())
}

// Property: state-machine equivalence against an insertion-ordered model.
// Invariants exercised across random operation sequences:
// - Overwrites keep position; new keys append; removals close the gap.
// - `at` fails exactly when the key is absent; indexing auto-vivifies.
// - Capacity only ever doubles (possibly several times in one insert).
// - No bucket chain exceeds `MAX_COLLISIONS`; both chains stay linked.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), cap in 1usize..8) {
        run(OrderedHashMap::with_capacity(cap), &pool, ops, true)?;
    }
}

// Collision variant using a constant hasher: every key shares one chain,
// which must still resolve by equality and never trigger growth.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = OrderedHashMap::with_hasher(ConstBuildHasher);
        run(sut, &pool, ops, false)?;
    }
}

// Property: a burst of distinct keys forces several rehashes; the final
// order is the first-insertion order regardless of duplicates in between.
proptest! {
    #[test]
    fn prop_rehash_preserves_first_insertion_order(keys in proptest::collection::vec(0u16..500, 1..300)) {
        let mut m: OrderedHashMap<u16, usize> = OrderedHashMap::new();
        let mut order: Vec<u16> = Vec::new();
        for (i, k) in keys.iter().copied().enumerate() {
            if !order.contains(&k) {
                order.push(k);
            }
            m.insert(k, i);
        }
        prop_assert_eq!(m.all_keys(), order);
        for k in keys.iter().rev() {
            let last = keys.iter().rposition(|x| x == k).unwrap();
            prop_assert_eq!(m.get(k), Some(&last));
        }
    }
}
