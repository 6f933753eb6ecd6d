#![cfg(test)]

// Property tests for DeepHashSet kept inside the crate so they can check
// bucket bookkeeping (`bucket_count`) against the model.

use crate::provider::{HashFn, HashProvider, StructuralEq};
use crate::DeepHashSet;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::fmt;

#[derive(Clone, Eq, PartialEq, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys and shorter
// op lists.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize),
    Remove(usize),
    Take(usize),
    Contains(String),
    RetainShorterThan(usize),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => idx.clone().prop_map(Op::Insert),
            2 => idx.clone().prop_map(Op::Remove),
            1 => idx.clone().prop_map(Op::Take),
            2 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(Op::Contains),
            1 => (0usize..6).prop_map(Op::RetainShorterThan),
            1 => Just(Op::Clear),
            2 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// Reference model: buckets as plain vectors in introduction order.
#[derive(Default)]
struct Model {
    buckets: Vec<(u64, Vec<Key>)>,
}

impl Model {
    fn contains(&self, key: &Key) -> bool {
        self.buckets.iter().any(|(_, b)| b.contains(key))
    }

    fn insert(&mut self, hash: u64, key: Key) -> bool {
        if self.contains(&key) {
            return false;
        }
        match self.buckets.iter_mut().find(|(h, _)| *h == hash) {
            Some((_, bucket)) => bucket.push(key),
            None => self.buckets.push((hash, vec![key])),
        }
        true
    }

    fn remove(&mut self, hash: u64, key: &Key) -> bool {
        let Some(i) = self.buckets.iter().position(|(h, _)| *h == hash) else {
            return false;
        };
        let bucket = &mut self.buckets[i].1;
        let Some(pos) = bucket.iter().position(|k| k == key) else {
            return false;
        };
        bucket.remove(pos);
        if bucket.is_empty() {
            self.buckets.remove(i);
        }
        true
    }

    fn retain(&mut self, keep: impl Fn(&Key) -> bool) {
        for (_, bucket) in &mut self.buckets {
            bucket.retain(|k| keep(k));
        }
        self.buckets.retain(|(_, b)| !b.is_empty());
    }

    fn values(&self) -> Vec<Key> {
        self.buckets.iter().flat_map(|(_, b)| b.iter().cloned()).collect()
    }

    fn len(&self) -> usize {
        self.buckets.iter().map(|(_, b)| b.len()).sum()
    }
}

// State-machine equivalence against `Model`. Invariants exercised across
// random operation sequences:
// - insert/remove/take report whether the set changed, matching the model.
// - Traversal order equals bucket-introduction order, then insertion order.
// - Emptied buckets are unregistered (`bucket_count` parity).
// - `len`/`is_empty` parity after every op.
fn run_state_machine<H>(
    mut sut: DeepHashSet<Key, H, StructuralEq>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    H: HashProvider<Key>,
{
    let mut model = Model::default();
    for op in ops {
        match op {
            Op::Insert(i) => {
                let k = Key(pool[i].clone());
                let hash = sut.hash_provider().hash(&k);
                prop_assert_eq!(sut.insert(k.clone()), model.insert(hash, k));
            }
            Op::Remove(i) => {
                let k = Key(pool[i].clone());
                let hash = sut.hash_provider().hash(&k);
                prop_assert_eq!(sut.remove(&k), model.remove(hash, &k));
                prop_assert!(!sut.contains(&k));
            }
            Op::Take(i) => {
                let k = Key(pool[i].clone());
                let hash = sut.hash_provider().hash(&k);
                let expected = model.remove(hash, &k).then(|| k.clone());
                prop_assert_eq!(sut.take(&k), expected);
            }
            Op::Contains(s) => {
                let k = Key(s);
                prop_assert_eq!(sut.contains(&k), model.contains(&k));
                prop_assert_eq!(sut.get(&k).is_some(), model.contains(&k));
            }
            Op::RetainShorterThan(n) => {
                sut.retain(|k| k.0.len() < n);
                model.retain(|k| k.0.len() < n);
            }
            Op::Clear => {
                sut.clear();
                model = Model::default();
            }
            Op::Iterate => {
                let got: Vec<Key> = sut.iter().cloned().collect();
                prop_assert_eq!(got, model.values());
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.len() == 0);
        prop_assert_eq!(sut.bucket_count(), model.buckets.len());
    }
    let owned: Vec<Key> = sut.into_iter().collect();
    prop_assert_eq!(owned, model.values());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(DeepHashSet::new(), &pool, ops)?;
    }

    // Every key collides: one bucket, order decided purely by insertion.
    #[test]
    fn prop_state_machine_all_colliding((pool, ops) in arb_scenario()) {
        let sut = DeepHashSet::with_providers(HashFn(|_: &Key| 0u64), StructuralEq);
        run_state_machine(sut, &pool, ops)?;
    }

    // A few shared buckets, which is where introduction order and
    // insertion order diverge.
    #[test]
    fn prop_state_machine_few_buckets((pool, ops) in arb_scenario()) {
        let by_len = HashFn(|k: &Key| (k.0.len() % 3) as u64);
        let sut = DeepHashSet::with_providers(by_len, StructuralEq);
        run_state_machine(sut, &pool, ops)?;
    }

    // Clones never observe each other's mutations.
    #[test]
    fn prop_clone_isolation(
        base in proptest::collection::vec("[a-c]{1,3}", 0..12),
        extra in proptest::collection::vec("[a-d]{1,3}", 0..12),
    ) {
        let mut original: DeepHashSet<Key> = base.iter().cloned().map(Key).collect();
        let snapshot: Vec<Key> = original.iter().cloned().collect();
        let mut copy = original.clone();

        for s in &extra {
            copy.insert(Key(s.clone()));
            copy.remove(&Key(format!("{s}x")));
        }
        if let Some(first) = snapshot.first() {
            copy.remove(first);
        }
        prop_assert_eq!(original.iter().cloned().collect::<Vec<_>>(), snapshot);

        let before_copy: Vec<Key> = copy.iter().cloned().collect();
        original.clear();
        prop_assert_eq!(copy.iter().cloned().collect::<Vec<_>>(), before_copy);
    }
}
