//! DeepHashSet: the membership engine over a `BucketIndex`.

use crate::bucket_index::BucketIndex;
use crate::provider::{EqualityProvider, HashProvider, StructuralEq, StructuralHash};
use crate::reentrancy::ProviderScope;
use core::fmt;
use core::hash::Hash;

/// A set whose membership is decided by structural equality.
///
/// Values are grouped into buckets by the hash provider `H`; collisions inside
/// a bucket are resolved with the equality provider `E`. Iteration visits
/// buckets in the order their hash was first introduced, and values within a
/// bucket in insertion order.
///
/// # Single-writer precondition
///
/// The set performs no internal locking. Iterators borrow the set, so safe
/// code cannot mutate it mid-traversal; code that sidesteps the borrow (raw
/// pointers, providers that reach back into the set) is unsupported. Debug
/// builds panic if a provider re-enters the set it is serving.
///
/// # Examples
///
/// ```
/// use deep_hashset::DeepHashSet;
///
/// #[derive(Clone, Debug, Hash, PartialEq)]
/// struct Point { x: i32, tags: Vec<String> }
///
/// let mut set = DeepHashSet::new();
/// assert!(set.insert(Point { x: 1, tags: vec!["a".into()] }));
/// assert!(!set.insert(Point { x: 1, tags: vec!["a".into()] }));
/// assert_eq!(set.len(), 1);
/// ```
pub struct DeepHashSet<T, H = StructuralHash, E = StructuralEq> {
    hasher: H,
    equality: E,
    pub(crate) index: BucketIndex<T>,
    provider_scope: ProviderScope,
}

impl<T> DeepHashSet<T>
where
    T: Hash + PartialEq,
{
    pub fn new() -> Self {
        Self::with_providers(StructuralHash::default(), StructuralEq)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_providers(capacity, StructuralHash::default(), StructuralEq)
    }
}

impl<T, H, E> DeepHashSet<T, H, E> {
    pub fn with_providers(hasher: H, equality: E) -> Self {
        Self::with_capacity_and_providers(0, hasher, equality)
    }

    pub fn with_capacity_and_providers(capacity: usize, hasher: H, equality: E) -> Self {
        Self {
            hasher,
            equality,
            index: BucketIndex::with_capacity(capacity),
            provider_scope: ProviderScope::new(),
        }
    }

    pub fn hash_provider(&self) -> &H {
        &self.hasher
    }

    pub fn equality_provider(&self) -> &E {
        &self.equality
    }

    /// Number of values, recounted from the live buckets.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of distinct hashes currently registered.
    pub fn bucket_count(&self) -> usize {
        self.index.bucket_count()
    }

    /// Drops every bucket at once.
    pub fn clear(&mut self) {
        self.index.clear();
    }

    pub fn reserve(&mut self, additional: usize) {
        self.index.reserve(additional);
    }

    /// Keeps only the values for which `keep` returns true. Order of the
    /// survivors is unchanged.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.index.retain(keep);
    }

    /// An empty set sharing copies of this set's providers.
    pub(crate) fn empty_like(&self) -> Self
    where
        H: Clone,
        E: Clone,
    {
        Self::with_providers(self.hasher.clone(), self.equality.clone())
    }
}

impl<T, H, E> DeepHashSet<T, H, E>
where
    H: HashProvider<T>,
    E: EqualityProvider<T>,
{
    /// Builds a set from `values`; deep-equal duplicates collapse to the
    /// first occurrence.
    pub fn from_values_with<I>(values: I, hasher: H, equality: E) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let values = values.into_iter();
        let mut set = Self::with_capacity_and_providers(values.size_hint().0, hasher, equality);
        set.extend(values);
        set
    }

    /// Adds `value` unless a deep-equal value is already present. Returns
    /// whether the set changed.
    pub fn insert(&mut self, value: T) -> bool {
        let _scope = self.provider_scope.enter();
        let hash = self.hasher.hash(&value);
        let equality = &self.equality;
        // A freshly opened bucket is empty, so a duplicate never leaves an
        // empty bucket behind.
        let bucket = self.index.get_or_create_bucket(hash);
        if bucket.iter().any(|stored| equality.equal(stored, &value)) {
            return false;
        }
        bucket.push(value);
        true
    }

    /// Inserts every value in input order. Returns how many were new.
    pub fn insert_all<I>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        values
            .into_iter()
            .map(|value| self.insert(value))
            .filter(|&added| added)
            .count()
    }

    /// Scans only the bucket matching `value`'s hash.
    pub fn contains(&self, value: &T) -> bool {
        self.get(value).is_some()
    }

    /// The stored value deep-equal to `value`, if any.
    pub fn get(&self, value: &T) -> Option<&T> {
        let _scope = self.provider_scope.enter();
        let hash = self.hasher.hash(value);
        self.index
            .bucket_for(hash)?
            .iter()
            .find(|&stored| self.equality.equal(stored, value))
    }

    /// Removes the value deep-equal to `value`. Returns whether one was
    /// found.
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the stored value deep-equal to `value`.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let _scope = self.provider_scope.enter();
        let hash = self.hasher.hash(value);
        let equality = &self.equality;
        let bucket = self.index.bucket_for_mut(hash)?;
        let position = bucket
            .iter()
            .position(|stored| equality.equal(stored, value))?;
        let removed = bucket.remove(position);
        self.index.remove_bucket_if_empty(hash);
        Some(removed)
    }
}

/// Deep copy: every bucket and every value is cloned, and the providers are
/// cloned with them.
impl<T, H, E> Clone for DeepHashSet<T, H, E>
where
    T: Clone,
    H: Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            equality: self.equality.clone(),
            index: self.index.clone(),
            provider_scope: ProviderScope::new(),
        }
    }
}

impl<T, H, E> Default for DeepHashSet<T, H, E>
where
    H: Default,
    E: Default,
{
    fn default() -> Self {
        Self::with_providers(H::default(), E::default())
    }
}

impl<T, H, E> fmt::Debug for DeepHashSet<T, H, E>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Two sets are equal when they hold the same members, regardless of order.
/// Membership is judged by `self`'s providers.
impl<T, H, E> PartialEq for DeepHashSet<T, H, E>
where
    H: HashProvider<T>,
    E: EqualityProvider<T>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && other.iter().all(|value| self.contains(value))
    }
}

impl<T, H, E> Eq for DeepHashSet<T, H, E>
where
    T: Eq,
    H: HashProvider<T>,
    E: EqualityProvider<T>,
{
}

impl<T, H, E> Extend<T> for DeepHashSet<T, H, E>
where
    H: HashProvider<T>,
    E: EqualityProvider<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, values: I) {
        for value in values {
            self.insert(value);
        }
    }
}

impl<'a, T, H, E> Extend<&'a T> for DeepHashSet<T, H, E>
where
    T: Clone + 'a,
    H: HashProvider<T>,
    E: EqualityProvider<T>,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, values: I) {
        self.extend(values.into_iter().cloned());
    }
}

impl<T, H, E> FromIterator<T> for DeepHashSet<T, H, E>
where
    H: HashProvider<T> + Default,
    E: EqualityProvider<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(values: I) -> Self {
        Self::from_values_with(values, H::default(), E::default())
    }
}

impl<T, const N: usize> From<[T; N]> for DeepHashSet<T>
where
    T: Hash + PartialEq,
{
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{EqFn, HashFn};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Invariant: a second insert of an equal value is a no-op.
    #[test]
    fn insert_is_idempotent() {
        let mut s: DeepHashSet<String> = DeepHashSet::new();
        assert!(s.insert("k".to_string()));
        assert!(!s.insert("k".to_string()));
        assert_eq!(s.len(), 1);
        assert_eq!(s.bucket_count(), 1);
    }

    /// Invariant: insert then remove restores the previous state.
    #[test]
    fn insert_remove_symmetry() {
        let mut s: DeepHashSet<i32> = [1, 2].into();
        assert!(s.insert(3));
        assert!(s.remove(&3));
        assert!(!s.remove(&3));
        assert_eq!(s.len(), 2);
        assert_eq!(s.bucket_count(), 2);
        assert_eq!(s.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    /// Invariant: colliding unequal values share one bucket, equal ones are
    /// deduplicated, and removing one collision leaves the other reachable.
    #[test]
    fn collisions_resolve_by_equality() {
        let mut s = DeepHashSet::with_providers(HashFn(|_: &String| 0u64), StructuralEq);
        s.insert("a".to_string());
        s.insert("b".to_string());
        s.insert("a".to_string());
        assert_eq!(s.len(), 2);
        assert_eq!(s.bucket_count(), 1);

        assert_eq!(s.take(&"a".to_string()), Some("a".to_string()));
        assert!(s.contains(&"b".to_string()));
        assert_eq!(s.bucket_count(), 1);

        assert!(s.remove(&"b".to_string()));
        assert_eq!(s.bucket_count(), 0);
        assert!(s.is_empty());
    }

    /// Invariant: lookups only consult the bucket of the probed hash.
    #[test]
    fn lookup_scans_only_matching_bucket() {
        let calls = Rc::new(Cell::new(0usize));
        let counter = calls.clone();
        let mut s = DeepHashSet::with_providers(
            HashFn(|v: &u64| *v / 10),
            EqFn(move |a: &u64, b: &u64| {
                counter.set(counter.get() + 1);
                a == b
            }),
        );
        s.extend(0..100u64);
        calls.set(0);

        assert!(s.contains(&42));
        // Bucket 4 holds 40..=49: found on the third comparison.
        assert_eq!(calls.get(), 3);

        calls.set(0);
        assert!(!s.contains(&1000));
        assert_eq!(calls.get(), 0, "no bucket is registered for hash 100");
    }

    /// Invariant: `get` returns the stored value, not the probe.
    #[test]
    fn get_returns_stored_value() {
        let mut s = DeepHashSet::with_providers(
            HashFn(|v: &(i32, &'static str)| v.0 as u64),
            EqFn(|a: &(i32, &'static str), b: &(i32, &'static str)| a.0 == b.0),
        );
        s.insert((1, "first"));
        assert!(!s.insert((1, "second")));
        assert_eq!(s.get(&(1, "probe")), Some(&(1, "first")));
        assert_eq!(s.get(&(2, "probe")), None);
    }

    /// Invariant: `retain` keeps order and closes emptied buckets.
    #[test]
    fn retain_keeps_order() {
        let mut s: DeepHashSet<i32> = (0..10).collect();
        s.retain(|v| v % 3 == 0);
        assert_eq!(s.iter().copied().collect::<Vec<_>>(), vec![0, 3, 6, 9]);
        assert_eq!(s.bucket_count(), 4);
    }

    /// Invariant: `clear` empties the set and it remains usable.
    #[test]
    fn clear_then_reuse() {
        let mut s: DeepHashSet<&str> = ["a", "b", "c"].into();
        s.clear();
        assert_eq!(s.len(), 0);
        assert!(s.iter().next().is_none());
        s.insert("b");
        assert_eq!(s.len(), 1);
    }

    /// Invariant: `insert_all` counts only newly added values.
    #[test]
    fn insert_all_counts_new_values() {
        let mut s: DeepHashSet<i32> = DeepHashSet::new();
        assert_eq!(s.insert_all([1, 2, 2, 3, 1]), 3);
        assert_eq!(s.insert_all([3, 4]), 1);
        assert_eq!(s.len(), 4);
    }

    /// Invariant: equality ignores order; Debug renders in iteration order.
    #[test]
    fn eq_and_debug() {
        let a: DeepHashSet<i32> = [1, 2, 3].into();
        let mut b: DeepHashSet<i32> = DeepHashSet::new();
        b.extend(&[3, 2, 1]);
        assert_eq!(a, b);
        b.remove(&2);
        assert_ne!(a, b);

        let mut c = DeepHashSet::with_providers(HashFn(|_: &i32| 0u64), StructuralEq);
        c.extend([3, 1]);
        assert_eq!(format!("{:?}", c), "{3, 1}");
    }

    /// Invariant: a panicking provider leaves the set consistent and usable.
    #[test]
    fn provider_panic_propagates_and_set_survives() {
        let mut s = DeepHashSet::with_providers(
            HashFn(|v: &i32| {
                if *v < 0 {
                    panic!("negative values are unsupported");
                }
                *v as u64
            }),
            StructuralEq,
        );
        s.insert(1);
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            s.insert(-1);
        }));
        assert!(res.is_err());
        assert_eq!(s.len(), 1);
        assert!(s.insert(2));
        assert!(s.contains(&1));
    }

    /// Invariant (debug-only): an equality provider re-entering the set it
    /// serves panics through the provider guard.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrancy_from_equality_panics() {
        type ReentrySet = DeepHashSet<ReentryKey, HashFn<fn(&ReentryKey) -> u64>, StructuralEq>;

        struct ReentryKey {
            id: &'static str,
            set: *const ReentrySet,
            trigger: bool,
        }
        impl PartialEq for ReentryKey {
            fn eq(&self, other: &Self) -> bool {
                if self.id == other.id {
                    return true;
                }
                if other.trigger {
                    // Re-enter the same set from inside a bucket scan.
                    unsafe {
                        let set = &*other.set;
                        let probe = ReentryKey {
                            id: self.id,
                            set: other.set,
                            trigger: false,
                        };
                        let _ = set.contains(&probe);
                    }
                }
                false
            }
        }

        let const_hash: fn(&ReentryKey) -> u64 = |_| 0;
        let mut set: ReentrySet = DeepHashSet::with_providers(HashFn(const_hash), StructuralEq);
        let ptr: *const ReentrySet = &set;
        set.insert(ReentryKey {
            id: "a",
            set: ptr,
            trigger: false,
        });

        let query = ReentryKey {
            id: "b",
            set: &set,
            trigger: true,
        };
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = set.contains(&query);
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");
    }
}
