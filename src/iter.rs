//! Iterators over a `DeepHashSet`.
//!
//! Every traversal walks buckets in hash-introduction order and values within
//! a bucket in insertion order. Each call to [`DeepHashSet::values`] (or its
//! aliases) starts a fresh traversal of the current contents.

use crate::bucket_index::{Bucket, Buckets, IntoBuckets};
use crate::deep_hash_set::DeepHashSet;
use core::iter::FusedIterator;

/// Borrowing iterator over the values of a set.
pub struct Iter<'a, T> {
    buckets: Buckets<'a, T>,
    current: core::slice::Iter<'a, T>,
    remaining: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            current: self.current.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.current.next() {
                self.remaining -= 1;
                return Some(value);
            }
            self.current = self.buckets.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Iterator of `(value, value)` pairs, mirroring associative containers.
pub struct Entries<'a, T> {
    inner: Iter<'a, T>,
}

impl<T> Clone for Entries<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Entries<'a, T> {
    type Item = (&'a T, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|value| (value, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Entries<'_, T> {}
impl<T> FusedIterator for Entries<'_, T> {}

/// Owning iterator produced by `DeepHashSet::into_iter`.
pub struct IntoIter<T> {
    buckets: IntoBuckets<T>,
    current: smallvec::IntoIter<[T; 1]>,
    remaining: usize,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.current.next() {
                self.remaining -= 1;
                return Some(value);
            }
            self.current = self.buckets.next()?.into_iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T, H, E> DeepHashSet<T, H, E> {
    /// Lazily yields every value in traversal order.
    pub fn values(&self) -> Iter<'_, T> {
        Iter {
            buckets: self.index.buckets(),
            current: <&[T]>::default().iter(),
            remaining: self.len(),
        }
    }

    /// Same sequence as [`values`](Self::values); a set's values are its keys.
    pub fn keys(&self) -> Iter<'_, T> {
        self.values()
    }

    pub fn entries(&self) -> Entries<'_, T> {
        Entries {
            inner: self.values(),
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.values()
    }
}

impl<'a, T, H, E> IntoIterator for &'a DeepHashSet<T, H, E> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values()
    }
}

impl<T, H, E> IntoIterator for DeepHashSet<T, H, E> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let remaining = self.len();
        IntoIter {
            buckets: self.index.into_buckets(),
            current: Bucket::new().into_iter(),
            remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::provider::{HashFn, StructuralEq};
    use crate::DeepHashSet;

    fn first_letter_hash() -> HashFn<fn(&&'static str) -> u64> {
        let hash: fn(&&'static str) -> u64 = |s| s.as_bytes()[0] as u64;
        HashFn(hash)
    }

    /// Invariant: A, B with distinct hashes then C colliding with A iterate
    /// as [A, C, B].
    #[test]
    fn collision_joins_earlier_bucket() {
        let mut s = DeepHashSet::with_providers(first_letter_hash(), StructuralEq);
        s.insert("apple");
        s.insert("banana");
        s.insert("avocado");
        let got: Vec<_> = s.values().copied().collect();
        assert_eq!(got, vec!["apple", "avocado", "banana"]);
    }

    /// Invariant: keys, values, entries, iter and consuming iteration agree
    /// on order, and each call restarts from the beginning.
    #[test]
    fn all_views_share_one_order() {
        let mut s = DeepHashSet::with_providers(first_letter_hash(), StructuralEq);
        for w in ["cat", "bee", "cow", "ant", "bat"] {
            s.insert(w);
        }
        let expected = vec!["cat", "cow", "bee", "bat", "ant"];

        let values: Vec<_> = s.values().copied().collect();
        let keys: Vec<_> = s.keys().copied().collect();
        let iter: Vec<_> = (&s).into_iter().copied().collect();
        let entries: Vec<_> = s
            .entries()
            .map(|(k, v)| {
                assert!(core::ptr::eq(k, v));
                *v
            })
            .collect();
        assert_eq!(values, expected);
        assert_eq!(keys, expected);
        assert_eq!(iter, expected);
        assert_eq!(entries, expected);

        let mut first = s.iter();
        first.next();
        assert_eq!(s.iter().next(), Some(&"cat"), "fresh traversal each call");

        let owned: Vec<_> = s.into_iter().collect();
        assert_eq!(owned, expected);
    }

    /// Invariant: iterators report an exact length and stay exhausted.
    #[test]
    fn exact_size_and_fused() {
        let s: DeepHashSet<u8> = [1, 2, 3].into();
        let mut it = s.iter();
        assert_eq!(it.len(), 3);
        it.next();
        assert_eq!(it.len(), 2);
        assert_eq!(it.by_ref().count(), 2);
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
        assert_eq!(s.entries().len(), 3);
        assert_eq!(s.clone().into_iter().len(), 3);
    }

    /// Invariant: a bucket closed by removal and reopened later moves to the
    /// end of the order.
    #[test]
    fn reopened_bucket_moves_to_end() {
        let mut s = DeepHashSet::with_providers(first_letter_hash(), StructuralEq);
        s.extend(["ant", "bee", "cat"]);
        s.remove(&"ant");
        s.insert("axe");
        let got: Vec<_> = s.iter().copied().collect();
        assert_eq!(got, vec!["bee", "cat", "axe"]);
    }

    #[test]
    fn empty_set_iterates_nothing() {
        let s: DeepHashSet<String> = DeepHashSet::new();
        assert_eq!(s.iter().next(), None);
        assert_eq!(s.entries().next(), None);
        assert_eq!(s.into_iter().next(), None);
    }
}
