//! Injected hash and equality capabilities.
//!
//! A [`DeepHashSet`](crate::DeepHashSet) never inspects its values itself:
//! hashing goes through a [`HashProvider`] and collision resolution goes
//! through an [`EqualityProvider`]. The two must agree: whenever
//! `equal(a, b)` holds, `hash(a) == hash(b)` must hold as well. Providers are
//! expected to terminate; cyclic values are not supported.

use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Produces a structural hash for a value.
///
/// Must be deterministic for the lifetime of a value's residency in a set.
/// Collisions between unequal values are allowed.
pub trait HashProvider<T: ?Sized> {
    fn hash(&self, value: &T) -> u64;
}

/// Decides structural (deep) equality between two values.
///
/// Must be an equivalence relation consistent with the paired
/// [`HashProvider`].
pub trait EqualityProvider<T: ?Sized> {
    fn equal(&self, a: &T, b: &T) -> bool;
}

/// Default hash provider: feeds `T: Hash` through a `BuildHasher`.
///
/// Derived `Hash` impls recurse into every field, so two separately built
/// values with identical contents hash identically. The hasher state is
/// cloned along with the set, which keeps clones consistent with their
/// source.
#[derive(Clone, Debug, Default)]
pub struct StructuralHash<S = RandomState> {
    state: S,
}

impl<S> StructuralHash<S> {
    pub fn with_state(state: S) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &S {
        &self.state
    }
}

impl<T, S> HashProvider<T> for StructuralHash<S>
where
    T: ?Sized + Hash,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, value: &T) -> u64 {
        self.state.hash_one(value)
    }
}

/// Default equality provider: `T: PartialEq`. Derived `PartialEq` compares
/// nested fields recursively.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StructuralEq;

impl<T> EqualityProvider<T> for StructuralEq
where
    T: ?Sized + PartialEq,
{
    #[inline]
    fn equal(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Adapts a closure `Fn(&T) -> u64` into a [`HashProvider`].
#[derive(Clone, Copy, Default)]
pub struct HashFn<F>(pub F);

impl<T, F> HashProvider<T> for HashFn<F>
where
    T: ?Sized,
    F: Fn(&T) -> u64,
{
    #[inline]
    fn hash(&self, value: &T) -> u64 {
        (self.0)(value)
    }
}

impl<F> fmt::Debug for HashFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashFn")
    }
}

/// Adapts a closure `Fn(&T, &T) -> bool` into an [`EqualityProvider`].
#[derive(Clone, Copy, Default)]
pub struct EqFn<F>(pub F);

impl<T, F> EqualityProvider<T> for EqFn<F>
where
    T: ?Sized,
    F: Fn(&T, &T) -> bool,
{
    #[inline]
    fn equal(&self, a: &T, b: &T) -> bool {
        (self.0)(a, b)
    }
}

impl<F> fmt::Debug for EqFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EqFn")
    }
}
