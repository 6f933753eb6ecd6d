//! Higher-order traversal over `DeepHashSet`.
//!
//! Callbacks receive the value, its zero-based position in traversal order,
//! and the set itself. None of these methods mutate the set.

use crate::deep_hash_set::DeepHashSet;
use crate::provider::{EqualityProvider, HashProvider};
use core::ops::ControlFlow;

impl<T, H, E> DeepHashSet<T, H, E> {
    /// Calls `f` on every value. There is no early exit; see
    /// [`try_for_each`](Self::try_for_each) for that.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T, usize, &Self),
    {
        for (index, value) in self.iter().enumerate() {
            f(value, index, self);
        }
    }

    /// Like [`for_each`](Self::for_each), stopping at the first
    /// `ControlFlow::Break`, whose payload is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::ops::ControlFlow;
    /// use deep_hashset::DeepHashSet;
    ///
    /// let set: DeepHashSet<i32> = [4, 8, 15, 16].into();
    /// let first_odd = set.try_for_each(|v, i, _| {
    ///     if v % 2 == 1 { ControlFlow::Break(i) } else { ControlFlow::Continue(()) }
    /// });
    /// assert_eq!(first_odd, ControlFlow::Break(2));
    /// ```
    pub fn try_for_each<B, F>(&self, mut f: F) -> ControlFlow<B>
    where
        F: FnMut(&T, usize, &Self) -> ControlFlow<B>,
    {
        for (index, value) in self.iter().enumerate() {
            if let ControlFlow::Break(out) = f(value, index, self) {
                return ControlFlow::Break(out);
            }
        }
        ControlFlow::Continue(())
    }

    pub fn map<U, F>(&self, mut f: F) -> Vec<U>
    where
        F: FnMut(&T, usize, &Self) -> U,
    {
        let mut out = Vec::with_capacity(self.len());
        self.for_each(|value, index, set| out.push(f(value, index, set)));
        out
    }

    pub fn filter<F>(&self, mut pred: F) -> Vec<&T>
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        self.iter()
            .enumerate()
            .filter(|&(index, value)| pred(value, index, self))
            .map(|(_, value)| value)
            .collect()
    }

    /// Left fold from `seed` in traversal order.
    pub fn reduce<U, F>(&self, seed: U, mut f: F) -> U
    where
        F: FnMut(U, &T, usize, &Self) -> U,
    {
        self.iter()
            .enumerate()
            .fold(seed, |acc, (index, value)| f(acc, value, index, self))
    }

    /// True if `pred` holds for some value. Stops at the first match.
    pub fn any<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        self.iter()
            .enumerate()
            .any(|(index, value)| pred(value, index, self))
    }

    /// True if `pred` holds for every value; vacuously true when empty.
    /// Stops at the first failure.
    pub fn all<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        self.iter()
            .enumerate()
            .all(|(index, value)| pred(value, index, self))
    }

    pub fn find<F>(&self, mut pred: F) -> Option<&T>
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        self.iter()
            .enumerate()
            .find(|&(index, value)| pred(value, index, self))
            .map(|(_, value)| value)
    }

    /// Concatenates the outputs of `f`, one level deep, in traversal order.
    pub fn flat_map<U, I, F>(&self, mut f: F) -> Vec<U>
    where
        I: IntoIterator<Item = U>,
        F: FnMut(&T, usize, &Self) -> I,
    {
        let mut out = Vec::new();
        self.for_each(|value, index, set| out.extend(f(value, index, set)));
        out
    }
}

impl<T, H, E> DeepHashSet<T, H, E>
where
    T: Clone,
    H: HashProvider<T> + Clone,
    E: EqualityProvider<T> + Clone,
{
    /// Like [`filter`](Self::filter), collecting clones into a new set with
    /// this set's providers.
    #[must_use]
    pub fn filter_set<F>(&self, pred: F) -> Self
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        let mut out = self.empty_like();
        out.extend(self.filter(pred).into_iter().cloned());
        out
    }
}
