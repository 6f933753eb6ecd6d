//! Set algebra over `DeepHashSet`.
//!
//! Every operation is built from membership queries and traversal only; none
//! of them reaches into buckets. Operations producing a set return a new one
//! carrying clones of `self`'s providers and leave both operands untouched.
//! The other operand may use different providers; its own providers decide
//! membership on its side.

use crate::deep_hash_set::DeepHashSet;
use crate::provider::{EqualityProvider, HashProvider};

impl<T, H, E> DeepHashSet<T, H, E>
where
    T: Clone,
    H: HashProvider<T> + Clone,
    E: EqualityProvider<T> + Clone,
{
    /// Values of `self` also present in `other`, in `self`'s order.
    ///
    /// # Examples
    ///
    /// ```
    /// use deep_hashset::DeepHashSet;
    ///
    /// let a: DeepHashSet<i32> = [1, 2, 3].into();
    /// let b: DeepHashSet<i32> = [2, 3, 4].into();
    /// let both: Vec<_> = a.intersection(&b).into_iter().collect();
    /// assert_eq!(both, vec![2, 3]);
    /// ```
    #[must_use]
    pub fn intersection<H2, E2>(&self, other: &DeepHashSet<T, H2, E2>) -> Self
    where
        H2: HashProvider<T>,
        E2: EqualityProvider<T>,
    {
        let mut out = self.empty_like();
        out.extend(self.iter().filter(|value| other.contains(value)).cloned());
        out
    }

    /// A copy of `self` followed by the values of `other` not already
    /// present.
    #[must_use]
    pub fn union<H2, E2>(&self, other: &DeepHashSet<T, H2, E2>) -> Self {
        self.union_all(core::iter::once(other))
    }

    /// A copy of `self` extended with each set of `others` in turn.
    #[must_use]
    pub fn union_all<'a, H2, E2, I>(&self, others: I) -> Self
    where
        I: IntoIterator<Item = &'a DeepHashSet<T, H2, E2>>,
        T: 'a,
        H2: 'a,
        E2: 'a,
    {
        let mut out = self.clone();
        for other in others {
            out.extend(other.iter());
        }
        out
    }

    /// Values of `self` absent from `other`, in `self`'s order.
    #[must_use]
    pub fn difference<H2, E2>(&self, other: &DeepHashSet<T, H2, E2>) -> Self
    where
        H2: HashProvider<T>,
        E2: EqualityProvider<T>,
    {
        let mut out = self.empty_like();
        out.extend(self.iter().filter(|value| !other.contains(value)).cloned());
        out
    }

    /// Values in exactly one of the two sets: `self`'s exclusive values in
    /// `self`'s order, then `other`'s exclusive values in `other`'s order.
    #[must_use]
    pub fn symmetric_difference<H2, E2>(&self, other: &DeepHashSet<T, H2, E2>) -> Self
    where
        H2: HashProvider<T>,
        E2: EqualityProvider<T>,
    {
        let mut out = self.empty_like();
        out.extend(self.iter().filter(|value| !other.contains(value)).cloned());
        out.extend(other.iter().filter(|value| !self.contains(value)).cloned());
        out
    }
}

impl<T, H, E> DeepHashSet<T, H, E>
where
    H: HashProvider<T>,
    E: EqualityProvider<T>,
{
    /// True when every value of `self` is in `other`; vacuously true when
    /// `self` is empty.
    #[must_use]
    pub fn is_subset<H2, E2>(&self, other: &DeepHashSet<T, H2, E2>) -> bool
    where
        H2: HashProvider<T>,
        E2: EqualityProvider<T>,
    {
        self.iter().all(|value| other.contains(value))
    }

    #[must_use]
    pub fn is_superset<H2, E2>(&self, other: &DeepHashSet<T, H2, E2>) -> bool
    where
        H2: HashProvider<T>,
        E2: EqualityProvider<T>,
    {
        other.iter().all(|value| self.contains(value))
    }

    /// True when no value is shared. Walks the smaller set and stops at the
    /// first shared value.
    #[must_use]
    pub fn is_disjoint<H2, E2>(&self, other: &DeepHashSet<T, H2, E2>) -> bool
    where
        H2: HashProvider<T>,
        E2: EqualityProvider<T>,
    {
        if self.len() <= other.len() {
            !self.iter().any(|value| other.contains(value))
        } else {
            !other.iter().any(|value| self.contains(value))
        }
    }
}
