//! deep-hashset: a set whose membership is decided by structural (deep)
//! equality, indexed by a structural hash.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: deduplicate values by content rather than identity, including
//!   nested composites, without scanning the whole set on every lookup.
//! - Layers:
//!   - BucketIndex<T>: maps a `u64` hash to a bucket (ordered list of values
//!     sharing that hash) and remembers the order in which hashes were first
//!     introduced.
//!   - DeepHashSet<T, H, E>: the membership engine. Hashes a value with the
//!     injected `HashProvider`, then resolves collisions inside the matched
//!     bucket with the injected `EqualityProvider`. It is the only writer of
//!     the index.
//!   - Iteration (`iter`), set algebra (`algebra`) and higher-order traversal
//!     (`traversal`) are built on `contains` and `iter` alone.
//!
//! Ordering
//! - Traversal visits buckets in hash-introduction order, then values in
//!   insertion order within a bucket. With `A`, `B` hashing differently and
//!   `C` colliding with `A`, inserting `A, B, C` iterates as `A, C, B`.
//! - An emptied bucket is unregistered immediately; a later value with the
//!   same hash opens a fresh bucket at the end of the order.
//!
//! Providers
//! - `HashProvider<T>` and `EqualityProvider<T>` are constructor parameters.
//!   They must agree: `equal(a, b)` implies `hash(a) == hash(b)`.
//! - The default pairing, `StructuralHash` + `StructuralEq`, uses `T: Hash`
//!   and `T: PartialEq`; derived impls of both recurse into nested fields.
//! - `HashFn` and `EqFn` wrap closures, for custom or mock providers.
//!
//! Constraints
//! - Single-threaded: no internal locking, and the set is `!Sync`. Mutating a
//!   set while one of its providers is running is a caller bug; debug builds
//!   panic on it, release builds do not check.
//! - Providers run before storage is touched, so a panicking provider leaves
//!   the set consistent. Cyclic values are unsupported.
//! - `len()` is recounted from the buckets on every call.
//! - `Clone` is a deep copy: buckets, values and providers.
//!
//! Notes and non-goals
//! - No persistence, no concurrent mutation, no cyclic value graphs.
//! - `for_each` always visits every value; `try_for_each` offers early exit
//!   through `ControlFlow`.

mod algebra;
mod bucket_index;
mod deep_hash_set;
mod deep_hash_set_proptest;
pub mod iter;
pub mod provider;
mod reentrancy;
#[cfg(feature = "serde")]
mod serde_impls;
mod traversal;

// Public surface
pub use deep_hash_set::DeepHashSet;
pub use provider::{EqFn, EqualityProvider, HashFn, HashProvider, StructuralEq, StructuralHash};
