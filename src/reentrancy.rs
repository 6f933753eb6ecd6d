//! Debug-only check that a provider does not call back into the set it
//! serves.
//!
//! `insert`, `get` and `take` mark the set busy while hash and equality
//! providers run. Hitting a busy set from a provider panics in debug builds;
//! release builds only keep the `!Sync` marker.

use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug, Default)]
pub(crate) struct ProviderScope {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // !Sync in every build profile, not only when `busy` exists.
    _not_sync: PhantomData<Cell<()>>,
}

impl ProviderScope {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _not_sync: PhantomData,
        }
    }

    /// Marks the set busy until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self) -> ScopeGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if self.busy.replace(true) {
                // The outer guard still owns the flag and clears it on unwind.
                panic!("reentrancy detected: a hash or equality provider re-entered the set it serves");
            }
        }
        ScopeGuard(self)
    }
}

/// Clears the busy flag on drop, unwinding included.
pub(crate) struct ScopeGuard<'a>(#[cfg_attr(not(debug_assertions), allow(dead_code))] &'a ProviderScope);

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.0.busy.set(false);
    }
}
