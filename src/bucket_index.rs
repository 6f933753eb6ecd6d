//! BucketIndex: hash -> bucket storage that remembers hash-introduction order.
//!
//! Buckets live in a `SlotMap`; a `HashTable` maps each hash to its slot.
//! Slots are threaded into a doubly-linked list in the order their hash was
//! first registered, so opening and closing a bucket are O(1) and iteration
//! never depends on slot reuse.

use core::iter::FusedIterator;
use hashbrown::hash_table::Entry;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use smallvec::SmallVec;

/// Values sharing one hash, in insertion order. Most buckets hold one value.
pub(crate) type Bucket<T> = SmallVec<[T; 1]>;

#[derive(Clone, Debug)]
struct Slot<T> {
    hash: u64,
    bucket: Bucket<T>,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

#[derive(Clone, Debug)]
pub(crate) struct BucketIndex<T> {
    table: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Slot<T>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<T> BucketIndex<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            slots: SlotMap::with_capacity_and_key(capacity),
            head: None,
            tail: None,
        }
    }

    /// Number of stored values, summed over the live buckets on every call.
    pub(crate) fn len(&self) -> usize {
        self.slots.values().map(|slot| slot.bucket.len()).sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        // Empty buckets are never left registered.
        self.slots.is_empty()
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.slots.len()
    }

    fn key_for(&self, hash: u64) -> Option<DefaultKey> {
        self.table
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|slot| slot.hash == hash)
                    .unwrap_or(false)
            })
            .copied()
    }

    /// Returns the bucket for `hash`, registering an empty one at the end of
    /// the introduction order if the hash is new.
    pub(crate) fn get_or_create_bucket(&mut self, hash: u64) -> &mut Bucket<T> {
        let key = match self.table.entry(
            hash,
            |&k| {
                self.slots
                    .get(k)
                    .map(|slot| slot.hash == hash)
                    .unwrap_or(false)
            },
            |&k| self.slots.get(k).map(|slot| slot.hash).unwrap_or(0),
        ) {
            Entry::Occupied(occupied) => *occupied.get(),
            Entry::Vacant(vacant) => {
                let key = self.slots.insert(Slot {
                    hash,
                    bucket: Bucket::new(),
                    prev: self.tail,
                    next: None,
                });
                vacant.insert(key);
                match self.tail {
                    Some(tail) => self.slots[tail].next = Some(key),
                    None => self.head = Some(key),
                }
                self.tail = Some(key);
                log::trace!("opened bucket for hash {:#018x}", hash);
                key
            }
        };
        &mut self.slots[key].bucket
    }

    pub(crate) fn bucket_for(&self, hash: u64) -> Option<&Bucket<T>> {
        let key = self.key_for(hash)?;
        self.slots.get(key).map(|slot| &slot.bucket)
    }

    pub(crate) fn bucket_for_mut(&mut self, hash: u64) -> Option<&mut Bucket<T>> {
        let key = self.key_for(hash)?;
        self.slots.get_mut(key).map(|slot| &mut slot.bucket)
    }

    /// Unregisters the bucket for `hash` if it holds no values. Returns
    /// whether a bucket was removed.
    pub(crate) fn remove_bucket_if_empty(&mut self, hash: u64) -> bool {
        let slots = &self.slots;
        let Ok(occupied) = self.table.find_entry(hash, |&k| {
            slots.get(k).map(|slot| slot.hash == hash).unwrap_or(false)
        }) else {
            return false;
        };
        let key = *occupied.get();
        if !slots[key].bucket.is_empty() {
            return false;
        }
        let _ = occupied.remove();
        self.unlink(key);
        log::trace!("closed empty bucket for hash {:#018x}", hash);
        true
    }

    fn unlink(&mut self, key: DefaultKey) {
        let Some(slot) = self.slots.remove(key) else {
            return;
        };
        match slot.prev {
            Some(prev) => self.slots[prev].next = slot.next,
            None => self.head = slot.next,
        }
        match slot.next {
            Some(next) => self.slots[next].prev = slot.prev,
            None => self.tail = slot.prev,
        }
    }

    /// Keeps the values for which `keep` returns true, closing buckets that
    /// end up empty. Surviving values keep their relative order.
    pub(crate) fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut cursor = self.head;
        while let Some(key) = cursor {
            let slot = &mut self.slots[key];
            cursor = slot.next;
            slot.bucket.retain(|value| keep(value));
            if slot.bucket.is_empty() {
                let hash = slot.hash;
                self.remove_bucket_if_empty(hash);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        log::trace!("clearing {} buckets", self.slots.len());
        self.table.clear();
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        let slots = &self.slots;
        self.table.reserve(additional, |&k| {
            slots.get(k).map(|slot| slot.hash).unwrap_or(0)
        });
        self.slots.reserve(additional);
    }

    /// Buckets in hash-introduction order.
    pub(crate) fn buckets(&self) -> Buckets<'_, T> {
        Buckets {
            slots: &self.slots,
            cursor: self.head,
        }
    }

    /// Consumes the index, yielding buckets in hash-introduction order.
    pub(crate) fn into_buckets(self) -> IntoBuckets<T> {
        IntoBuckets {
            slots: self.slots,
            cursor: self.head,
        }
    }
}

impl<T> Default for BucketIndex<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

pub(crate) struct Buckets<'a, T> {
    slots: &'a SlotMap<DefaultKey, Slot<T>>,
    cursor: Option<DefaultKey>,
}

impl<T> Clone for Buckets<'_, T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            cursor: self.cursor,
        }
    }
}

impl<'a, T> Iterator for Buckets<'a, T> {
    type Item = &'a [T];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.get(self.cursor?)?;
        self.cursor = slot.next;
        Some(&slot.bucket[..])
    }
}

impl<T> FusedIterator for Buckets<'_, T> {}

pub(crate) struct IntoBuckets<T> {
    slots: SlotMap<DefaultKey, Slot<T>>,
    cursor: Option<DefaultKey>,
}

impl<T> Iterator for IntoBuckets<T> {
    type Item = Bucket<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.remove(self.cursor?)?;
        self.cursor = slot.next;
        Some(slot.bucket)
    }
}

impl<T> FusedIterator for IntoBuckets<T> {}
