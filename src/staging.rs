// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Staging resource cache.

When a live resource cannot be mapped for the requested direction, reads are
redirected through a CPU-accessible mirror.  Mirrors are expensive to allocate,
so each backend keeps them here and reuses them across calls.

Textures are keyed by [`StagingKey`].  When the cache is full and a new
descriptor arrives, every entry is evicted at once; there is no LRU ordering.
Buffers get exactly one slot per [`BufferKind`], reallocated whenever the
requested size changes.

The cache is generic over the backend's native mirror type and never talks to
the device itself: allocation and release are passed in as closures, so the
cache stays free of locking and of backend types.
*/

use crate::descriptor::{StagingKey, TextureDesc};
use crate::error::{Error, Result};
use crate::formats::BufferKind;
use std::collections::HashMap;

/// Default number of texture mirrors kept before a bulk eviction.
pub const STAGING_TEXTURE_CAPACITY: usize = 32;

#[derive(Debug)]
struct StagingEntry<T> {
    desc: TextureDesc,
    mirror: T,
}

/// Texture mirrors keyed by descriptor.
#[derive(Debug)]
pub struct StagingCache<T> {
    entries: HashMap<StagingKey, StagingEntry<T>>,
    capacity: usize,
    evictions: usize,
}

impl<T> StagingCache<T> {
    pub fn new(capacity: usize) -> Self {
        StagingCache {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            evictions: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bulk evictions performed so far.
    pub fn evictions(&self) -> usize {
        self.evictions
    }

    pub fn contains(&self, key: StagingKey) -> bool {
        self.entries.contains_key(&key)
    }

    /**
    Returns the mirror for `key`, allocating it with `create` on a miss.

    On a miss with a full cache, every existing mirror is handed to `release`
    before allocating.  If `create` fails nothing is inserted.
    */
    pub fn acquire<C, R>(
        &mut self,
        key: StagingKey,
        desc: TextureDesc,
        create: C,
        release: R,
    ) -> Result<&T>
    where
        C: FnOnce() -> Result<T>,
        R: FnMut(T),
    {
        if self.entries.contains_key(&key) {
            let entry = &self.entries[&key];
            debug_assert_eq!(entry.desc, desc, "staging key collision");
            return Ok(&entry.mirror);
        }
        if self.entries.len() >= self.capacity {
            logwise::trace_sync!(
                "staging cache full, evicting {count} mirrors",
                count = self.entries.len()
            );
            self.evictions += 1;
            self.clear(release);
        }
        let mirror = create()?;
        let entry = self.entries.entry(key).or_insert(StagingEntry { desc, mirror });
        Ok(&entry.mirror)
    }

    /// Releases every mirror.
    pub fn clear<R: FnMut(T)>(&mut self, mut release: R) {
        for (_, entry) in self.entries.drain() {
            release(entry.mirror);
        }
    }
}

#[derive(Debug)]
struct StagingSlot<T> {
    size: usize,
    mirror: T,
}

/// One buffer mirror per buffer kind.
#[derive(Debug)]
pub struct StagingBuffers<T> {
    slots: [Option<StagingSlot<T>>; BufferKind::COUNT],
}

impl<T> Default for StagingBuffers<T> {
    fn default() -> Self {
        StagingBuffers {
            slots: [None, None, None, None],
        }
    }
}

impl<T> StagingBuffers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the mirror currently held for `kind`.
    pub fn size_of(&self, kind: BufferKind) -> Option<usize> {
        self.slots[kind.slot()].as_ref().map(|s| s.size)
    }

    /**
    Returns the mirror for `kind`, reallocating it if its size differs from `size`.

    The old mirror is released before the new allocation; if that allocation fails
    the slot stays empty.
    */
    pub fn acquire<C, R>(&mut self, kind: BufferKind, size: usize, create: C, mut release: R) -> Result<&T>
    where
        C: FnOnce(usize) -> Result<T>,
        R: FnMut(T),
    {
        let slot = &mut self.slots[kind.slot()];
        if slot.as_ref().is_some_and(|s| s.size != size) {
            logwise::trace_sync!(
                "resizing staging buffer for {kind} to {size}",
                kind = logwise::privacy::LogIt(&kind),
                size = size
            );
            if let Some(old) = slot.take() {
                release(old.mirror);
            }
        }
        if slot.is_none() {
            let mirror = create(size)?;
            *slot = Some(StagingSlot { size, mirror });
        }
        match slot {
            Some(s) => Ok(&s.mirror),
            None => Err(Error::Unknown),
        }
    }

    pub fn clear<R: FnMut(T)>(&mut self, mut release: R) {
        for slot in self.slots.iter_mut() {
            if let Some(s) = slot.take() {
                release(s.mirror);
            }
        }
    }
}
