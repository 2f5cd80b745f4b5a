use spin::Mutex;

use super::block::{
    ALIGN, BlockInfo, FREE_TAG, HeapError, MAX_CAPACITY, OVERHEAD, Record, USED_TAG, align_up,
    scrub, tag,
};
use crate::{info, warn};

/// Capacity of the system heap region in bytes.
pub const HEAP_SIZE: usize = 64 * 1024; // 64 KiB

/// Sentinel pointer value. Releasing it is a no-op; `allocate` never
/// returns it.
pub const NULL: usize = 0;

/// The system-wide heap, guarded by a spinlock. Installed by [`heap_init`].
pub static HEAP: Mutex<Option<Heap<HEAP_SIZE>>> = Mutex::new(None);

/// Aggregate usage of a heap region.
///
/// `total` is fixed at initialization to the capacity minus the initial
/// record's overhead; records created by later splits are not deducted, so a
/// fully allocated heap may report a few bytes free per split.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapStats {
    pub total: usize,
    pub used: usize,
    pub free: usize,
}

/// A fixed-size heap region managed by a first-fit allocator.
///
/// The region is a `CAP`-byte arena owned by the heap. Every block starts
/// with a control record ([`super::block`]); pointers handed out are arena
/// offsets of the payload following a record, and every access through them
/// is bounds- and provenance-checked.
pub struct Heap<const CAP: usize> {
    arena: [u8; CAP],
    total: usize,
    used: usize,
}

impl<const CAP: usize> Heap<CAP> {
    /// Creates a heap whose directory is a single free block covering the
    /// whole region.
    pub fn new() -> Self {
        const {
            assert!(CAP % ALIGN == 0, "capacity must be a multiple of ALIGN");
            assert!(CAP >= OVERHEAD + ALIGN, "capacity too small for one block");
            assert!(CAP <= MAX_CAPACITY, "capacity exceeds 16-bit record fields");
        }

        let mut heap = Heap {
            arena: [0; CAP],
            total: CAP - OVERHEAD,
            used: 0,
        };
        Record {
            size: CAP - OVERHEAD,
            free: true,
            next: None,
        }
        .write(&mut heap.arena, 0);
        heap
    }

    /// Allocates `size` usable bytes and returns the payload's arena offset.
    ///
    /// The request is rounded up to a multiple of [`ALIGN`]; `size == 0` is
    /// accepted as a minimal allocation. The first free block large enough
    /// is taken (first-fit), splitting off the remainder as a new free block
    /// when it is big enough to hold a record and a minimal payload.
    ///
    /// Returns `None` when no free block can satisfy the request, leaving
    /// the directory untouched.
    pub fn allocate(&mut self, size: usize) -> Option<usize> {
        if size > self.total {
            return None;
        }
        let size = align_up(size);

        let mut at = Some(0);
        while let Some(offset) = at {
            let mut rec = Record::read(&self.arena, offset);
            if rec.free && rec.size >= size {
                // Split only when the leftover fits a record plus a minimal
                // payload; otherwise the caller gets the slack.
                if rec.size > size + OVERHEAD + ALIGN {
                    let carved = offset + OVERHEAD + size;
                    Record {
                        size: rec.size - size - OVERHEAD,
                        free: true,
                        next: rec.next,
                    }
                    .write(&mut self.arena, carved);
                    rec.size = size;
                    rec.next = Some(carved);
                }

                rec.free = false;
                rec.write(&mut self.arena, offset);
                self.used += rec.size;
                return Some(offset + OVERHEAD);
            }
            at = rec.next;
        }

        None
    }

    /// Releases an allocation, merging it with free neighbors.
    ///
    /// `ptr` must be a value previously returned by [`Heap::allocate`] on
    /// this heap and not yet released; [`NULL`] is accepted as a no-op.
    /// Anything else is rejected with a [`HeapError`] and leaves the heap
    /// unchanged.
    pub fn release(&mut self, ptr: usize) -> Result<(), HeapError> {
        if ptr == NULL {
            return Ok(());
        }
        let offset = self.check_live(ptr)?;

        let mut rec = Record::read(&self.arena, offset);
        rec.free = true;
        self.used -= rec.size;

        // Merge with the next block if it is free.
        if let Some(next) = rec.next {
            let next_rec = Record::read(&self.arena, next);
            if next_rec.free {
                rec.size += OVERHEAD + next_rec.size;
                rec.next = next_rec.next;
                scrub(&mut self.arena, next);
            }
        }
        rec.write(&mut self.arena, offset);

        // Walk from the head to find the predecessor; the directory is
        // singly linked, so this costs O(n) per release.
        let mut at = Some(0);
        while let Some(prev) = at {
            if prev == offset {
                break;
            }
            let prev_rec = Record::read(&self.arena, prev);
            if prev_rec.next == Some(offset) {
                if prev_rec.free {
                    Record {
                        size: prev_rec.size + OVERHEAD + rec.size,
                        free: true,
                        next: rec.next,
                    }
                    .write(&mut self.arena, prev);
                    scrub(&mut self.arena, offset);
                }
                break;
            }
            at = prev_rec.next;
        }

        Ok(())
    }

    /// Returns the payload bytes of a live allocation.
    pub fn payload(&self, ptr: usize) -> Result<&[u8], HeapError> {
        let offset = self.check_live(ptr)?;
        let rec = Record::read(&self.arena, offset);
        Ok(&self.arena[ptr..ptr + rec.size])
    }

    /// Returns the payload bytes of a live allocation, mutably. Callers
    /// fill and copy buffers through this slice.
    pub fn payload_mut(&mut self, ptr: usize) -> Result<&mut [u8], HeapError> {
        let offset = self.check_live(ptr)?;
        let rec = Record::read(&self.arena, offset);
        Ok(&mut self.arena[ptr..ptr + rec.size])
    }

    /// Reports aggregate usage.
    pub const fn stats(&self) -> HeapStats {
        HeapStats {
            total: self.total,
            used: self.used,
            free: self.total - self.used,
        }
    }

    /// Iterates over the directory in address order.
    pub fn blocks(&self) -> impl Iterator<Item = BlockInfo> + '_ {
        let mut at = Some(0);
        core::iter::from_fn(move || {
            let offset = at?;
            let rec = Record::read(&self.arena, offset);
            at = rec.next;
            Some(BlockInfo {
                offset,
                size: rec.size,
                free: rec.free,
            })
        })
    }

    /// Validates a caller-supplied pointer and returns its record's offset.
    fn check_live(&self, ptr: usize) -> Result<usize, HeapError> {
        if ptr < OVERHEAD || ptr > CAP || ptr % ALIGN != 0 {
            return Err(HeapError::BadPointer(ptr));
        }
        let offset = ptr - OVERHEAD;
        match tag(&self.arena, offset) {
            USED_TAG => Ok(offset),
            FREE_TAG => Err(HeapError::DoubleFree(ptr)),
            _ => Err(HeapError::BadPointer(ptr)),
        }
    }
}

impl<const CAP: usize> Default for Heap<CAP> {
    fn default() -> Self {
        Heap::new()
    }
}

/// Installs the system heap as one free block covering [`HEAP_SIZE`] bytes.
///
/// Call once at system start, before any [`allocate`] or [`release`].
/// Calling it again installs a fresh heap and silently discards every
/// outstanding pointer; nothing checks for that at runtime.
pub fn heap_init() {
    HEAP.lock().replace(Heap::new());
    info!("heap initialized, {} usable bytes", HEAP_SIZE - OVERHEAD);
}

/// Allocates from the system heap. See [`Heap::allocate`].
///
/// # Panics
/// Panics if [`heap_init`] has not been called.
pub fn allocate(size: usize) -> Option<usize> {
    HEAP.lock()
        .as_mut()
        .expect("heap not initialized")
        .allocate(size)
}

/// Releases an allocation back to the system heap. See [`Heap::release`].
///
/// # Panics
/// Panics if [`heap_init`] has not been called.
pub fn release(ptr: usize) -> Result<(), HeapError> {
    let result = HEAP
        .lock()
        .as_mut()
        .expect("heap not initialized")
        .release(ptr);
    if let Err(error) = result {
        warn!("release rejected: {}", error);
    }
    result
}

/// Reports aggregate usage of the system heap.
///
/// # Panics
/// Panics if [`heap_init`] has not been called.
pub fn heap_stats() -> HeapStats {
    HEAP.lock().as_ref().expect("heap not initialized").stats()
}
