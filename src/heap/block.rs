//! Block-control records for the heap directory.
//!
//! Every block in the heap region, free or in use, starts with an 8-byte
//! record encoded in the arena itself. Records are addressed by arena offset
//! and linked into a single address-ordered forward chain; no raw pointers
//! are involved anywhere.
//!
//! Record layout (little-endian):
//! - bytes 0..2: payload size in bytes, always a multiple of [`ALIGN`]
//! - bytes 2..4: arena offset of the next record, or [`NO_NEXT`]
//! - bytes 4..6: provenance tag, [`FREE_TAG`] or [`USED_TAG`]
//! - bytes 6..8: reserved, keeps payloads 4-aligned

/// Minimum alignment of payloads, in bytes. Request sizes are rounded up to
/// a multiple of this before any bookkeeping.
pub const ALIGN: usize = 4;

/// Bytes of record bookkeeping preceding every payload.
pub const OVERHEAD: usize = 8;

/// Largest heap capacity the 16-bit record fields can address.
pub(crate) const MAX_CAPACITY: usize = 1 << 16;

/// `next` value marking the end of the directory. Not 4-aligned, so it can
/// never collide with a real record offset.
const NO_NEXT: u16 = 0xFFFF;

/// Tag carried by every free record.
pub(crate) const FREE_TAG: u16 = 0xF4EE;

/// Tag carried by every in-use record. Anything else at a tag position means
/// the offset was never issued by the allocator.
pub(crate) const USED_TAG: u16 = 0xA110;

/// Rounds `size` up to the next multiple of [`ALIGN`].
pub(crate) const fn align_up(size: usize) -> usize {
    (size + ALIGN - 1) & !(ALIGN - 1)
}

/// Errors reported for release or payload-access pointers that fail the
/// provenance checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeapError {
    /// The pointer was never issued by the allocator: out of range,
    /// misaligned, or not preceded by a live record.
    BadPointer(usize),
    /// The pointer's block has already been released.
    DoubleFree(usize),
}

impl core::fmt::Display for HeapError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HeapError::BadPointer(ptr) => {
                write!(f, "pointer {:#x} was never issued by the allocator", ptr)
            }
            HeapError::DoubleFree(ptr) => write!(f, "pointer {:#x} is already free", ptr),
        }
    }
}

/// A directory entry as seen by diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Arena offset of the block's record.
    pub offset: usize,
    /// Payload bytes following the record.
    pub size: usize,
    /// Whether the block is available for allocation.
    pub free: bool,
}

/// Decoded form of a block-control record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Record {
    pub size: usize,
    pub free: bool,
    pub next: Option<usize>,
}

impl Record {
    /// Reads the record starting at `at`. Offsets are only ever taken from
    /// the chain itself, so the slice indexing doubles as a bounds check.
    pub(crate) fn read(arena: &[u8], at: usize) -> Record {
        let next = load(arena, at + 2);
        Record {
            size: load(arena, at) as usize,
            free: load(arena, at + 4) == FREE_TAG,
            next: (next != NO_NEXT).then_some(next as usize),
        }
    }

    /// Encodes the record into the arena at `at`.
    pub(crate) fn write(&self, arena: &mut [u8], at: usize) {
        store(arena, at, self.size as u16);
        store(arena, at + 2, self.next.map_or(NO_NEXT, |next| next as u16));
        store(arena, at + 4, if self.free { FREE_TAG } else { USED_TAG });
    }
}

/// Reads the provenance tag of the record starting at `at`.
pub(crate) fn tag(arena: &[u8], at: usize) -> u16 {
    load(arena, at + 4)
}

/// Clears the tag of a record absorbed by coalescing, so stale pointers into
/// it report [`HeapError::BadPointer`] instead of looking like live records.
pub(crate) fn scrub(arena: &mut [u8], at: usize) {
    store(arena, at + 4, 0);
}

fn load(arena: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([arena[at], arena[at + 1]])
}

fn store(arena: &mut [u8], at: usize, value: u16) {
    arena[at..at + 2].copy_from_slice(&value.to_le_bytes());
}
