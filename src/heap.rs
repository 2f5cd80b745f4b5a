//! Heap allocation for kheap.
//!
//! This module provides:
//! - A block directory threaded through the heap region as offset-linked records
//! - First-fit allocation with block splitting
//! - Eager coalescing of adjacent free blocks on release
//! - Usage statistics and bounds-checked payload access

pub mod alloc;
pub mod block;

pub use alloc::{HEAP, HEAP_SIZE, Heap, HeapStats, NULL, allocate, heap_init, heap_stats, release};
pub use block::{ALIGN, BlockInfo, HeapError, OVERHEAD};
