/*
Copyright © 2025–2026 the kheap authors

This file is part of kheap.

kheap is free software: you can redistribute it and/or modify it under the terms of the GNU General
Public License as published by the Free Software Foundation, either version 3 of the License, or (at
your option) any later version.

kheap is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the
implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public
License for more details.

You should have received a copy of the GNU General Public License along with kheap. If not, see
<https://www.gnu.org/licenses/>.
*/

//! Kernel heap allocation for kheap.
//!
//! This crate provides:
//! - A fixed-size heap region managed by a first-fit allocator
//! - Block splitting on allocation and eager coalescing on release
//! - Aggregate usage reporting for diagnostics
//! - Port I/O primitives for driver collaborators (bare metal only)

#![cfg_attr(not(test), no_std)]

pub mod heap;
pub mod macros;
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod port;
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod serial;

pub use heap::{
    ALIGN, BlockInfo, HEAP, HEAP_SIZE, Heap, HeapError, HeapStats, NULL, OVERHEAD, allocate,
    heap_init, heap_stats, release,
};
