//! Scratch arena for transient translation text
//!
//! A fixed-capacity bump allocator. Allocations only move the cursor forward;
//! nothing is released until the arena itself is dropped. One arena is built
//! per translation call and handed down by reference. The arena is `!Sync`,
//! so concurrent translations cannot share one.

use crate::error::ArenaError;
use std::cell::{Cell, UnsafeCell};

/// Fixed-capacity bump allocator handing out `&str` slices
pub struct ScratchArena {
    /// Backing storage, written only through raw pointers
    memory: Box<[UnsafeCell<u8>]>,
    /// Offset of the first free byte
    cursor: Cell<usize>,
}

impl ScratchArena {
    /// Create a new arena with room for `capacity` bytes
    pub fn new(capacity: usize) -> Self {
        Self {
            memory: (0..capacity).map(|_| UnsafeCell::new(0)).collect(),
            cursor: Cell::new(0),
        }
    }

    /// Total capacity in bytes
    pub fn capacity(&self) -> usize {
        self.memory.len()
    }

    /// Bytes handed out so far
    pub fn used(&self) -> usize {
        self.cursor.get()
    }

    /// Bytes still available
    pub fn remaining(&self) -> usize {
        self.capacity() - self.used()
    }

    /// Reserve `bytes` fresh bytes
    #[allow(clippy::mut_from_ref)]
    fn allocate(&self, bytes: usize) -> Result<&mut [u8], ArenaError> {
        let start = self.cursor.get();
        let end = start
            .checked_add(bytes)
            .filter(|&end| end <= self.capacity())
            .ok_or(ArenaError::OutOfMemory {
                requested: bytes,
                used: start,
                capacity: self.capacity(),
            })?;
        self.cursor.set(end);

        // Safety: [start, end) lies inside `memory` and has never been handed
        // out before; the cursor only moves forward, so no other live slice
        // aliases this range.
        unsafe {
            let ptr = UnsafeCell::raw_get(self.memory.as_ptr().add(start));
            Ok(std::slice::from_raw_parts_mut(ptr, bytes))
        }
    }

    /// Copy `s` into the arena
    pub fn alloc_str(&self, s: &str) -> Result<&str, ArenaError> {
        let buf = self.allocate(s.len())?;
        buf.copy_from_slice(s.as_bytes());
        // Safety: bytes copied verbatim from a valid str
        Ok(unsafe { std::str::from_utf8_unchecked(buf) })
    }

    /// Copy `s` into the arena with ASCII letters upper-cased
    pub fn alloc_upper(&self, s: &str) -> Result<&str, ArenaError> {
        let buf = self.allocate(s.len())?;
        buf.copy_from_slice(s.as_bytes());
        buf.make_ascii_uppercase();
        // Safety: ASCII case mapping keeps UTF-8 valid
        Ok(unsafe { std::str::from_utf8_unchecked(buf) })
    }

    /// Copy `s` into the arena with ASCII letters lower-cased
    pub fn alloc_lower(&self, s: &str) -> Result<&str, ArenaError> {
        let buf = self.allocate(s.len())?;
        buf.copy_from_slice(s.as_bytes());
        buf.make_ascii_lowercase();
        // Safety: ASCII case mapping keeps UTF-8 valid
        Ok(unsafe { std::str::from_utf8_unchecked(buf) })
    }
}

impl std::fmt::Debug for ScratchArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchArena")
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .finish()
    }
}
