// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-size allocation bitmap
//!
//! Tracks used/free state for offsets `[0, size)`, one bit per offset packed
//! into 64-bit words. Allocation always picks the lowest free offset, so the
//! allocation order on a fresh map is `0, 1, 2, ...`.
//!
//! No internal synchronization: the owning manager serializes access.

use crate::error::{AllocatorError, AllocatorResult};

const WORD_BITS: usize = 64;

/// Contiguous allocation bitmap over `[0, size)`
#[derive(Debug, Clone)]
pub struct AllocationBitmap {
    words: Vec<u64>,
    size: usize,
    free: usize,
}

impl AllocationBitmap {
    /// Create a bitmap with all `size` offsets free
    pub fn new(size: usize) -> Self {
        Self {
            words: vec![0; size.div_ceil(WORD_BITS)],
            size,
            free: size,
        }
    }

    /// Mark `offset` as used.
    ///
    /// Returns `Ok(false)` when the offset is already held, which is not an error.
    pub fn allocate(&mut self, offset: usize) -> AllocatorResult<bool> {
        if offset >= self.size {
            return Err(AllocatorError::OutOfBounds {
                offset,
                size: self.size,
            });
        }
        let (word, mask) = Self::locate(offset);
        if self.words[word] & mask != 0 {
            return Ok(false);
        }
        self.words[word] |= mask;
        self.free -= 1;
        Ok(true)
    }

    /// Mark the smallest free offset as used and return it, or `None` when full
    pub fn allocate_next(&mut self) -> Option<usize> {
        if self.free == 0 {
            return None;
        }
        for (word_idx, word) in self.words.iter_mut().enumerate() {
            if *word == u64::MAX {
                continue;
            }
            let bit = (!*word).trailing_zeros() as usize;
            let offset = word_idx * WORD_BITS + bit;
            // Padding bits in the last word are never set
            if offset >= self.size {
                return None;
            }
            *word |= 1u64 << bit;
            self.free -= 1;
            return Some(offset);
        }
        None
    }

    /// Free `offset`. Releasing a free or out-of-bounds offset does nothing.
    pub fn release(&mut self, offset: usize) {
        if offset >= self.size {
            return;
        }
        let (word, mask) = Self::locate(offset);
        if self.words[word] & mask != 0 {
            self.words[word] &= !mask;
            self.free += 1;
        }
    }

    pub fn has(&self, offset: usize) -> bool {
        if offset >= self.size {
            return false;
        }
        let (word, mask) = Self::locate(offset);
        self.words[word] & mask != 0
    }

    /// Number of free offsets
    pub fn free(&self) -> usize {
        self.free
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Call `f` for every used offset in ascending order
    pub fn for_each<F: FnMut(usize)>(&self, mut f: F) {
        for (word_idx, &word) in self.words.iter().enumerate() {
            let mut remaining = word;
            while remaining != 0 {
                let bit = remaining.trailing_zeros() as usize;
                f(word_idx * WORD_BITS + bit);
                remaining &= remaining - 1;
            }
        }
    }

    #[inline]
    fn locate(offset: usize) -> (usize, u64) {
        (offset / WORD_BITS, 1u64 << (offset % WORD_BITS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used(map: &AllocationBitmap) -> Vec<usize> {
        let mut out = Vec::new();
        map.for_each(|offset| out.push(offset));
        out
    }

    #[test]
    fn test_allocate_next_is_lowest_free() {
        let mut map = AllocationBitmap::new(5);
        assert_eq!(map.allocate_next(), Some(0));
        assert_eq!(map.allocate_next(), Some(1));
        assert_eq!(map.allocate_next(), Some(2));

        map.release(1);
        assert_eq!(map.allocate_next(), Some(1));
        assert_eq!(map.allocate_next(), Some(3));
    }

    #[test]
    fn test_allocate_explicit_offset() {
        let mut map = AllocationBitmap::new(10);
        assert_eq!(map.allocate(3), Ok(true));
        assert_eq!(map.allocate(3), Ok(false));
        assert!(map.has(3));
        assert_eq!(map.free(), 9);
        assert_eq!(
            map.allocate(10),
            Err(AllocatorError::OutOfBounds {
                offset: 10,
                size: 10
            })
        );
    }

    #[test]
    fn test_full_map() {
        let mut map = AllocationBitmap::new(3);
        for expected in 0..3 {
            assert_eq!(map.allocate_next(), Some(expected));
        }
        assert_eq!(map.allocate_next(), None);
        assert_eq!(map.free(), 0);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut map = AllocationBitmap::new(4);
        map.allocate(2).unwrap();
        map.release(2);
        map.release(2);
        map.release(99);
        assert_eq!(map.free(), 4);
        assert!(!map.has(2));
    }

    #[test]
    fn test_word_boundaries() {
        let mut map = AllocationBitmap::new(130);
        for _ in 0..130 {
            assert!(map.allocate_next().is_some());
        }
        assert_eq!(map.allocate_next(), None);

        map.release(64);
        map.release(129);
        assert_eq!(map.allocate_next(), Some(64));
        assert_eq!(map.allocate_next(), Some(129));
        assert_eq!(map.allocate_next(), None);
    }

    #[test]
    fn test_for_each_ascending() {
        let mut map = AllocationBitmap::new(200);
        for offset in [150, 3, 64, 63, 0, 199] {
            map.allocate(offset).unwrap();
        }
        assert_eq!(used(&map), vec![0, 3, 63, 64, 150, 199]);
    }

    #[test]
    fn test_empty_map() {
        let mut map = AllocationBitmap::new(0);
        assert_eq!(map.allocate_next(), None);
        assert!(map.allocate(0).is_err());
        assert_eq!(map.free(), 0);
        assert!(used(&map).is_empty());
    }
}
