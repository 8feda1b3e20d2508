// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Absolute id range backed by an [`AllocationBitmap`]
//!
//! Binds a bitmap to the closed interval `[base, max]`; offsets are `id - base`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bitmap::AllocationBitmap;
use crate::error::{AllocatorError, AllocatorResult};
use crate::Id;

/// What a range hands out. Only used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdKind {
    /// Overlay-network segment id
    Vni,
    /// Routing-domain (autonomous system) number
    Asn,
    Generic,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IdKind::Vni => "VNI",
            IdKind::Asn => "ASN",
            IdKind::Generic => "ID",
        };
        f.write_str(label)
    }
}

/// Number of ids in `[base, max]`, or `None` if it does not fit a `usize`
fn interval_size(base: Id, max: Id) -> Option<usize> {
    usize::try_from(max.checked_sub(base)?)
        .ok()?
        .checked_add(1)
}

/// A bounded, contiguous interval of allocatable ids
#[derive(Debug, Clone)]
pub struct IdRange {
    kind: IdKind,
    base: Id,
    max: Id,
    map: AllocationBitmap,
}

impl IdRange {
    pub fn new(base: Id, max: Id) -> AllocatorResult<Self> {
        Self::with_kind(IdKind::Generic, base, max)
    }

    pub fn with_kind(kind: IdKind, base: Id, max: Id) -> AllocatorResult<Self> {
        if base > max {
            return Err(AllocatorError::InvalidRange { base, max });
        }
        let size = interval_size(base, max).ok_or(AllocatorError::RangeTooLarge { base, max })?;
        Ok(Self {
            kind,
            base,
            max,
            map: AllocationBitmap::new(size),
        })
    }

    pub fn kind(&self) -> IdKind {
        self.kind
    }

    pub fn base(&self) -> Id {
        self.base
    }

    pub fn max(&self) -> Id {
        self.max
    }

    /// Number of ids in the interval
    pub fn size(&self) -> usize {
        self.map.size()
    }

    pub fn contains(&self, id: Id) -> bool {
        (self.base..=self.max).contains(&id)
    }

    fn offset_of(&self, id: Id) -> Option<usize> {
        self.contains(id).then(|| (id - self.base) as usize)
    }

    fn id_at(&self, offset: usize) -> Id {
        self.base + offset as Id
    }

    /// Allocate a specific id
    pub fn allocate(&mut self, id: Id) -> AllocatorResult<()> {
        let offset = self.offset_of(id).ok_or(AllocatorError::InvalidId {
            id,
            base: self.base,
            max: self.max,
        })?;
        if !self.map.allocate(offset)? {
            return Err(AllocatorError::AlreadyAllocated { id });
        }
        Ok(())
    }

    /// Allocate the lowest free id
    pub fn allocate_next(&mut self) -> AllocatorResult<Id> {
        match self.map.allocate_next() {
            Some(offset) => Ok(self.id_at(offset)),
            None => Err(AllocatorError::Exhausted { range: self.desc() }),
        }
    }

    /// Return `id` to the pool. Ids outside the interval are ignored.
    pub fn release(&mut self, id: Id) {
        if let Some(offset) = self.offset_of(id) {
            self.map.release(offset);
        }
    }

    pub fn has(&self, id: Id) -> bool {
        self.offset_of(id).is_some_and(|offset| self.map.has(offset))
    }

    /// Count of free ids
    pub fn free(&self) -> usize {
        self.map.free()
    }

    /// Count of allocated ids
    pub fn used(&self) -> usize {
        self.size() - self.free()
    }

    /// Call `f` with every allocated id, ascending
    pub fn for_each<F: FnMut(Id)>(&self, mut f: F) {
        self.map.for_each(|offset| f(self.id_at(offset)));
    }

    pub fn allocated(&self) -> Vec<Id> {
        let mut ids = Vec::with_capacity(self.used());
        self.for_each(|id| ids.push(id));
        ids
    }

    pub fn desc(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} range [{}-{}]", self.kind, self.base, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_range() {
        assert_eq!(
            IdRange::new(10, 9).unwrap_err(),
            AllocatorError::InvalidRange { base: 10, max: 9 }
        );
    }

    #[test]
    fn test_sequential_allocation_is_deterministic() {
        let mut range = IdRange::new(500, 509).unwrap();
        let ids: Vec<Id> = (0..10).map(|_| range.allocate_next().unwrap()).collect();
        assert_eq!(ids, (500..510).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_id_exhaustion() {
        let mut range = IdRange::new(100, 100).unwrap();
        assert_eq!(range.allocate_next(), Ok(100));
        assert!(matches!(
            range.allocate_next(),
            Err(AllocatorError::Exhausted { .. })
        ));
    }

    #[test]
    fn test_release_and_reuse() {
        let mut range = IdRange::with_kind(IdKind::Vni, 4096, 4098).unwrap();
        assert_eq!(range.allocate_next(), Ok(4096));
        assert_eq!(range.allocate_next(), Ok(4097));
        assert_eq!(range.allocate_next(), Ok(4098));

        let err = range.allocate_next().unwrap_err();
        assert_eq!(
            err,
            AllocatorError::Exhausted {
                range: "VNI range [4096-4098]".to_string()
            }
        );

        range.release(4097);
        assert_eq!(range.free(), 1);
        assert_eq!(range.allocate_next(), Ok(4097));
        assert_eq!(range.free(), 0);
    }

    #[test]
    fn test_explicit_allocation() {
        let mut range = IdRange::new(10, 20).unwrap();
        range.allocate(15).unwrap();
        assert!(range.has(15));
        assert_eq!(
            range.allocate(15),
            Err(AllocatorError::AlreadyAllocated { id: 15 })
        );
        assert_eq!(
            range.allocate(21),
            Err(AllocatorError::InvalidId {
                id: 21,
                base: 10,
                max: 20
            })
        );
        assert_eq!(range.used(), 1);
        assert_eq!(range.free(), 10);
    }

    #[test]
    fn test_release_outside_range_is_ignored() {
        let mut range = IdRange::new(10, 20).unwrap();
        range.allocate(10).unwrap();
        range.release(5);
        range.release(Id::MAX);
        assert_eq!(range.used(), 1);
        assert!(!range.has(5));
    }

    #[test]
    fn test_for_each_translates_to_absolute_ids() {
        let mut range = IdRange::new(64_512, 65_534).unwrap();
        range.allocate(65_000).unwrap();
        range.allocate(64_512).unwrap();
        range.allocate(65_534).unwrap();
        assert_eq!(range.allocated(), vec![64_512, 65_000, 65_534]);
    }

    #[test]
    fn test_desc() {
        let range = IdRange::with_kind(IdKind::Asn, 64_512, 65_534).unwrap();
        assert_eq!(range.desc(), "ASN range [64512-65534]");
        assert_eq!(IdRange::new(1, 2).unwrap().desc(), "ID range [1-2]");
    }

    #[test]
    fn test_interval_size_does_not_overflow() {
        assert_eq!(interval_size(7, 7), Some(1));
        assert_eq!(interval_size(8, 7), None);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(interval_size(0, Id::MAX), Some(1 << 32));
        #[cfg(target_pointer_width = "32")]
        assert_eq!(interval_size(0, Id::MAX), None);
    }

    #[test]
    fn test_full_width_bounds() {
        let mut range = IdRange::new(Id::MAX - 1, Id::MAX).unwrap();
        assert_eq!(range.size(), 2);
        assert_eq!(range.allocate_next(), Ok(Id::MAX - 1));
        assert_eq!(range.allocate_next(), Ok(Id::MAX));
    }
}
