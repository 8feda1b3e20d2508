// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Paired VNI / ASN allocation for one workload
//!
//! A workload gets one routing-domain number and one overlay segment id, both
//! keyed by the same scoped name (`namespace/name`). The two managers are
//! independent; this type only keeps them in step.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AllocatorResult;
use crate::manager::{AllocationStats, RangeManager, RehydrationReport};
use crate::range::IdKind;
use crate::Id;

/// Identifiers bound to a single workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentIds {
    pub asn: Id,
    pub vni: Id,
}

/// Stable binding key for a namespaced resource
pub fn scoped_name(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}

#[derive(Debug, Clone)]
pub struct SegmentAllocators {
    vni: RangeManager,
    asn: RangeManager,
}

impl SegmentAllocators {
    /// Create both managers. Each interval is `(min, max)`, inclusive.
    pub fn new(vni: (Id, Id), asn: (Id, Id)) -> AllocatorResult<Self> {
        Ok(Self {
            vni: RangeManager::with_kind(IdKind::Vni, vni.0, vni.1)?,
            asn: RangeManager::with_kind(IdKind::Asn, asn.0, asn.1)?,
        })
    }

    /// Create both managers and replay previously issued ids before returning.
    pub fn with_bindings<I>(
        vni: (Id, Id),
        asn: (Id, Id),
        bindings: I,
    ) -> AllocatorResult<(Self, RehydrationReport, RehydrationReport)>
    where
        I: IntoIterator<Item = (String, SegmentIds)>,
    {
        let allocators = Self::new(vni, asn)?;
        let (vni_bindings, asn_bindings): (Vec<_>, Vec<_>) = bindings
            .into_iter()
            .map(|(key, ids)| ((key.clone(), ids.vni), (key, ids.asn)))
            .unzip();
        let vni_report = allocators.vni.rehydrate(vni_bindings);
        let asn_report = allocators.asn.rehydrate(asn_bindings);
        Ok((allocators, vni_report, asn_report))
    }

    pub fn vni(&self) -> &RangeManager {
        &self.vni
    }

    pub fn asn(&self) -> &RangeManager {
        &self.asn
    }

    /// Allocate (or look up) both ids for `key`.
    ///
    /// The ASN is bound first. If the VNI cannot be allocated the ASN stays
    /// bound to `key`, and a retry returns the same ASN. Only `release` unbinds it.
    pub fn allocate(&self, key: &str) -> AllocatorResult<SegmentIds> {
        let asn = self.asn.allocate(key)?;
        match self.vni.allocate(key) {
            Ok(vni) => {
                debug!("'{}' -> asn {}, vni {}", key, asn, vni);
                Ok(SegmentIds { asn, vni })
            }
            Err(err) => {
                warn!("'{}' keeps asn {} without a vni: {}", key, asn, err);
                Err(err)
            }
        }
    }

    /// Bind `key` to known ids. An ASN reserved before a refused VNI stays bound.
    pub fn reserve(&self, key: &str, ids: SegmentIds) -> AllocatorResult<()> {
        self.asn.reserve(key, ids.asn)?;
        self.vni.reserve(key, ids.vni)
    }

    /// Release whatever `key` holds. Returns the pair only if both ids were bound.
    pub fn release(&self, key: &str) -> Option<SegmentIds> {
        let asn = self.asn.release(key);
        let vni = self.vni.release(key);
        match (asn, vni) {
            (Some(asn), Some(vni)) => Some(SegmentIds { asn, vni }),
            _ => None,
        }
    }

    pub fn lookup(&self, key: &str) -> Option<SegmentIds> {
        Some(SegmentIds {
            asn: self.asn.lookup(key)?,
            vni: self.vni.lookup(key)?,
        })
    }

    /// `(vni, asn)` statistics
    pub fn stats(&self) -> (AllocationStats, AllocationStats) {
        (self.vni.stats(), self.asn.stats())
    }
}
