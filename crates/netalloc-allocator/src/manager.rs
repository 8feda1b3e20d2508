// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Name-keyed range manager
//!
//! Makes allocation against one [`IdRange`] idempotent per external name and
//! safe for concurrent callers. The binding table and the range live behind a
//! single lock; every public operation takes it exactly once, so no partial
//! state is ever observable.
//!
//! Per-name lifecycle: `Unbound -> Bound` (allocate / reserve) `-> Unbound` (release).

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{AllocatorError, AllocatorResult};
use crate::range::{IdKind, IdRange};
use crate::Id;

/// Thread-safe, idempotent id allocation manager.
///
/// Clones share the same state.
#[derive(Clone)]
pub struct RangeManager {
    inner: Arc<Mutex<RangeManagerInner>>,
}

struct RangeManagerInner {
    range: IdRange,
    by_name: AHashMap<String, Id>,
    by_id: AHashMap<Id, String>,
}

/// Outcome of replaying externally observed bindings
#[derive(Debug, Default)]
pub struct RehydrationReport {
    /// Bindings now present in the table (including ones that already were)
    pub restored: usize,
    pub failed: Vec<(String, Id, AllocatorError)>,
}

impl RehydrationReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Allocation statistics
#[derive(Debug, Clone, Serialize)]
pub struct AllocationStats {
    pub kind: IdKind,
    pub base: Id,
    pub max: Id,
    pub capacity: usize,
    pub used: usize,
    pub free: usize,
    pub bound_names: usize,
    pub utilization: f64,
}

impl RangeManagerInner {
    fn allocate(&mut self, name: &str) -> AllocatorResult<Id> {
        if let Some(&id) = self.by_name.get(name) {
            return Ok(id);
        }
        let id = self.range.allocate_next()?;
        self.bind(name, id);
        Ok(id)
    }

    /// Returns the id `name` ends up bound to. A name that is already bound
    /// keeps its id, even when `id` differs.
    fn reserve(&mut self, name: &str, id: Id) -> AllocatorResult<Id> {
        if let Some(&bound) = self.by_name.get(name) {
            return Ok(bound);
        }
        if !self.range.contains(id) {
            return Err(AllocatorError::OutOfRange {
                id,
                range: self.range.desc(),
            });
        }
        if let Some(holder) = self.by_id.get(&id) {
            return Err(AllocatorError::Conflict {
                id,
                holder: holder.clone(),
            });
        }
        self.range.allocate(id)?;
        self.bind(name, id);
        Ok(id)
    }

    fn release(&mut self, name: &str) -> Option<Id> {
        let id = self.by_name.remove(name)?;
        self.by_id.remove(&id);
        self.range.release(id);
        Some(id)
    }

    fn bind(&mut self, name: &str, id: Id) {
        self.by_name.insert(name.to_string(), id);
        self.by_id.insert(id, name.to_string());
    }
}

impl RangeManager {
    /// Create a manager over `[base, max]`
    pub fn new(base: Id, max: Id) -> AllocatorResult<Self> {
        Self::with_kind(IdKind::Generic, base, max)
    }

    pub fn with_kind(kind: IdKind, base: Id, max: Id) -> AllocatorResult<Self> {
        let range = IdRange::with_kind(kind, base, max)?;
        info!("Created range manager for {}", range);
        Ok(Self {
            inner: Arc::new(Mutex::new(RangeManagerInner {
                range,
                by_name: AHashMap::new(),
                by_id: AHashMap::new(),
            })),
        })
    }

    /// Create a manager and replay `bindings` into it before handing it out.
    ///
    /// Nothing else can hold the manager yet, so no `allocate` can observe a
    /// partially rehydrated table.
    pub fn with_bindings<I>(
        kind: IdKind,
        base: Id,
        max: Id,
        bindings: I,
    ) -> AllocatorResult<(Self, RehydrationReport)>
    where
        I: IntoIterator<Item = (String, Id)>,
    {
        let manager = Self::with_kind(kind, base, max)?;
        let report = manager.rehydrate(bindings);
        Ok((manager, report))
    }

    /// Allocate an id for `name`, or return the one it already holds.
    ///
    /// Fails with [`AllocatorError::Exhausted`] when no id is free; the caller
    /// should retry after another name is released.
    pub fn allocate(&self, name: &str) -> AllocatorResult<Id> {
        let mut inner = self.inner.lock();
        match inner.allocate(name) {
            Ok(id) => {
                debug!("{}: '{}' -> {}", inner.range, name, id);
                Ok(id)
            }
            Err(err) => {
                warn!("{}: cannot allocate for '{}': {}", inner.range, name, err);
                Err(err)
            }
        }
    }

    /// Drop the binding for `name` and return its id to the pool
    pub fn release(&self, name: &str) -> Option<Id> {
        let mut inner = self.inner.lock();
        let released = inner.release(name);
        if let Some(id) = released {
            debug!("{}: released {} from '{}'", inner.range, id, name);
        }
        released
    }

    /// Bind `name` to a caller-chosen `id`.
    ///
    /// Used to rehydrate the table from ids already recorded on live resources.
    /// If `name` already holds a different id the call succeeds and the existing
    /// binding is kept; release the name first to move it.
    pub fn reserve(&self, name: &str, id: Id) -> AllocatorResult<()> {
        let mut inner = self.inner.lock();
        match inner.reserve(name, id) {
            Ok(bound) if bound != id => {
                warn!(
                    "{}: '{}' already holds {}, ignoring reserve of {}",
                    inner.range, name, bound, id
                );
                Ok(())
            }
            Ok(_) => {
                debug!("{}: reserved {} for '{}'", inner.range, id, name);
                Ok(())
            }
            Err(err) => {
                warn!("{}: cannot reserve {} for '{}': {}", inner.range, id, name, err);
                Err(err)
            }
        }
    }

    /// Reserve every `(name, id)` pair under a single lock acquisition.
    ///
    /// Failures are collected, not fatal: one stale record must not block the rest.
    pub fn rehydrate<I>(&self, bindings: I) -> RehydrationReport
    where
        I: IntoIterator<Item = (String, Id)>,
    {
        let mut inner = self.inner.lock();
        let mut report = RehydrationReport::default();
        for (name, id) in bindings {
            match inner.reserve(&name, id) {
                Ok(bound) => {
                    if bound != id {
                        warn!(
                            "{}: '{}' already holds {}, keeping it over {}",
                            inner.range, name, bound, id
                        );
                    }
                    report.restored += 1;
                }
                Err(err) => {
                    warn!("{}: skipping binding '{}' -> {}: {}", inner.range, name, id, err);
                    report.failed.push((name, id, err));
                }
            }
        }
        info!(
            "{}: rehydrated {} bindings ({} failed)",
            inner.range,
            report.restored,
            report.failed.len()
        );
        report
    }

    pub fn lookup(&self, name: &str) -> Option<Id> {
        self.inner.lock().by_name.get(name).copied()
    }

    /// Name currently bound to `id`
    pub fn holder(&self, id: Id) -> Option<String> {
        self.inner.lock().by_id.get(&id).cloned()
    }

    pub fn has(&self, id: Id) -> bool {
        self.inner.lock().range.has(id)
    }

    /// Snapshot of all bindings, ordered by id
    pub fn bindings(&self) -> Vec<(String, Id)> {
        let inner = self.inner.lock();
        let mut out = Vec::with_capacity(inner.by_id.len());
        inner.range.for_each(|id| {
            if let Some(name) = inner.by_id.get(&id) {
                out.push((name.clone(), id));
            }
        });
        out
    }

    pub fn len(&self) -> usize {
        self.inner.lock().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn free(&self) -> usize {
        self.inner.lock().range.free()
    }

    pub fn used(&self) -> usize {
        self.inner.lock().range.used()
    }

    pub fn desc(&self) -> String {
        self.inner.lock().range.desc()
    }

    pub fn stats(&self) -> AllocationStats {
        let inner = self.inner.lock();
        let capacity = inner.range.size();
        let used = inner.range.used();
        AllocationStats {
            kind: inner.range.kind(),
            base: inner.range.base(),
            max: inner.range.max(),
            capacity,
            used,
            free: inner.range.free(),
            bound_names: inner.by_name.len(),
            utilization: used as f64 / capacity as f64,
        }
    }
}

impl std::fmt::Debug for RangeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("RangeManager")
            .field("range", &inner.range.desc())
            .field("bound", &inner.by_name.len())
            .finish()
    }
}
