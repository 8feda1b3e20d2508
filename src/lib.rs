// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # netalloc
//!
//! Stable, collision-free identifier allocation for a reconciliation loop:
//! one VNI (overlay segment id) and one ASN (routing-domain number) per
//! workload, for the workload's whole lifetime.
//!
//! ## Quick Start
//!
//! ```rust
//! use netalloc::prelude::*;
//!
//! let config = NetallocConfig::default();
//! let allocators = build_segment_allocators(&config)?;
//!
//! let key = scoped_name("default", "frr-a");
//! let ids = allocators.allocate(&key)?;
//! assert_eq!(allocators.allocate(&key)?, ids);
//!
//! allocators.release(&key);
//! # Ok::<(), netalloc::NetallocError>(())
//! ```
//!
//! ## Restarts
//!
//! Bindings live in memory only. After a restart, pass the ids already
//! recorded on live resources to [`build_segment_allocators_with_bindings`];
//! they are replayed before the allocators are returned, so no new
//! allocation can reissue an id that is still in use.
//!
//! ## Crates
//! - [`allocator`]: bitmap, range, range manager, segment pairs
//! - [`config`]: TOML configuration with env / CLI overrides
//! - [`observability`]: logging setup

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use netalloc_allocator as allocator;
pub use netalloc_config as config;
pub use netalloc_observability as observability;

use netalloc_allocator::{AllocatorError, RehydrationReport, SegmentAllocators, SegmentIds};
use netalloc_config::{ConfigError, NetallocConfig};
use tracing::info;

/// Errors from wiring configuration into allocators
#[derive(Debug, thiserror::Error)]
pub enum NetallocError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Allocator(#[from] AllocatorError),
}

/// Validate `config` and build the VNI / ASN allocator pair from it
pub fn build_segment_allocators(config: &NetallocConfig) -> Result<SegmentAllocators, NetallocError> {
    netalloc_config::validate_config(config)?;
    let allocators = SegmentAllocators::new(config.vni.bounds(), config.asn.bounds())?;
    info!(
        "Segment allocators ready: {}, {}",
        allocators.vni().desc(),
        allocators.asn().desc()
    );
    Ok(allocators)
}

/// Like [`build_segment_allocators`], but replays `bindings` before returning.
///
/// Returns the `(vni, asn)` rehydration reports alongside the allocators;
/// callers decide whether failed records are fatal.
pub fn build_segment_allocators_with_bindings<I>(
    config: &NetallocConfig,
    bindings: I,
) -> Result<(SegmentAllocators, RehydrationReport, RehydrationReport), NetallocError>
where
    I: IntoIterator<Item = (String, SegmentIds)>,
{
    netalloc_config::validate_config(config)?;
    let built = SegmentAllocators::with_bindings(config.vni.bounds(), config.asn.bounds(), bindings)?;
    Ok(built)
}

/// Install console logging using `config.logging.level` and the process debug flags
pub fn init_console_logging(config: &NetallocConfig) -> anyhow::Result<()> {
    let flags = netalloc_observability::parse_debug_flags();
    netalloc_observability::init_console_logging(&flags, &config.logging.level)
}

/// Install console plus per-crate JSON file logging under `config.logging.log_dir`.
///
/// Run folders older than `retention_days`, or beyond the newest
/// `retention_runs`, are removed first. Keep the guard alive for the life of
/// the process; dropping it flushes the files.
#[cfg(feature = "file-logging")]
pub fn init_file_logging(
    config: &NetallocConfig,
) -> anyhow::Result<netalloc_observability::LoggingGuard> {
    let flags = netalloc_observability::parse_debug_flags();
    let logging = &config.logging;
    netalloc_observability::init_logging(
        &flags,
        &logging.level,
        &logging.log_dir,
        logging.retention_days,
        logging.retention_runs,
    )
}

pub mod prelude {
    pub use crate::{
        build_segment_allocators, build_segment_allocators_with_bindings, NetallocError,
    };
    pub use netalloc_allocator::{
        scoped_name, AllocationStats, AllocatorError, AllocatorResult, Id, IdKind, IdRange,
        RangeManager, RehydrationReport, SegmentAllocators, SegmentIds,
    };
    pub use netalloc_config::{load_config, validate_config, NetallocConfig};
}
