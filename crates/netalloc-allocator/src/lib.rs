// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # netalloc-allocator
//!
//! Stable, collision-free integer id allocation for dynamically created
//! workloads (VNI overlay segments, ASN routing domains).
//!
//! Three layers, leaf to top:
//! - [`AllocationBitmap`]: fixed-size bit-vector over offsets `[0, size)`
//! - [`IdRange`]: binds a bitmap to an absolute interval `[base, max]`
//! - [`RangeManager`]: name -> id cache plus the single lock that serializes everything
//!
//! [`SegmentAllocators`] pairs a VNI and an ASN manager for one workload key.
//!
//! ```rust
//! use netalloc_allocator::RangeManager;
//!
//! let vnis = RangeManager::new(4096, 4098)?;
//! let id = vnis.allocate("default/frr-a")?;
//! assert_eq!(id, 4096);
//! assert_eq!(vnis.allocate("default/frr-a")?, id);
//! # Ok::<(), netalloc_allocator::AllocatorError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Absolute identifier. VNIs are 24-bit and ASNs 32-bit, both fit.
pub type Id = u32;

pub mod bitmap;
pub mod error;
pub mod manager;
pub mod range;
pub mod segments;

pub use bitmap::AllocationBitmap;
pub use error::{AllocatorError, AllocatorResult};
pub use manager::{AllocationStats, RangeManager, RehydrationReport};
pub use range::{IdKind, IdRange};
pub use segments::{scoped_name, SegmentAllocators, SegmentIds};
