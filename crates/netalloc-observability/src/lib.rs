// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # netalloc-observability
//!
//! Logging setup shared by every netalloc crate, with per-crate debug flags.
//!
//! ## Features
//! - `file-logging`: JSON log files with daily rotation and run-folder retention

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known netalloc crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &["netalloc", "netalloc-allocator", "netalloc-config"];

/// Tracing target for a crate name (`netalloc-config` -> `netalloc_config`)
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
