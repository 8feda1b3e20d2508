// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section in `netalloc_configuration.toml`. Every field
//! has a default, so a partial (or empty) file is accepted.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest VNI representable in a 24-bit VXLAN header
pub const VNI_MAX: u32 = 16_777_215;

/// Most ids a single interval may span (a 2 MiB bitmap). Covers the whole VNI space.
pub const MAX_RANGE_SIZE: u64 = 1 << 24;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NetallocConfig {
    pub vni: VniConfig,
    pub asn: AsnConfig,
    pub logging: LoggingConfig,
}

/// Overlay segment id interval (inclusive)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VniConfig {
    pub min: u32,
    pub max: u32,
}

impl Default for VniConfig {
    fn default() -> Self {
        Self {
            min: 4096,
            max: VNI_MAX,
        }
    }
}

impl VniConfig {
    pub fn bounds(&self) -> (u32, u32) {
        (self.min, self.max)
    }
}

/// Routing-domain number interval (inclusive)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AsnConfig {
    pub min: u32,
    pub max: u32,
}

impl Default for AsnConfig {
    fn default() -> Self {
        // 16-bit private use block
        Self {
            min: 64_512,
            max: 65_534,
        }
    }
}

impl AsnConfig {
    pub fn bounds(&self) -> (u32, u32) {
        (self.min, self.max)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error
    pub level: String,
    /// Base directory for file logs (only used with file logging enabled)
    pub log_dir: PathBuf,
    pub retention_days: u64,
    pub retention_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: NetallocConfig = toml::from_str("").unwrap();
        assert_eq!(config.vni.bounds(), (4096, VNI_MAX));
        assert_eq!(config.asn.bounds(), (64_512, 65_534));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: NetallocConfig = toml::from_str("[vni]\nmax = 8191\n").unwrap();
        assert_eq!(config.vni.bounds(), (4096, 8191));
        assert_eq!(config.asn.min, 64_512);
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(NetallocConfig::default()).unwrap();
        assert_eq!(json["asn"]["max"], 65_534);
    }
}
