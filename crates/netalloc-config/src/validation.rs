// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks that each id interval is well-formed and fits its protocol field.
//! All problems are collected and reported together.

use crate::{ConfigError, ConfigResult, NetallocConfig, MAX_RANGE_SIZE, VNI_MAX};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    InvertedRange { section: String, min: u32, max: u32 },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvertedRange { section, min, max } => {
                write!(f, "{}.min = {} is greater than {}.max = {}", section, min, section, max)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &NetallocConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Run every check and return the individual failures
pub fn collect_errors(config: &NetallocConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_ranges(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

fn validate_ranges(config: &NetallocConfig, errors: &mut Vec<ConfigValidationError>) {
    for (section, (min, max)) in [("vni", config.vni.bounds()), ("asn", config.asn.bounds())] {
        if min > max {
            errors.push(ConfigValidationError::InvertedRange {
                section: section.to_string(),
                min,
                max,
            });
        } else if u64::from(max - min) + 1 > MAX_RANGE_SIZE {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("{}.max", section),
                reason: format!("interval spans more than {} ids", MAX_RANGE_SIZE),
            });
        }
    }

    if config.vni.max > VNI_MAX {
        errors.push(ConfigValidationError::InvalidValue {
            field: "vni.max".to_string(),
            reason: format!("must fit in 24 bits (<= {})", VNI_MAX),
        });
    }

    // AS 0 is reserved
    if config.asn.min == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "asn.min".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_logging(config: &NetallocConfig, errors: &mut Vec<ConfigValidationError>) {
    const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
    if !LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", LEVELS.join(", ")),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&NetallocConfig::default()).is_ok());
    }

    #[test]
    fn test_inverted_range() {
        let mut config = NetallocConfig::default();
        config.asn.min = 65_000;
        config.asn.max = 64_999;

        let result = validate_config(&config);
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("asn.min = 65000"));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_vni_wider_than_24_bits() {
        let mut config = NetallocConfig::default();
        config.vni.max = VNI_MAX + 1;

        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("vni.max"));
    }

    #[test]
    fn test_oversized_asn_interval() {
        let mut config = NetallocConfig::default();
        config.asn.min = 1;
        config.asn.max = u32::MAX;

        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("asn.max"));

        // 4-byte private block, exactly at the limit
        config.asn.min = 4_200_000_000;
        config.asn.max = 4_200_000_000 + (MAX_RANGE_SIZE as u32) - 1;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = NetallocConfig::default();
        config.vni.min = 20;
        config.vni.max = 10;
        config.asn.min = 0;
        config.logging.level = "verbose".to_string();

        assert_eq!(collect_errors(&config).len(), 3);
    }

    #[test]
    fn test_single_id_range_is_valid() {
        let mut config = NetallocConfig::default();
        config.vni.min = 100;
        config.vni.max = 100;
        assert!(validate_config(&config).is_ok());
    }
}
