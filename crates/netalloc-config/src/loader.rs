// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones win:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, NetallocConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Find the configuration file
///
/// Search order:
/// 1. `NETALLOC_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("NETALLOC_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by NETALLOC_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet NETALLOC_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the file is not found or contains invalid TOML.
/// Validation is separate, see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<NetallocConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: NetallocConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_into<T: std::str::FromStr>(value: Option<impl AsRef<str>>, target: &mut T) {
    if let Some(parsed) = value.and_then(|v| v.as_ref().trim().parse::<T>().ok()) {
        *target = parsed;
    }
}

/// Apply environment variable overrides
///
/// Supported environment variables:
/// - `NETALLOC_VNI_MIN` -> `vni.min`
/// - `NETALLOC_VNI_MAX` -> `vni.max`
/// - `NETALLOC_ASN_MIN` -> `asn.min`
/// - `NETALLOC_ASN_MAX` -> `asn.max`
/// - `NETALLOC_LOG_LEVEL` -> `logging.level`
/// - `NETALLOC_LOG_DIR` -> `logging.log_dir`
///
/// Unparseable numeric values are ignored.
pub fn apply_environment_overrides(config: &mut NetallocConfig) {
    parse_into(env::var("NETALLOC_VNI_MIN").ok(), &mut config.vni.min);
    parse_into(env::var("NETALLOC_VNI_MAX").ok(), &mut config.vni.max);
    parse_into(env::var("NETALLOC_ASN_MIN").ok(), &mut config.asn.min);
    parse_into(env::var("NETALLOC_ASN_MAX").ok(), &mut config.asn.max);

    if let Ok(value) = env::var("NETALLOC_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("NETALLOC_LOG_DIR") {
        config.logging.log_dir = PathBuf::from(value);
    }
}

/// Apply CLI argument overrides
///
/// Keys: `vni_min`, `vni_max`, `asn_min`, `asn_max`, `log_level`.
pub fn apply_cli_overrides(config: &mut NetallocConfig, cli_args: &HashMap<String, String>) {
    parse_into(cli_args.get("vni_min"), &mut config.vni.min);
    parse_into(cli_args.get("vni_max"), &mut config.vni.max);
    parse_into(cli_args.get("asn_min"), &mut config.asn.min);
    parse_into(cli_args.get("asn_max"), &mut config.asn.max);

    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}
