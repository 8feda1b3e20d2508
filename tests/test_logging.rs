// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Console logging setup.

Kept in its own test binary: a process has exactly one global subscriber.

These tests validate:
- The configured level installs a console subscriber
- A second installation is refused instead of replacing the first
*/

use netalloc::prelude::*;

#[test]
fn test_console_logging_installs_once() {
    let mut config = NetallocConfig::default();
    config.logging.level = "debug".to_string();

    netalloc::init_console_logging(&config).unwrap();
    tracing::info!("console logging installed");

    assert!(netalloc::init_console_logging(&config).is_err());
}
