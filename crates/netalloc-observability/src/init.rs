// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output is always available. With the `file-logging` feature,
//! [`init_logging`] also writes JSON logs into a timestamped run folder:
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       ├── netalloc-allocator.log
//!       ├── netalloc-config.log
//!       └── netalloc.log (combined)
//! ```

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;

/// Build the filter for `flags`, falling back to `default_level` for everything else
pub fn build_filter(flags: &CrateDebugFlags, default_level: &str) -> Result<EnvFilter> {
    let directives = flags.to_filter_string(default_level);
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter '{}'", directives))
}

/// Install a human-readable console subscriber.
///
/// Fails if the filter is invalid or a global subscriber is already set.
pub fn init_console_logging(flags: &CrateDebugFlags, default_level: &str) -> Result<()> {
    let filter = build_filter(flags, default_level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

#[cfg(feature = "file-logging")]
pub use file::{init_logging, LoggingGuard};

#[cfg(feature = "file-logging")]
mod file {
    use std::path::{Path, PathBuf};

    use anyhow::{anyhow, Context, Result};
    use chrono::{NaiveDateTime, Utc};
    use tracing_appender::rolling;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Layer, Registry};

    use super::build_filter;
    use crate::cli::CrateDebugFlags;
    use crate::{crate_target, KNOWN_CRATES};

    /// Keeps the non-blocking writers alive; logs are flushed on drop
    pub struct LoggingGuard {
        _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
        log_dir: PathBuf,
    }

    impl LoggingGuard {
        /// The run folder logs are written to
        pub fn log_dir(&self) -> &Path {
            &self.log_dir
        }
    }

    /// Initialize console output plus per-crate and combined JSON log files
    ///
    /// # Arguments
    /// * `debug_flags` - Per-crate debug flags for filtering
    /// * `default_level` - Level for everything not explicitly enabled
    /// * `log_dir` - Base directory for run folders
    /// * `retention_days` - Remove run folders older than this
    /// * `retention_runs` - Keep at most this many run folders
    pub fn init_logging(
        debug_flags: &CrateDebugFlags,
        default_level: &str,
        log_dir: &Path,
        retention_days: u64,
        retention_runs: usize,
    ) -> Result<LoggingGuard> {
        let run_folder = log_dir.join(format!("run_{}", Utc::now().format("%Y%m%d_%H%M%S")));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        cleanup_old_logs(log_dir, retention_days, retention_runs, &run_folder)?;

        let mut layers = Vec::new();
        let mut file_guards = Vec::new();

        let console_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_filter(build_filter(debug_flags, default_level)?)
            .boxed();
        layers.push(console_layer);

        for crate_name in KNOWN_CRATES {
            let appender = rolling::daily(&run_folder, format!("{}.log", crate_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            file_guards.push(guard);

            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(EnvFilter::try_new(format!("{}=debug", crate_target(crate_name)))?)
                .boxed();
            layers.push(file_layer);
        }

        let combined = rolling::daily(&run_folder, "netalloc.log");
        let (combined_writer, combined_guard) = tracing_appender::non_blocking(combined);
        file_guards.push(combined_guard);
        let combined_layer = tracing_subscriber::fmt::layer()
            .with_writer(combined_writer)
            .with_target(true)
            .json()
            .with_filter(build_filter(debug_flags, default_level)?)
            .boxed();
        layers.push(combined_layer);

        Registry::default()
            .with(layers)
            .try_init()
            .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

        Ok(LoggingGuard {
            _file_guards: file_guards,
            log_dir: run_folder,
        })
    }

    /// Remove run folders older than `retention_days`, then trim to the newest
    /// `retention_runs`. `current` is never removed.
    pub(super) fn cleanup_old_logs(
        base_log_dir: &Path,
        retention_days: u64,
        retention_runs: usize,
        current: &Path,
    ) -> Result<()> {
        if !base_log_dir.exists() {
            return Ok(());
        }

        let cutoff = Utc::now().naive_utc() - chrono::Duration::days(retention_days as i64);
        let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();

        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if !path.is_dir() || path == current {
                continue;
            }
            let stamp = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix("run_"))
                .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y%m%d_%H%M%S").ok());
            if let Some(stamp) = stamp {
                runs.push((path, stamp));
            }
        }

        // Newest first
        runs.sort_by(|a, b| b.1.cmp(&a.1));

        // The current run counts toward the limit
        let keep = retention_runs.saturating_sub(1);
        for (idx, (path, stamp)) in runs.iter().enumerate() {
            if idx >= keep || *stamp < cutoff {
                if let Err(e) = std::fs::remove_dir_all(path) {
                    eprintln!(
                        "Warning: Failed to remove old log directory {}: {}",
                        path.display(),
                        e
                    );
                }
            }
        }

        Ok(())
    }
}
