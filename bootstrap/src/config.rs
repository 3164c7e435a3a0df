// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Configuration
//!
//! Launch-time settings resolved from CLI flags, ahead of the layered
//! `pipeline::infrastructure::config::AppConfig` (which governs window,
//! retry, audit, and sweeper behavior and is loaded only after bootstrap
//! finishes validating its own arguments).
//!
//! ## Immutability
//!
//! `AppConfig` here is immutable after construction: thread safety without
//! synchronization, safe sharing across async tasks.
//!
//! ## Usage
//!
//! ```rust
//! use bootstrap::config::{AppConfig, LogLevel};
//!
//! let config = AppConfig::builder()
//!     .app_name("pipeline")
//!     .log_level(LogLevel::Info)
//!     .build();
//!
//! println!("Running: {}", config.app_name());
//! ```

use std::path::PathBuf;

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    /// Convert to tracing Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Bootstrap-phase application configuration.
///
/// Holds only what is needed to get logging, the record store, and the
/// layered orchestrator config off the ground; everything else
/// (window/retry/audit/sweeper settings) lives in
/// `pipeline::infrastructure::config::AppConfig`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    app_name: String,
    log_level: LogLevel,
    /// Path to the layered TOML config file (optional; falls back to
    /// defaults + environment if absent).
    config_path: Option<PathBuf>,
    /// Override for the sqlite record store path.
    database_path: Option<PathBuf>,
    verbose: bool,
    dry_run: bool,
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    pub fn database_path(&self) -> Option<&PathBuf> {
        self.database_path.as_ref()
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Dry run: drive the phase sequence and log outcomes without calling
    /// any repository-mutating method.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    app_name: Option<String>,
    log_level: Option<LogLevel>,
    config_path: Option<PathBuf>,
    database_path: Option<PathBuf>,
    verbose: bool,
    dry_run: bool,
}

impl AppConfigBuilder {
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Build the configuration.
    ///
    /// # Panics
    /// Panics if `app_name` was not set.
    pub fn build(self) -> AppConfig {
        AppConfig {
            app_name: self.app_name.expect("app_name is required"),
            log_level: self.log_level.unwrap_or_default(),
            config_path: self.config_path,
            database_path: self.database_path,
            verbose: self.verbose,
            dry_run: self.dry_run,
        }
    }

    /// Try to build the configuration, returning `Err` if required fields
    /// are missing instead of panicking.
    pub fn try_build(self) -> Result<AppConfig, String> {
        Ok(AppConfig {
            app_name: self.app_name.ok_or("app_name is required")?,
            log_level: self.log_level.unwrap_or_default(),
            config_path: self.config_path,
            database_path: self.database_path,
            verbose: self.verbose,
            dry_run: self.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_minimal() {
        let config = AppConfig::builder().app_name("test-app").build();

        assert_eq!(config.app_name(), "test-app");
        assert_eq!(config.log_level(), LogLevel::Info);
        assert!(config.config_path().is_none());
        assert!(config.database_path().is_none());
        assert!(!config.is_verbose());
        assert!(!config.is_dry_run());
    }

    #[test]
    fn builder_full() {
        let config = AppConfig::builder()
            .app_name("full-app")
            .log_level(LogLevel::Debug)
            .config_path("/etc/pipeline/config.toml")
            .database_path("/var/lib/pipeline/pipeline.db")
            .verbose(true)
            .dry_run(true)
            .build();

        assert_eq!(config.app_name(), "full-app");
        assert_eq!(config.log_level(), LogLevel::Debug);
        assert_eq!(config.config_path(), Some(&PathBuf::from("/etc/pipeline/config.toml")));
        assert_eq!(config.database_path(), Some(&PathBuf::from("/var/lib/pipeline/pipeline.db")));
        assert!(config.is_verbose());
        assert!(config.is_dry_run());
    }

    #[test]
    #[should_panic(expected = "app_name is required")]
    fn builder_missing_app_name_panics() {
        AppConfig::builder().build();
    }

    #[test]
    fn try_build_succeeds_with_app_name() {
        let result = AppConfig::builder().app_name("test").try_build();
        assert!(result.is_ok());
    }

    #[test]
    fn try_build_fails_without_app_name() {
        let result = AppConfig::builder().try_build();
        assert_eq!(result.unwrap_err(), "app_name is required");
    }

    #[test]
    fn log_level_default_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn log_level_maps_to_tracing_level() {
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
    }
}
