// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Configuration
//!
//! Layered configuration for the orchestrator's control plane: a TOML file
//! provides defaults, environment variables prefixed `PIPELINE_` (e.g.
//! `PIPELINE_RETRY__MAX_ATTEMPTS=5`) override individual fields, and a
//! built-in [`Default`] covers everything else. Durations are held as
//! compound strings (`"1d2h30m"`) in the file and parsed lazily by callers
//! via [`pipeline_domain::parse_duration`], matching the format the window
//! calculator and retry harness already speak.

use chrono_tz::Tz;
use config::{Config, Environment, File};
use pipeline_domain::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Window-generation parameters: how far back to look, how wide a window is,
/// and what timezone governs day boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    pub x_time_back: String,
    pub granularity: String,
    #[serde(default = "default_zero_offset")]
    pub granularity_offset: String,
    pub timezone: String,
}

fn default_zero_offset() -> String {
    "0s".to_string()
}

impl WindowConfig {
    /// Validates the timezone name and that durations are parseable,
    /// without caching the parsed values (callers parse once per run).
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| PipelineError::invalid_config(format!("unknown timezone '{}': {}", self.timezone, e)))?;
        pipeline_domain::parse_duration(&self.x_time_back)?;
        pipeline_domain::parse_duration(&self.granularity)?;
        pipeline_domain::parse_duration(&self.granularity_offset)?;
        Ok(())
    }
}

/// Audit phase's adaptive reconciliation budget (wait-poll-widen loop).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub max_wait: String,
    pub initial_delay: String,
    pub max_delay: String,
    pub multiplier: f64,
}

/// Stage-to-target phase's eventual-consistency allowance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageToTargetConfig {
    pub settle_interval: String,
}

/// Retry harness parameters (C5), shared by every adapter call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: String,
    pub multiplier: f64,
}

/// Stale-lock sweeper threshold (C12).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    pub stale_threshold: String,
}

/// Where `dag_run_id` comes from; recorded for audit, not interpreted by the
/// control plane itself (the workflow host supplies the actual value).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    pub owner_id_source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

/// Root configuration object for a running orchestrator instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub audit: AuditConfig,
    pub stage_to_target: StageToTargetConfig,
    pub retry: RetryConfig,
    pub sweeper: SweeperConfig,
    pub lock: LockConfig,
    pub database: DatabaseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig {
                x_time_back: "1d".to_string(),
                granularity: "1h".to_string(),
                granularity_offset: "0s".to_string(),
                timezone: "UTC".to_string(),
            },
            audit: AuditConfig {
                max_wait: "10m".to_string(),
                initial_delay: "5s".to_string(),
                max_delay: "1m".to_string(),
                multiplier: 2.0,
            },
            stage_to_target: StageToTargetConfig {
                settle_interval: "2m".to_string(),
            },
            retry: RetryConfig {
                max_attempts: 3,
                base_delay: "4s".to_string(),
                multiplier: 2.0,
            },
            sweeper: SweeperConfig {
                stale_threshold: "2h".to_string(),
            },
            lock: LockConfig {
                owner_id_source: "env:DAG_RUN_ID".to_string(),
            },
            database: DatabaseConfig {
                path: "pipeline.db".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from `config_path` (if it exists), layering
    /// `PIPELINE_*` environment overrides on top, falling back to
    /// [`Default`] for anything neither source sets.
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self, PipelineError> {
        let config_path = config_path.as_ref();
        let defaults = Self::default();

        let mut builder = Config::builder().add_source(Config::try_from(&defaults).map_err(|e| {
            PipelineError::invalid_config(format!("failed to seed default configuration: {}", e))
        })?);

        if config_path.exists() {
            builder = builder.add_source(File::from(config_path));
        }

        builder = builder.add_source(Environment::with_prefix("PIPELINE").separator("__"));

        let config: AppConfig = builder
            .build()
            .map_err(|e| PipelineError::invalid_config(format!("failed to assemble configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| PipelineError::invalid_config(format!("failed to deserialize configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        self.window.validate()?;
        pipeline_domain::parse_duration(&self.audit.max_wait)?;
        pipeline_domain::parse_duration(&self.audit.initial_delay)?;
        pipeline_domain::parse_duration(&self.audit.max_delay)?;
        pipeline_domain::parse_duration(&self.stage_to_target.settle_interval)?;
        pipeline_domain::parse_duration(&self.retry.base_delay)?;
        pipeline_domain::parse_duration(&self.sweeper.stale_threshold)?;
        if self.retry.max_attempts == 0 {
            return Err(PipelineError::invalid_config("retry.max_attempts must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let mut config = AppConfig::default();
        config.window.timezone = "Not/AZone".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_retry_attempts_is_rejected() {
        let mut config = AppConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_without_file_falls_back_to_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.window.timezone, "UTC");
        assert_eq!(config.retry.max_attempts, 3);
    }
}
