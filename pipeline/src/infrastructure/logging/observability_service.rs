// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Observability Service
//!
//! Initializes the global `tracing` subscriber for the control plane. Every
//! phase logs `debug!` on entry, `warn!` on a retryable adapter failure, and
//! `error!` on a terminal one; this service only wires up where those events
//! go, not what components log.

use pipeline_domain::error::PipelineError;
use tracing_subscriber::EnvFilter;

/// Log output format, mirroring the two modes operators actually want: human
/// output at a terminal, structured JSON when shipped to a log aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

pub struct ObservabilityService;

impl ObservabilityService {
    /// Installs the process-global tracing subscriber. `default_level` is
    /// used when `RUST_LOG` is unset; `RUST_LOG` always takes precedence so
    /// operators can raise verbosity for one module without a redeploy.
    pub fn init(default_level: &str, format: LogFormat) -> Result<(), PipelineError> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

        let result = match format {
            LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
            LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().try_init(),
        };

        result.map_err(|e| PipelineError::internal_error(format!("failed to install tracing subscriber: {}", e)))
    }
}
