// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stale-Lock Sweeper (C12)
//!
//! Registered to run after every workflow execution, regardless of outcome.
//! Errors here are logged, never propagated — a sweep failure must not fail
//! an otherwise-successful run.

use crate::infrastructure::metrics::MetricsService;
use pipeline_domain::services::Clock;
use pipeline_domain::PipelineRecordRepository;
use tracing::{error, info};

/// Finds pipelines stuck `IN_PROGRESS` past `threshold` and resets them for
/// a later retry. Returns the number of records cleaned, for monitoring.
pub async fn run_sweeper(
    repo: &dyn PipelineRecordRepository,
    metrics: &MetricsService,
    clock: &dyn Clock,
    threshold: chrono::Duration,
) -> usize {
    let now = clock.now();
    let stale = match repo.select_stale(now, threshold).await {
        Ok(records) => records,
        Err(err) => {
            error!(error = %err, "sweeper: failed to select stale records");
            return 0;
        }
    };

    let mut cleaned = 0usize;
    for mut record in stale {
        let pipeline_id = record.pipeline_id.clone();
        record.sweep_reset(now);

        if let Err(err) = repo.save(&record).await {
            error!(pipeline_id = %pipeline_id, error = %err, "sweeper: failed to save reset record");
            continue;
        }

        info!(pipeline_id = %pipeline_id, "sweeper: reset stale lock");
        cleaned += 1;
    }

    metrics.record_stale_locks_swept(cleaned as u64);
    cleaned
}
