// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Source→Stage Phase (C9)
//!
//! Acquires the pipeline lock, runs the transfer adapter under the phase
//! runner and retry harness. Concurrent execution is not allowed: a failed
//! acquire fails the phase with `AcquireConflict` rather than retrying.

use crate::application::services::phase_runner::{run_phase, PhaseOutcome};
use crate::application::services::retry::retry;
use crate::infrastructure::config::RetryConfig;
use crate::infrastructure::metrics::MetricsService;
use pipeline_domain::entities::Phase;
use pipeline_domain::error::PipelineError;
use pipeline_domain::services::{Clock, SourceToStageTransfer};
use pipeline_domain::{PipelineRecord, PipelineRecordRepository};

pub async fn run_source_to_stage(
    repo: &dyn PipelineRecordRepository,
    metrics: &MetricsService,
    clock: &dyn Clock,
    retry_cfg: &RetryConfig,
    transfer: &dyn SourceToStageTransfer,
    record: &PipelineRecord,
    dag_run_id: &str,
) -> Result<PhaseOutcome<i64>, PipelineError> {
    let acquired = repo.acquire(&record.pipeline_id, dag_run_id, clock.now()).await?;
    if !acquired {
        metrics.record_acquire_conflict();
        return Ok(PhaseOutcome::Fail(PipelineError::acquire_conflict(record.pipeline_id.to_string())));
    }

    let window = record.window.clone();
    run_phase(repo, metrics, clock, &record.pipeline_id, Phase::SourceToStage, || async {
        retry(retry_cfg, "source_to_stage_transfer", Some(metrics), || transfer.transfer(&window)).await
    })
    .await
}
