// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage→Target Phase (C10)
//!
//! Inherits the lock from source-to-stage; does not re-acquire. After a
//! successful load trigger, waits a configured settle interval to
//! accommodate the target's eventual consistency before the audit runs. The
//! wait lives here, not in audit, so a retried phase re-applies it.

use crate::application::services::phase_runner::{run_phase, PhaseOutcome};
use crate::application::services::retry::retry;
use crate::infrastructure::config::{RetryConfig, StageToTargetConfig};
use crate::infrastructure::metrics::MetricsService;
use pipeline_domain::entities::Phase;
use pipeline_domain::error::PipelineError;
use pipeline_domain::services::{Clock, StageToTargetTransfer};
use pipeline_domain::PipelineRecord;
use pipeline_domain::PipelineRecordRepository;

pub async fn run_stage_to_target(
    repo: &dyn PipelineRecordRepository,
    metrics: &MetricsService,
    clock: &dyn Clock,
    retry_cfg: &RetryConfig,
    stage_cfg: &StageToTargetConfig,
    transfer: &dyn StageToTargetTransfer,
    record: &PipelineRecord,
) -> Result<PhaseOutcome<i64>, PipelineError> {
    if !record.predecessor_completed(Phase::StageToTarget) {
        return Ok(PhaseOutcome::Fail(PipelineError::validation_error(format!(
            "pipeline {} reached stage→target before source→stage completed",
            record.pipeline_id
        ))));
    }

    let window = record.window.clone();
    let settle_interval = pipeline_domain::parse_duration(&stage_cfg.settle_interval)?
        .to_std()
        .map_err(|e| PipelineError::invalid_config(format!("stage_to_target.settle_interval out of range: {}", e)))?;

    run_phase(repo, metrics, clock, &record.pipeline_id, Phase::StageToTarget, || async {
        let loaded = retry(retry_cfg, "stage_to_target_transfer", Some(metrics), || transfer.transfer(&window)).await?;
        tokio::time::sleep(settle_interval).await;
        Ok(loaded)
    })
    .await
}
