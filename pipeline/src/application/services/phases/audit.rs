// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Audit Phase (C11)
//!
//! The most intricate component, and the sole authority that marks a
//! pipeline `COMPLETED`. Runs an adaptive count-reconciliation loop against
//! a total time budget, enforces the integrity invariant (target can never
//! exceed source), and on failure invokes cleanup before resetting all phase
//! state for a fresh retry. A zero/zero count is only ever treated as
//! success-with-no-data when the validator already observed the same thing;
//! otherwise it polls out the budget like any other mismatch.

use crate::application::services::phase_runner::PhaseOutcome;
use crate::application::services::retry::retry;
use crate::infrastructure::config::{AuditConfig, RetryConfig};
use crate::infrastructure::metrics::MetricsService;
use pipeline_domain::entities::{AuditResult, Phase, PhaseStatus};
use pipeline_domain::error::PipelineError;
use pipeline_domain::services::{Clock, SourceAdapter, StageAdapter, TargetAdapter};
use pipeline_domain::PipelineRecord;
use pipeline_domain::PipelineRecordRepository;
use tracing::{error, warn};

pub async fn run_audit(
    repo: &dyn PipelineRecordRepository,
    metrics: &MetricsService,
    clock: &dyn Clock,
    retry_cfg: &RetryConfig,
    audit_cfg: &AuditConfig,
    source: &dyn SourceAdapter,
    stage: &dyn StageAdapter,
    target: &dyn TargetAdapter,
    record: &PipelineRecord,
    validator_observed_empty: bool,
) -> Result<PhaseOutcome<AuditResult>, PipelineError> {
    if !record.predecessor_completed(Phase::Audit) {
        return Ok(PhaseOutcome::Fail(PipelineError::validation_error(format!(
            "pipeline {} reached audit before stage→target completed",
            record.pipeline_id
        ))));
    }

    if record.audit.status == PhaseStatus::Completed {
        return Ok(PhaseOutcome::Success(record.audit_result.unwrap_or(AuditResult::Success)));
    }

    let pipeline_id = &record.pipeline_id;
    let window = record.window.clone();

    repo.begin_phase(pipeline_id, Phase::Audit, clock.now()).await?;
    metrics.record_phase_started(Phase::Audit.as_str());

    let max_wait = pipeline_domain::parse_duration(&audit_cfg.max_wait)?;
    let max_delay = pipeline_domain::parse_duration(&audit_cfg.max_delay)?
        .to_std()
        .map_err(|e| PipelineError::invalid_config(format!("audit.max_delay out of range: {}", e)))?;
    let mut delay = pipeline_domain::parse_duration(&audit_cfg.initial_delay)?
        .to_std()
        .map_err(|e| PipelineError::invalid_config(format!("audit.initial_delay out of range: {}", e)))?;

    let started_at = clock.now();
    let mut iterations: u32 = 0;

    loop {
        iterations += 1;
        let source_count = retry(retry_cfg, "audit_source_count", Some(metrics), || source.count(&window)).await?;
        let target_count = retry(retry_cfg, "audit_target_count", Some(metrics), || target.count(&window)).await?;

        if target_count > source_count {
            metrics.record_audit_integrity_violation();
            metrics.record_audit_reconciliation_iterations(iterations);
            return Ok(fail(
                repo,
                metrics,
                clock,
                stage,
                target,
                record,
                AuditResult::IntegrityViolation,
                PipelineError::IntegrityViolation {
                    source: source_count,
                    target: target_count,
                },
            )
            .await?);
        }

        if source_count == target_count && source_count > 0 {
            let now = clock.now();
            repo.finalize_ok(pipeline_id, now, source_count, target_count).await?;
            metrics.record_phase_completed(Phase::Audit.as_str());
            metrics.record_audit_reconciliation_iterations(iterations);
            return Ok(PhaseOutcome::Success(AuditResult::Success));
        }

        // source_count == target_count == 0 is ambiguous on its own: a window
        // with no data yet looks identical to one that never had any. Only
        // short-circuit to success when the validator already observed the
        // same zero/zero state up front (spec.md §4.11); otherwise poll out
        // the budget below in case data is still landing.
        if source_count == 0 && target_count == 0 && validator_observed_empty {
            let now = clock.now();
            repo.finalize_ok(pipeline_id, now, source_count, target_count).await?;
            metrics.record_phase_completed(Phase::Audit.as_str());
            metrics.record_audit_reconciliation_iterations(iterations);
            return Ok(PhaseOutcome::Success(AuditResult::Success));
        }

        if clock.now() - started_at >= max_wait {
            metrics.record_audit_mismatch();
            metrics.record_audit_reconciliation_iterations(iterations);
            return Ok(fail(
                repo,
                metrics,
                clock,
                stage,
                target,
                record,
                AuditResult::Mismatch,
                PipelineError::Mismatch {
                    source: source_count,
                    target: target_count,
                },
            )
            .await?);
        }

        tokio::time::sleep(delay).await;
        delay = std::cmp::min(
            std::time::Duration::from_secs_f64(delay.as_secs_f64() * audit_cfg.multiplier),
            max_delay,
        );
    }
}

/// Failure path: cleanup (best-effort, logged not propagated), then
/// `FINALIZE_FAIL` which resets every phase to PENDING and clears the lock.
async fn fail(
    repo: &dyn PipelineRecordRepository,
    metrics: &MetricsService,
    clock: &dyn Clock,
    stage: &dyn StageAdapter,
    target: &dyn TargetAdapter,
    record: &PipelineRecord,
    result: AuditResult,
    err: PipelineError,
) -> Result<PhaseOutcome<AuditResult>, PipelineError> {
    let window = &record.window;

    if let Err(cleanup_err) = stage.clear(window).await {
        warn!(pipeline_id = %record.pipeline_id, error = %cleanup_err, "audit cleanup: failed to clear staged data");
    }
    if let Err(cleanup_err) = target.delete(window).await {
        warn!(pipeline_id = %record.pipeline_id, error = %cleanup_err, "audit cleanup: failed to delete target data");
    }

    repo.finalize_fail(&record.pipeline_id, clock.now(), result).await?;
    metrics.record_phase_failed(Phase::Audit.as_str());
    error!(pipeline_id = %record.pipeline_id, error = %err, "audit failed, pipeline reset for retry");

    Ok(PhaseOutcome::Fail(err))
}
