// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Phase Runner (C6)
//!
//! Generic lifecycle wrapper shared by the three lock-holding phases
//! (source-to-stage, stage-to-target, audit): `begin_phase` → `work()` →
//! `end_phase_ok` on success or `reset_phase` on failure. One place encodes
//! "state writes happen at phase edges only", keeping store traffic to two
//! writes per phase invocation regardless of what `work` does internally.
//!
//! The audit phase does not use this runner directly — its success/failure
//! paths call `finalize_ok`/`finalize_fail` instead of `end_phase_ok`/
//! `reset_phase`, and it runs its own reconciliation loop between begin and
//! end (see [`crate::application::services::phases::audit`]).

use crate::infrastructure::metrics::MetricsService;
use pipeline_domain::entities::Phase;
use pipeline_domain::error::PipelineError;
use pipeline_domain::value_objects::PipelineId;
use pipeline_domain::{Clock, PipelineRecordRepository};
use std::future::Future;
use tracing::{debug, error};

/// Three-valued outcome of a phase (spec.md §6 "Host contracts"): success
/// carries the phase's payload, skip is a benign short-circuit that must not
/// mark the pipeline failed, and fail is a terminal error for this run.
#[derive(Debug)]
pub enum PhaseOutcome<T> {
    Success(T),
    Skip(String),
    Fail(PipelineError),
}

/// Runs one lock-holding phase's lifecycle around `work`. Assumes the caller
/// already holds the pipeline lock (via `ACQUIRE` in the source-to-stage
/// phase; inherited by stage-to-target and audit).
pub async fn run_phase<F, Fut, T>(
    repo: &dyn PipelineRecordRepository,
    metrics: &MetricsService,
    clock: &dyn Clock,
    pipeline_id: &PipelineId,
    phase: Phase,
    work: F,
) -> Result<PhaseOutcome<T>, PipelineError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let begin_now = clock.now();
    repo.begin_phase(pipeline_id, phase, begin_now).await?;
    metrics.record_phase_started(phase.as_str());
    debug!(phase = phase.as_str(), pipeline_id = %pipeline_id, "phase started");

    match work().await {
        Ok(value) => {
            let end_now = clock.now();
            repo.end_phase_ok(pipeline_id, phase, end_now).await?;
            metrics.record_phase_completed(phase.as_str());
            debug!(phase = phase.as_str(), pipeline_id = %pipeline_id, "phase completed");
            Ok(PhaseOutcome::Success(value))
        }
        Err(err) => {
            let reset_now = clock.now();
            let release_lock = phase != Phase::Audit;
            repo.reset_phase(pipeline_id, phase, reset_now, release_lock).await?;
            metrics.record_phase_failed(phase.as_str());
            metrics.record_phase_reset(phase.as_str());
            error!(phase = phase.as_str(), pipeline_id = %pipeline_id, error = %err, "phase failed, reset for retry");
            Ok(PhaseOutcome::Fail(err))
        }
    }
}
