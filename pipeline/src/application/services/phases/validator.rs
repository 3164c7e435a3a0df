// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Validator Phase (C8)
//!
//! Gate between the generator and the phases that do real work. Skip is a
//! distinct outcome from failure: downstream phases must be bypassed without
//! marking the pipeline failed. Rebuilds the generator's record by
//! recomputing its window rather than reading it back from the store — the
//! two phases run moments apart in the same scheduled execution, so
//! recomputation is both deterministic and cheaper than a round trip.

use super::generator::{compute_today_window, GeneratorOutcome};
use crate::application::services::phase_runner::PhaseOutcome;
use crate::application::services::retry::retry;
use crate::infrastructure::config::{RetryConfig, WindowConfig};
use pipeline_domain::error::PipelineError;
use pipeline_domain::services::{Clock, SourceAdapter, TargetAdapter};
use pipeline_domain::{PipelineIdentity, PipelineRecord, PipelineRecordRepository};
use tracing::debug;

/// A record the validator has cleared to proceed, plus whether the window
/// was already observed empty on both sides — the audit phase's signal for
/// short-circuiting its own zero/zero case (spec.md §4.11).
#[derive(Debug)]
pub struct ValidatedRecord {
    pub record: PipelineRecord,
    pub observed_empty: bool,
}

pub async fn run_validator(
    repo: &dyn PipelineRecordRepository,
    clock: &dyn Clock,
    retry_cfg: &RetryConfig,
    identity: &PipelineIdentity,
    window_cfg: &WindowConfig,
    source: &dyn SourceAdapter,
    target: &dyn TargetAdapter,
    generator_outcome: &GeneratorOutcome,
) -> Result<PhaseOutcome<ValidatedRecord>, PipelineError> {
    if !generator_outcome.record_present {
        return Ok(PhaseOutcome::Skip("generator produced no record".to_string()));
    }

    let now = clock.now();
    let Some(window) = compute_today_window(repo, now, identity, window_cfg).await? else {
        return Ok(PhaseOutcome::Skip("no window left for today".to_string()));
    };

    if window.end > now {
        return Ok(PhaseOutcome::Skip("window end is in the future".to_string()));
    }

    let record = PipelineRecord::new(identity.clone(), window, now);

    match observe(repo, retry_cfg, source, target, &record).await {
        Observation::AlreadyProcessed => Ok(PhaseOutcome::Skip("window already processed".to_string())),
        Observation::Empty => Ok(PhaseOutcome::Success(ValidatedRecord {
            record,
            observed_empty: true,
        })),
        Observation::Unprocessed => Ok(PhaseOutcome::Success(ValidatedRecord {
            record,
            observed_empty: false,
        })),
    }
}

enum Observation {
    AlreadyProcessed,
    Empty,
    Unprocessed,
}

/// Checks the fast path (counts already recorded on a completed record)
/// before falling back to live adapter counts under the retry harness. A
/// transient adapter failure here is logged and treated as "not yet known to
/// be processed" rather than blocking the run (spec.md §4.8: "if either call
/// fails after retries, log and continue").
async fn observe(
    repo: &dyn PipelineRecordRepository,
    retry_cfg: &RetryConfig,
    source: &dyn SourceAdapter,
    target: &dyn TargetAdapter,
    record: &PipelineRecord,
) -> Observation {
    if let Ok(Some((source_count, target_count))) = repo.select_recorded_counts(&record.pipeline_id).await {
        if source_count > 0 && source_count == target_count {
            return Observation::AlreadyProcessed;
        }
    }

    let window = &record.window;
    let source_count = retry(retry_cfg, "validator_source_count", None, || source.count(window)).await;
    let target_count = retry(retry_cfg, "validator_target_count", None, || target.count(window)).await;

    match (source_count, target_count) {
        (Ok(s), Ok(t)) if s > 0 && s == t => Observation::AlreadyProcessed,
        (Ok(0), Ok(0)) => Observation::Empty,
        (Ok(_), Ok(_)) => Observation::Unprocessed,
        (source_result, target_result) => {
            debug!(
                pipeline_id = %record.pipeline_id,
                source_ok = source_result.is_ok(),
                target_ok = target_result.is_ok(),
                "validator: adapter count failed after retries, continuing"
            );
            Observation::Unprocessed
        }
    }
}
