// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Generator Phase (C7)
//!
//! Builds or continues today's record for an identity triple. Does not
//! acquire the pipeline lock — that happens in the source-to-stage phase.

use crate::infrastructure::config::WindowConfig;
use chrono::Utc;
use chrono_tz::Tz;
use pipeline_domain::entities::RecordMetadata;
use pipeline_domain::error::PipelineError;
use pipeline_domain::services::{compute_window, Clock, WindowRequest};
use pipeline_domain::value_objects::PipelineId;
use pipeline_domain::{PipelineIdentity, PipelineRecord, PipelineRecordRepository};
use tracing::debug;

/// Outbound payload: whether a record exists for this run, and if so its id.
/// `record_present = false` tells the validator (and the workflow host) to
/// short-circuit the rest of the run.
#[derive(Debug, Clone)]
pub struct GeneratorOutcome {
    pub record_present: bool,
    pub pipeline_id: Option<PipelineId>,
}

/// Deterministic storage hierarchy for a record's staged data (C3): keyed by
/// `target_day` and the hour-minute of `window_start`, with an epoch suffix
/// (the generation instant) so a freshly (re-)generated record never shares
/// a path with an earlier attempt at the same window.
fn stage_path(record: &PipelineRecord, now: chrono::DateTime<chrono::FixedOffset>) -> String {
    format!(
        "{}/{}/{}",
        record.window.target_day.format("%Y-%m-%d"),
        record.window.start.format("%H%M"),
        now.timestamp()
    )
}

/// Recomputes today's window for `identity` from `now` and the persisted
/// continuation point, the same way for every caller. The validator calls
/// this again (rather than reading the generator's record back from the
/// store) to reconstruct the identical window deterministically — spec.md
/// §4.8.
pub(super) async fn compute_today_window(
    repo: &dyn PipelineRecordRepository,
    now: chrono::DateTime<chrono::FixedOffset>,
    identity: &PipelineIdentity,
    config: &WindowConfig,
) -> Result<Option<pipeline_domain::value_objects::Window>, PipelineError> {
    let timezone: Tz = config
        .timezone
        .parse()
        .map_err(|e| PipelineError::invalid_config(format!("unknown timezone '{}': {}", config.timezone, e)))?;
    let x_time_back = pipeline_domain::parse_duration(&config.x_time_back)?;
    let granularity = pipeline_domain::parse_duration(&config.granularity)?;
    let granularity_offset = pipeline_domain::parse_duration(&config.granularity_offset)?;

    let local_now = now.with_timezone(&timezone);
    let target_day = (local_now - x_time_back).date_naive();

    let continuation = repo.select_max_window_end(identity, target_day).await?;

    Ok(compute_window(&WindowRequest {
        now: now.with_timezone(&Utc),
        timezone,
        x_time_back,
        granularity,
        granularity_offset,
        continuation: continuation.map(|c| c.with_timezone(&Utc)),
    }))
}

pub async fn run_generator(
    repo: &dyn PipelineRecordRepository,
    clock: &dyn Clock,
    identity: &PipelineIdentity,
    config: &WindowConfig,
) -> Result<GeneratorOutcome, PipelineError> {
    let now = clock.now();
    let window = compute_today_window(repo, now, identity, config).await?;

    let Some(window) = window else {
        debug!("generator: no window left for today");
        return Ok(GeneratorOutcome {
            record_present: false,
            pipeline_id: None,
        });
    };

    let mut record = PipelineRecord::new(identity.clone(), window, now);
    record.metadata = RecordMetadata {
        stage_path: Some(stage_path(&record, now)),
    };
    let pipeline_id = record.pipeline_id.clone();

    let inserted = repo.upsert_new(&record).await?;
    debug!(pipeline_id = %pipeline_id, inserted, "generator: record upserted");

    Ok(GeneratorOutcome {
        record_present: true,
        pipeline_id: Some(pipeline_id),
    })
}
