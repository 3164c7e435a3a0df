// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Record Repository
//!
//! The durable record store's contract (C4 in the design). Every method here
//! is a single, atomic compare-and-set transaction; a failed precondition
//! returns `Ok(false)` rather than an error. Implementations must never
//! overwrite a record outside of these operations.

use crate::entities::{AuditResult, Phase, PipelineRecord};
use crate::error::PipelineError;
use crate::value_objects::{PipelineId, PipelineIdentity};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};

/// Durable, transactional store of [`PipelineRecord`]s, keyed by
/// `pipeline_id`.
#[async_trait]
pub trait PipelineRecordRepository: Send + Sync {
    /// Inserts `record` if no row with its `pipeline_id` exists yet. Returns
    /// `true` if inserted, `false` if a record already existed (the benign,
    /// idempotent re-run case from C7 step 5).
    async fn upsert_new(&self, record: &PipelineRecord) -> Result<bool, PipelineError>;

    /// Sets `pipeline_status=IN_PROGRESS`, `pipeline_start_time=now`,
    /// `dag_run_id=dag_run_id` only if the pipeline is currently `PENDING` or
    /// `FAILED` with a null `dag_run_id`. Returns whether the lock was
    /// acquired.
    async fn acquire(&self, pipeline_id: &PipelineId, dag_run_id: &str, now: DateTime<FixedOffset>) -> Result<bool, PipelineError>;

    /// Sets `P_status=IN_PROGRESS`, `P_start_time=now`. Precondition: the
    /// pipeline is `IN_PROGRESS` and the caller holds the lock (checked by
    /// the caller via `dag_run_id` before invoking this).
    async fn begin_phase(&self, pipeline_id: &PipelineId, phase: Phase, now: DateTime<FixedOffset>) -> Result<(), PipelineError>;

    /// Sets `P_status=COMPLETED`, `P_end_time=now`, `completed_phase=phase`.
    async fn end_phase_ok(&self, pipeline_id: &PipelineId, phase: Phase, now: DateTime<FixedOffset>) -> Result<(), PipelineError>;

    /// Sets `P_status=PENDING`, clears `P_start_time`/`P_end_time`, releases
    /// `dag_run_id` for non-audit phases, and bumps `retry_attempt`.
    async fn reset_phase(
        &self,
        pipeline_id: &PipelineId,
        phase: Phase,
        now: DateTime<FixedOffset>,
        release_lock: bool,
    ) -> Result<(), PipelineError>;

    /// Marks the pipeline `COMPLETED` with a `SUCCESS` audit result,
    /// preserving `dag_run_id` for attribution.
    async fn finalize_ok(
        &self,
        pipeline_id: &PipelineId,
        now: DateTime<FixedOffset>,
        source_count: i64,
        target_count: i64,
    ) -> Result<(), PipelineError>;

    /// Marks the pipeline `FAILED`, clears the lock, resets every phase to
    /// `PENDING`, and bumps `retry_attempt`.
    async fn finalize_fail(
        &self,
        pipeline_id: &PipelineId,
        now: DateTime<FixedOffset>,
        result: AuditResult,
    ) -> Result<(), PipelineError>;

    /// Largest `window_end_time` among records sharing `identity` and
    /// `target_day`, for the window calculator's continuation step.
    async fn select_max_window_end(
        &self,
        identity: &PipelineIdentity,
        target_day: NaiveDate,
    ) -> Result<Option<DateTime<FixedOffset>>, PipelineError>;

    /// Source/target counts already recorded for a completed pipeline with
    /// this `pipeline_id`, if one exists — a fast path for the validator's
    /// "already processed" check before it falls back to live adapter
    /// counts (see DESIGN.md's resolution of the §9 open question).
    async fn select_recorded_counts(&self, pipeline_id: &PipelineId) -> Result<Option<(i64, i64)>, PipelineError>;

    /// Records whose `pipeline_status = IN_PROGRESS` has held a non-null
    /// `dag_run_id` and `pipeline_start_time` for longer than `threshold`.
    async fn select_stale(&self, now: DateTime<FixedOffset>, threshold: chrono::Duration) -> Result<Vec<PipelineRecord>, PipelineError>;

    /// Fetches a record by id, for callers that need to inspect full state
    /// (phase runner re-entry checks, the sweeper, tests).
    async fn find_by_id(&self, pipeline_id: &PipelineId) -> Result<Option<PipelineRecord>, PipelineError>;

    /// Persists a record wholesale. Used only by the sweeper, which performs
    /// its own compare-and-reset logic in memory before writing back
    /// (spec.md §4.12 step 2's per-phase selectivity doesn't map cleanly
    /// onto a single CAS primitive).
    async fn save(&self, record: &PipelineRecord) -> Result<(), PipelineError>;
}
