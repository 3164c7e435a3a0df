// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Record
//!
//! The central entity of the control plane: one row describing a single
//! (source, stage, target, window) unit of work, its per-phase lifecycle,
//! its exclusive-execution lock, and its audit outcome. See spec.md §3 for
//! the full data model and its invariants, reproduced as doc comments below
//! rather than restated at length.

use crate::value_objects::{PipelineId, PipelineIdentity, Window};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One of the five phases a pipeline record moves through. Only
/// [`Phase::SourceToStage`], [`Phase::StageToTarget`], and [`Phase::Audit`]
/// have a [`PhaseBlock`]; generation and validation never hold the lock and
/// never persist a block of their own (spec.md §3 "Phase blocks").
///
/// `Ord` follows the linear order Gen < Val < S→S < S→T < Audit used by
/// invariant 5 to compare against `completed_phase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Generator,
    Validator,
    SourceToStage,
    StageToTarget,
    Audit,
}

impl Phase {
    fn rank(self) -> u8 {
        match self {
            Phase::Generator => 0,
            Phase::Validator => 1,
            Phase::SourceToStage => 2,
            Phase::StageToTarget => 3,
            Phase::Audit => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Generator => "generator",
            Phase::Validator => "validator",
            Phase::SourceToStage => "source_to_stage_ingestion",
            Phase::StageToTarget => "stage_to_target_ingestion",
            Phase::Audit => "audit",
        }
    }
}

impl PartialOrd for Phase {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Phase {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

/// Status of a single phase block, or of the pipeline as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl Default for PhaseStatus {
    fn default() -> Self {
        PhaseStatus::Pending
    }
}

/// Durable state for one of the three lock-holding phases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseBlock {
    pub status: PhaseStatus,
    pub start_time: Option<DateTime<FixedOffset>>,
    pub end_time: Option<DateTime<FixedOffset>>,
}

impl PhaseBlock {
    fn reset(&mut self) {
        self.status = PhaseStatus::Pending;
        self.start_time = None;
        self.end_time = None;
    }
}

/// Outcome of the audit's count reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditResult {
    Success,
    IntegrityViolation,
    Mismatch,
}

/// Free-form, semi-structured data carried by a record. Spec.md leaves the
/// schema beyond `stage_path` undefined (Open Question, §9); DESIGN.md
/// records the decision to keep it to just that one field for now.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub stage_path: Option<String>,
}

/// One (source, stage, target, window) unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRecord {
    pub pipeline_id: PipelineId,
    pub identity: PipelineIdentity,
    pub window: Window,

    pub source_to_stage: PhaseBlock,
    pub stage_to_target: PhaseBlock,
    pub audit: PhaseBlock,

    pub pipeline_status: PhaseStatus,
    pub pipeline_start_time: Option<DateTime<FixedOffset>>,
    pub pipeline_end_time: Option<DateTime<FixedOffset>>,
    pub pipeline_priority: f64,

    pub dag_run_id: Option<String>,

    pub audit_result: Option<AuditResult>,
    pub source_count: Option<i64>,
    pub target_count: Option<i64>,
    pub count_difference: Option<i64>,
    pub percentage_difference: Option<f64>,

    pub completed_phase: Option<Phase>,
    pub retry_attempt: u32,
    pub metadata: RecordMetadata,

    pub record_first_created_time: DateTime<FixedOffset>,
    pub record_last_updated_time: DateTime<FixedOffset>,
}

impl PipelineRecord {
    /// Builds a freshly-generated record: all phases PENDING, no lock, no
    /// retries. Used by the generator phase (C7) before `UPSERT_NEW`.
    pub fn new(identity: PipelineIdentity, window: Window, now: DateTime<FixedOffset>) -> Self {
        let pipeline_id = PipelineId::compute(&identity, window.target_day, window.start, window.end);
        Self {
            pipeline_id,
            identity,
            window,
            source_to_stage: PhaseBlock::default(),
            stage_to_target: PhaseBlock::default(),
            audit: PhaseBlock::default(),
            pipeline_status: PhaseStatus::Pending,
            pipeline_start_time: None,
            pipeline_end_time: None,
            pipeline_priority: 1.1,
            dag_run_id: None,
            audit_result: None,
            source_count: None,
            target_count: None,
            count_difference: None,
            percentage_difference: None,
            completed_phase: None,
            retry_attempt: 0,
            metadata: RecordMetadata::default(),
            record_first_created_time: now,
            record_last_updated_time: now,
        }
    }

    pub fn block(&self, phase: Phase) -> Option<&PhaseBlock> {
        match phase {
            Phase::SourceToStage => Some(&self.source_to_stage),
            Phase::StageToTarget => Some(&self.stage_to_target),
            Phase::Audit => Some(&self.audit),
            Phase::Generator | Phase::Validator => None,
        }
    }

    fn block_mut(&mut self, phase: Phase) -> Option<&mut PhaseBlock> {
        match phase {
            Phase::SourceToStage => Some(&mut self.source_to_stage),
            Phase::StageToTarget => Some(&mut self.stage_to_target),
            Phase::Audit => Some(&mut self.audit),
            Phase::Generator | Phase::Validator => None,
        }
    }

    /// Whether the lock is currently held (invariant 4: `IN_PROGRESS` implies
    /// a non-null `dag_run_id` and a set `pipeline_start_time`).
    pub fn is_locked(&self) -> bool {
        self.pipeline_status == PhaseStatus::InProgress && self.dag_run_id.is_some()
    }

    /// Whether `phase` may run given `completed_phase`: a phase is defensive
    /// and refuses to run if its predecessor never completed (spec.md §5
    /// "Ordering guarantees").
    pub fn predecessor_completed(&self, phase: Phase) -> bool {
        let predecessor = match phase {
            Phase::SourceToStage => return true, // gated by validator's skip/continue, not completed_phase
            Phase::StageToTarget => Phase::SourceToStage,
            Phase::Audit => Phase::StageToTarget,
            Phase::Generator | Phase::Validator => return true,
        };
        self.completed_phase.map(|p| p >= predecessor).unwrap_or(false)
    }

    pub fn begin_phase(&mut self, phase: Phase, now: DateTime<FixedOffset>) {
        if let Some(block) = self.block_mut(phase) {
            block.status = PhaseStatus::InProgress;
            block.start_time = Some(now);
            block.end_time = None;
        }
        self.record_last_updated_time = now;
    }

    pub fn end_phase_ok(&mut self, phase: Phase, now: DateTime<FixedOffset>) {
        if let Some(block) = self.block_mut(phase) {
            block.status = PhaseStatus::Completed;
            block.end_time = Some(now);
        }
        self.completed_phase = Some(self.completed_phase.map_or(phase, |p| p.max(phase)));
        self.record_last_updated_time = now;
    }

    /// Resets one phase to PENDING, releases the lock (for non-audit
    /// phases), and bumps the retry counter (invariant 6).
    pub fn reset_phase(&mut self, phase: Phase, now: DateTime<FixedOffset>, release_lock: bool) {
        if let Some(block) = self.block_mut(phase) {
            block.reset();
        }
        if release_lock {
            self.dag_run_id = None;
            self.pipeline_status = PhaseStatus::Pending;
        }
        self.retry_attempt += 1;
        self.record_last_updated_time = now;
    }

    pub fn acquire(&mut self, dag_run_id: impl Into<String>, now: DateTime<FixedOffset>) -> bool {
        if matches!(self.pipeline_status, PhaseStatus::Pending | PhaseStatus::Failed) && self.dag_run_id.is_none() {
            self.pipeline_status = PhaseStatus::InProgress;
            self.pipeline_start_time = Some(now);
            self.dag_run_id = Some(dag_run_id.into());
            self.record_last_updated_time = now;
            true
        } else {
            false
        }
    }

    pub fn finalize_ok(
        &mut self,
        now: DateTime<FixedOffset>,
        source_count: i64,
        target_count: i64,
    ) {
        self.audit.status = PhaseStatus::Completed;
        self.audit.end_time = Some(now);
        self.completed_phase = Some(Phase::Audit);
        self.pipeline_status = PhaseStatus::Completed;
        self.pipeline_end_time = Some(now);
        self.source_count = Some(source_count);
        self.target_count = Some(target_count);
        self.count_difference = Some(target_count - source_count);
        self.percentage_difference = Some(percentage_difference(source_count, target_count));
        self.audit_result = Some(AuditResult::Success);
        // dag_run_id is preserved for attribution.
        self.record_last_updated_time = now;
    }

    /// Sweeper-specific reset (stale-lock recovery): clears the lock and
    /// resets only phases left `IN_PROGRESS` or `FAILED`; `COMPLETED` phases
    /// are preserved so a later retry skips finished work. Bumps
    /// `retry_attempt` once regardless of how many phases were reset.
    pub fn sweep_reset(&mut self, now: DateTime<FixedOffset>) {
        for phase in [Phase::SourceToStage, Phase::StageToTarget, Phase::Audit] {
            if let Some(block) = self.block_mut(phase) {
                if matches!(block.status, PhaseStatus::InProgress | PhaseStatus::Failed) {
                    block.reset();
                }
            }
        }
        self.dag_run_id = None;
        self.pipeline_status = PhaseStatus::Pending;
        self.retry_attempt += 1;
        self.record_last_updated_time = now;
    }

    pub fn finalize_fail(&mut self, now: DateTime<FixedOffset>, result: AuditResult) {
        self.audit.status = PhaseStatus::Failed;
        self.pipeline_status = PhaseStatus::Failed;
        self.audit_result = Some(result);
        self.dag_run_id = None;
        self.source_to_stage.reset();
        self.stage_to_target.reset();
        self.audit.reset();
        self.retry_attempt += 1;
        self.record_last_updated_time = now;
    }
}

fn percentage_difference(source_count: i64, target_count: i64) -> f64 {
    if source_count == 0 {
        if target_count == 0 {
            0.0
        } else {
            100.0
        }
    } else {
        ((target_count - source_count) as f64 / source_count as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::EndpointIdentity;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn sample_record(now: DateTime<FixedOffset>) -> PipelineRecord {
        let identity = PipelineIdentity::new(
            EndpointIdentity::new("s", "s-name", "db", "pg"),
            EndpointIdentity::new("g", "g-name", "blob", "s3"),
            EndpointIdentity::new("t", "t-name", "wh", "sf"),
        );
        let tz = FixedOffset::east_opt(0).unwrap();
        let start = tz.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = tz.with_ymd_and_hms(2025, 1, 1, 0, 30, 0).unwrap();
        let window = Window::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), start, end, Duration::minutes(30));
        PipelineRecord::new(identity, window, now)
    }

    #[test]
    fn acquire_fails_when_already_in_progress() {
        let now = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap();
        let mut record = sample_record(now);
        assert!(record.acquire("run-1", now));
        assert!(!record.acquire("run-2", now));
    }

    #[test]
    fn reset_phase_releases_lock_and_bumps_retry() {
        let now = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap();
        let mut record = sample_record(now);
        record.acquire("run-1", now);
        record.begin_phase(Phase::SourceToStage, now);
        record.reset_phase(Phase::SourceToStage, now, true);

        assert_eq!(record.retry_attempt, 1);
        assert!(record.dag_run_id.is_none());
        assert_eq!(record.pipeline_status, PhaseStatus::Pending);
        assert_eq!(record.source_to_stage.status, PhaseStatus::Pending);
    }

    #[test]
    fn finalize_ok_sets_success_and_preserves_dag_run_id() {
        let now = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap();
        let mut record = sample_record(now);
        record.acquire("run-1", now);
        record.finalize_ok(now, 100, 100);

        assert_eq!(record.pipeline_status, PhaseStatus::Completed);
        assert_eq!(record.audit_result, Some(AuditResult::Success));
        assert_eq!(record.dag_run_id.as_deref(), Some("run-1"));
        assert_eq!(record.completed_phase, Some(Phase::Audit));
    }

    #[test]
    fn finalize_fail_resets_all_phases_and_clears_lock() {
        let now = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap();
        let mut record = sample_record(now);
        record.acquire("run-1", now);
        record.begin_phase(Phase::SourceToStage, now);
        record.end_phase_ok(Phase::SourceToStage, now);
        record.begin_phase(Phase::Audit, now);
        record.finalize_fail(now, AuditResult::IntegrityViolation);

        assert_eq!(record.pipeline_status, PhaseStatus::Failed);
        assert!(record.dag_run_id.is_none());
        assert_eq!(record.source_to_stage.status, PhaseStatus::Pending);
        assert_eq!(record.retry_attempt, 1);
    }

    #[test]
    fn sweep_reset_preserves_completed_phases() {
        let now = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap();
        let mut record = sample_record(now);
        record.acquire("run-1", now);
        record.begin_phase(Phase::SourceToStage, now);
        record.end_phase_ok(Phase::SourceToStage, now);
        record.begin_phase(Phase::StageToTarget, now);

        record.sweep_reset(now);

        assert_eq!(record.source_to_stage.status, PhaseStatus::Completed);
        assert_eq!(record.stage_to_target.status, PhaseStatus::Pending);
        assert!(record.dag_run_id.is_none());
        assert_eq!(record.pipeline_status, PhaseStatus::Pending);
        assert_eq!(record.retry_attempt, 1);
    }

    #[test]
    fn phase_ordering_matches_linear_sequence() {
        assert!(Phase::Generator < Phase::Validator);
        assert!(Phase::Validator < Phase::SourceToStage);
        assert!(Phase::SourceToStage < Phase::StageToTarget);
        assert!(Phase::StageToTarget < Phase::Audit);
    }

    #[test]
    fn percentage_difference_zero_over_zero_is_zero() {
        assert_eq!(percentage_difference(0, 0), 0.0);
        assert_eq!(percentage_difference(0, 5), 100.0);
        assert_eq!(percentage_difference(100, 101), 1.0);
    }
}
