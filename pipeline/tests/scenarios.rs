// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! End-to-end phase-sequence scenarios against an in-memory SQLite record
//! store and the reference adapters, covering the generator→validator→
//! source-to-stage→stage-to-target→audit sequence plus the sweeper and
//! acquire race.

mod common;

use common::FixedClock;
use pipeline::application::services::phases::{
    run_audit, run_generator, run_source_to_stage, run_stage_to_target, run_sweeper, run_validator,
};
use pipeline::application::services::PhaseOutcome;
use pipeline::infrastructure::adapters::reference::{InMemorySource, InMemoryStage, InMemoryTarget, InMemoryTransfer};
use pipeline::infrastructure::config::AppConfig;
use pipeline::infrastructure::metrics::MetricsService;
use pipeline::infrastructure::repositories::SqliteRecordRepository;
use pipeline_domain::entities::{AuditResult, PhaseStatus};
use pipeline_domain::error::PipelineError;
use pipeline_domain::value_objects::EndpointIdentity;
use pipeline_domain::{PipelineIdentity, PipelineRecordRepository, TargetAdapter};

fn sample_identity() -> PipelineIdentity {
    PipelineIdentity::new(
        EndpointIdentity::new("src-1", "orders-db", "database", "postgres"),
        EndpointIdentity::new("stg-1", "orders-lake", "object-store", "s3"),
        EndpointIdentity::new("tgt-1", "orders-warehouse", "warehouse", "snowflake"),
    )
}

async fn new_repo() -> SqliteRecordRepository {
    SqliteRecordRepository::new(":memory:").await.unwrap()
}

/// Happy path: generator → validator → s→s → s→t → audit all succeed and
/// the record ends up COMPLETED with matching counts (law: "audit finality").
#[tokio::test]
async fn s0_full_run_completes_successfully() {
    let repo = new_repo().await;
    let metrics = MetricsService::new().unwrap();
    let config = AppConfig::default();
    let identity = sample_identity();

    let clock = FixedClock::new(2025, 1, 2, 1, 15, 0);

    let source = InMemorySource::new();
    let stage = InMemoryStage::new();
    let target = InMemoryTarget::new();
    let source_to_stage = InMemoryTransfer::source_to_stage(&source, &stage);
    let stage_to_target = InMemoryTransfer::stage_to_target(&stage, &target);

    let generator_outcome = run_generator(&repo, &clock, &identity, &config.window).await.unwrap();
    assert!(generator_outcome.record_present);

    let window = repo
        .find_by_id(generator_outcome.pipeline_id.as_ref().unwrap())
        .await
        .unwrap()
        .unwrap()
        .window;
    source.seed(&window, 100);

    let validated = run_validator(
        &repo,
        &clock,
        &config.retry,
        &identity,
        &config.window,
        &source,
        &target,
        &generator_outcome,
    )
    .await
    .unwrap();
    let (record, observed_empty) = match validated {
        PhaseOutcome::Success(validated) => (validated.record, validated.observed_empty),
        other => panic!("expected Success, got {:?}", other),
    };
    assert!(!observed_empty);

    let s2s = run_source_to_stage(&repo, &metrics, &clock, &config.retry, &source_to_stage, &record, "run-1")
        .await
        .unwrap();
    assert!(matches!(s2s, PhaseOutcome::Success(100)));
    let record = repo.find_by_id(&record.pipeline_id).await.unwrap().unwrap();

    let s2t = run_stage_to_target(
        &repo,
        &metrics,
        &clock,
        &config.retry,
        &config.stage_to_target,
        &stage_to_target,
        &record,
    )
    .await
    .unwrap();
    assert!(matches!(s2t, PhaseOutcome::Success(100)));
    let record = repo.find_by_id(&record.pipeline_id).await.unwrap().unwrap();

    let audited = run_audit(
        &repo,
        &metrics,
        &clock,
        &config.retry,
        &config.audit,
        &source,
        &stage,
        &target,
        &record,
        observed_empty,
    )
    .await
    .unwrap();
    assert!(matches!(audited, PhaseOutcome::Success(AuditResult::Success)));

    let final_record = repo.find_by_id(&record.pipeline_id).await.unwrap().unwrap();
    assert_eq!(final_record.pipeline_status, PhaseStatus::Completed);
    assert_eq!(final_record.source_count, Some(100));
    assert_eq!(final_record.target_count, Some(100));
    assert_eq!(final_record.audit_result, Some(AuditResult::Success));

    // Law: a completed audit is not re-done; second invocation is a no-op.
    let audited_again = run_audit(
        &repo,
        &metrics,
        &clock,
        &config.retry,
        &config.audit,
        &source,
        &stage,
        &target,
        &final_record,
        false,
    )
    .await
    .unwrap();
    assert!(matches!(audited_again, PhaseOutcome::Success(AuditResult::Success)));
}

/// S3: validator sees matching, already-recorded counts and skips; no
/// downstream phase runs and the record is left untouched.
#[tokio::test]
async fn s3_already_processed_skips_downstream() {
    let repo = new_repo().await;
    let config = AppConfig::default();
    let identity = sample_identity();
    let clock = FixedClock::new(2025, 1, 2, 1, 15, 0);

    let source = InMemorySource::new();
    let target = InMemoryTarget::new();

    let generator_outcome = run_generator(&repo, &clock, &identity, &config.window).await.unwrap();
    let pipeline_id = generator_outcome.pipeline_id.clone().unwrap();

    let window = repo.find_by_id(&pipeline_id).await.unwrap().unwrap().window;
    source.seed(&window, 1000);
    target.seed(&window, 1000);

    let validated = run_validator(
        &repo,
        &clock,
        &config.retry,
        &identity,
        &config.window,
        &source,
        &target,
        &generator_outcome,
    )
    .await
    .unwrap();

    assert!(matches!(validated, PhaseOutcome::Skip(_)));

    let record = repo.find_by_id(&pipeline_id).await.unwrap().unwrap();
    assert_eq!(record.pipeline_status, PhaseStatus::Pending);
    assert_eq!(record.retry_attempt, 0);
}

/// S4: audit observes `target_count > source_count` on its first poll and
/// fails with IntegrityViolation, invoking both stage and target cleanup and
/// clearing the lock with `retry_attempt` bumped to 1.
#[tokio::test]
async fn s4_integrity_violation_triggers_cleanup_and_reset() {
    let repo = new_repo().await;
    let metrics = MetricsService::new().unwrap();
    let mut config = AppConfig::default();
    config.audit.max_wait = "1s".to_string();
    let identity = sample_identity();
    let clock = FixedClock::new(2025, 1, 2, 1, 15, 0);

    let source = InMemorySource::new();
    let stage = InMemoryStage::new();
    let target = InMemoryTarget::new();

    let generator_outcome = run_generator(&repo, &clock, &identity, &config.window).await.unwrap();
    let pipeline_id = generator_outcome.pipeline_id.clone().unwrap();
    let window = repo.find_by_id(&pipeline_id).await.unwrap().unwrap().window;

    source.seed(&window, 500);
    stage.seed(&window, 501);
    target.seed(&window, 501);

    let mut record = repo.find_by_id(&pipeline_id).await.unwrap().unwrap();
    record.acquire("run-1", clock.now());
    repo.save(&record).await.unwrap();

    let audited = run_audit(
        &repo,
        &metrics,
        &clock,
        &config.retry,
        &config.audit,
        &source,
        &stage,
        &target,
        &record,
        false,
    )
    .await
    .unwrap();

    assert!(matches!(audited, PhaseOutcome::Fail(_)));

    let final_record = repo.find_by_id(&pipeline_id).await.unwrap().unwrap();
    assert_eq!(final_record.pipeline_status, PhaseStatus::Failed);
    assert_eq!(final_record.audit_result, Some(AuditResult::IntegrityViolation));
    assert_eq!(final_record.retry_attempt, 1);
    assert!(final_record.dag_run_id.is_none());
    assert_eq!(target.count(&window).await.unwrap(), 0);
}

/// S5: a source→stage phase hung IN_PROGRESS for 3 hours, threshold 2h; the
/// sweeper resets that phase and the lock to PENDING while preserving the
/// generator's own completion (it has no phase block of its own).
#[tokio::test]
async fn s5_sweeper_resets_hung_phase_and_preserves_completed_work() {
    let repo = new_repo().await;
    let metrics = MetricsService::new().unwrap();
    let identity = sample_identity();

    let start_clock = FixedClock::new(2025, 1, 2, 1, 15, 0);
    let generator_outcome = run_generator(&repo, &start_clock, &identity, &AppConfig::default().window)
        .await
        .unwrap();
    let pipeline_id = generator_outcome.pipeline_id.unwrap();

    let mut record = repo.find_by_id(&pipeline_id).await.unwrap().unwrap();
    record.acquire("stuck-run", start_clock.now());
    record.begin_phase(pipeline_domain::entities::Phase::SourceToStage, start_clock.now());
    repo.save(&record).await.unwrap();

    let later_clock = FixedClock::new(2025, 1, 2, 4, 15, 0); // 3 hours later
    let cleaned = run_sweeper(&repo, &metrics, &later_clock, chrono::Duration::hours(2)).await;
    assert_eq!(cleaned, 1);

    let swept = repo.find_by_id(&pipeline_id).await.unwrap().unwrap();
    assert_eq!(swept.pipeline_status, PhaseStatus::Pending);
    assert!(swept.dag_run_id.is_none());
    assert_eq!(swept.source_to_stage.status, PhaseStatus::Pending);
    assert_eq!(swept.retry_attempt, 1);
}

/// S6: two concurrent acquire attempts for the same pipeline_id; exactly one
/// wins the compare-and-set and the loser's state is left untouched.
#[tokio::test]
async fn s6_concurrent_acquire_has_exactly_one_winner() {
    let repo = new_repo().await;
    let identity = sample_identity();
    let clock = FixedClock::new(2025, 1, 2, 1, 15, 0);

    let generator_outcome = run_generator(&repo, &clock, &identity, &AppConfig::default().window)
        .await
        .unwrap();
    let pipeline_id = generator_outcome.pipeline_id.unwrap();

    let first = repo.acquire(&pipeline_id, "run-a", clock.now()).await.unwrap();
    let second = repo.acquire(&pipeline_id, "run-b", clock.now()).await.unwrap();

    assert!(first);
    assert!(!second);

    let record = repo.find_by_id(&pipeline_id).await.unwrap().unwrap();
    assert_eq!(record.dag_run_id.as_deref(), Some("run-a"));
}

/// S6b: source→stage itself must fail, not skip, when it loses the acquire
/// race — a lock conflict is a terminal outcome for the run, not a benign
/// no-op (spec.md: "fail the phase").
#[tokio::test]
async fn s6b_source_to_stage_fails_on_lock_conflict() {
    let repo = new_repo().await;
    let metrics = MetricsService::new().unwrap();
    let config = AppConfig::default();
    let identity = sample_identity();
    let clock = FixedClock::new(2025, 1, 2, 1, 15, 0);

    let source = InMemorySource::new();
    let stage = InMemoryStage::new();
    let source_to_stage = InMemoryTransfer::source_to_stage(&source, &stage);

    let generator_outcome = run_generator(&repo, &clock, &identity, &config.window).await.unwrap();
    let pipeline_id = generator_outcome.pipeline_id.clone().unwrap();
    let window = repo.find_by_id(&pipeline_id).await.unwrap().unwrap().window;
    source.seed(&window, 10);

    let mut record = repo.find_by_id(&pipeline_id).await.unwrap().unwrap();
    record.acquire("other-owner", clock.now());
    repo.save(&record).await.unwrap();

    let s2s = run_source_to_stage(&repo, &metrics, &clock, &config.retry, &source_to_stage, &record, "run-1")
        .await
        .unwrap();

    match s2s {
        PhaseOutcome::Fail(PipelineError::AcquireConflict(_)) => {}
        other => panic!("expected Fail(AcquireConflict), got {:?}", other),
    }

    let untouched = repo.find_by_id(&pipeline_id).await.unwrap().unwrap();
    assert_eq!(untouched.dag_run_id.as_deref(), Some("other-owner"));
}

/// S7: the validator observes an empty window (source and target both at
/// zero) up front, and that observation rides along so audit treats its own
/// zero/zero reading as success-with-no-data on the first poll rather than
/// waiting out the reconciliation budget (spec.md §4.11).
#[tokio::test]
async fn s7_validator_observed_empty_short_circuits_audit_to_success() {
    let repo = new_repo().await;
    let metrics = MetricsService::new().unwrap();
    let mut config = AppConfig::default();
    config.audit.max_wait = "1s".to_string();
    let identity = sample_identity();
    let clock = FixedClock::new(2025, 1, 2, 1, 15, 0);

    let source = InMemorySource::new();
    let stage = InMemoryStage::new();
    let target = InMemoryTarget::new();
    let source_to_stage = InMemoryTransfer::source_to_stage(&source, &stage);
    let stage_to_target = InMemoryTransfer::stage_to_target(&stage, &target);

    let generator_outcome = run_generator(&repo, &clock, &identity, &config.window).await.unwrap();
    // source and target are left unseeded (both read back as 0): a window
    // with no data has landed yet.

    let validated = run_validator(
        &repo,
        &clock,
        &config.retry,
        &identity,
        &config.window,
        &source,
        &target,
        &generator_outcome,
    )
    .await
    .unwrap();
    let (record, observed_empty) = match validated {
        PhaseOutcome::Success(validated) => (validated.record, validated.observed_empty),
        other => panic!("expected Success, got {:?}", other),
    };
    assert!(observed_empty);

    let s2s = run_source_to_stage(&repo, &metrics, &clock, &config.retry, &source_to_stage, &record, "run-1")
        .await
        .unwrap();
    assert!(matches!(s2s, PhaseOutcome::Success(0)));
    let record = repo.find_by_id(&record.pipeline_id).await.unwrap().unwrap();

    let s2t = run_stage_to_target(
        &repo,
        &metrics,
        &clock,
        &config.retry,
        &config.stage_to_target,
        &stage_to_target,
        &record,
    )
    .await
    .unwrap();
    assert!(matches!(s2t, PhaseOutcome::Success(0)));
    let record = repo.find_by_id(&record.pipeline_id).await.unwrap().unwrap();

    let audited = run_audit(
        &repo,
        &metrics,
        &clock,
        &config.retry,
        &config.audit,
        &source,
        &stage,
        &target,
        &record,
        observed_empty,
    )
    .await
    .unwrap();
    assert!(matches!(audited, PhaseOutcome::Success(AuditResult::Success)));

    let final_record = repo.find_by_id(&record.pipeline_id).await.unwrap().unwrap();
    assert_eq!(final_record.pipeline_status, PhaseStatus::Completed);
    assert_eq!(final_record.source_count, Some(0));
    assert_eq!(final_record.target_count, Some(0));
}
