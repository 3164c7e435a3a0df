// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metrics Service
//!
//! Prometheus metrics for the control plane: phase outcomes, lock contention,
//! retry activity, and audit reconciliation. Observability only — no
//! control-plane invariant depends on any of these being read.

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::Arc;
use tracing::debug;

use pipeline_domain::error::PipelineError;

/// Prometheus registry and counters for the orchestrator's phases.
#[derive(Clone)]
pub struct MetricsService {
    registry: Arc<Registry>,

    phases_started_total: IntCounterVec,
    phases_completed_total: IntCounterVec,
    phases_failed_total: IntCounterVec,
    phases_reset_total: IntCounterVec,

    acquire_conflicts_total: IntCounter,
    retry_attempts_total: IntCounter,
    retries_exhausted_total: IntCounter,

    audit_reconciliation_iterations: Histogram,
    audit_mismatches_total: IntCounter,
    audit_integrity_violations_total: IntCounter,

    stale_locks_swept_total: IntCounter,
}

impl MetricsService {
    pub fn new() -> Result<Self, PipelineError> {
        let registry = Registry::new();

        let phases_started_total = IntCounterVec::new(
            Opts::new("pipeline_phases_started_total", "Phases begun, by phase name").namespace("pipeline"),
            &["phase"],
        )
        .map_err(|e| PipelineError::metrics_error(format!("failed to create phases_started_total: {}", e)))?;

        let phases_completed_total = IntCounterVec::new(
            Opts::new("pipeline_phases_completed_total", "Phases completed, by phase name").namespace("pipeline"),
            &["phase"],
        )
        .map_err(|e| PipelineError::metrics_error(format!("failed to create phases_completed_total: {}", e)))?;

        let phases_failed_total = IntCounterVec::new(
            Opts::new("pipeline_phases_failed_total", "Phases failed, by phase name").namespace("pipeline"),
            &["phase"],
        )
        .map_err(|e| PipelineError::metrics_error(format!("failed to create phases_failed_total: {}", e)))?;

        let phases_reset_total = IntCounterVec::new(
            Opts::new("pipeline_phases_reset_total", "Phases reset back to PENDING, by phase name").namespace("pipeline"),
            &["phase"],
        )
        .map_err(|e| PipelineError::metrics_error(format!("failed to create phases_reset_total: {}", e)))?;

        let acquire_conflicts_total = IntCounter::with_opts(
            Opts::new(
                "pipeline_acquire_conflicts_total",
                "ACQUIRE attempts that lost the compare-and-set race",
            )
            .namespace("pipeline"),
        )
        .map_err(|e| PipelineError::metrics_error(format!("failed to create acquire_conflicts_total: {}", e)))?;

        let retry_attempts_total = IntCounter::with_opts(
            Opts::new("pipeline_retry_attempts_total", "Retry attempts issued by the retry harness").namespace("pipeline"),
        )
        .map_err(|e| PipelineError::metrics_error(format!("failed to create retry_attempts_total: {}", e)))?;

        let retries_exhausted_total = IntCounter::with_opts(
            Opts::new(
                "pipeline_retries_exhausted_total",
                "Operations that failed after exhausting retry.max_attempts",
            )
            .namespace("pipeline"),
        )
        .map_err(|e| PipelineError::metrics_error(format!("failed to create retries_exhausted_total: {}", e)))?;

        let audit_reconciliation_iterations = Histogram::with_opts(
            HistogramOpts::new(
                "pipeline_audit_reconciliation_iterations",
                "Poll iterations spent in the audit phase's reconciliation loop",
            )
            .namespace("pipeline")
            .buckets(vec![0.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0]),
        )
        .map_err(|e| PipelineError::metrics_error(format!("failed to create audit_reconciliation_iterations: {}", e)))?;

        let audit_mismatches_total = IntCounter::with_opts(
            Opts::new("pipeline_audit_mismatches_total", "Audits that exhausted their budget without matching counts")
                .namespace("pipeline"),
        )
        .map_err(|e| PipelineError::metrics_error(format!("failed to create audit_mismatches_total: {}", e)))?;

        let audit_integrity_violations_total = IntCounter::with_opts(
            Opts::new(
                "pipeline_audit_integrity_violations_total",
                "Audits observing target_count > source_count",
            )
            .namespace("pipeline"),
        )
        .map_err(|e| PipelineError::metrics_error(format!("failed to create audit_integrity_violations_total: {}", e)))?;

        let stale_locks_swept_total = IntCounter::with_opts(
            Opts::new("pipeline_stale_locks_swept_total", "Hung in-progress phases reset by the sweeper").namespace("pipeline"),
        )
        .map_err(|e| PipelineError::metrics_error(format!("failed to create stale_locks_swept_total: {}", e)))?;

        for metric in [
            Box::new(phases_started_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(phases_completed_total.clone()),
            Box::new(phases_failed_total.clone()),
            Box::new(phases_reset_total.clone()),
            Box::new(acquire_conflicts_total.clone()),
            Box::new(retry_attempts_total.clone()),
            Box::new(retries_exhausted_total.clone()),
            Box::new(audit_reconciliation_iterations.clone()),
            Box::new(audit_mismatches_total.clone()),
            Box::new(audit_integrity_violations_total.clone()),
            Box::new(stale_locks_swept_total.clone()),
        ] {
            registry
                .register(metric)
                .map_err(|e| PipelineError::metrics_error(format!("failed to register metric: {}", e)))?;
        }

        debug!("MetricsService initialized with Prometheus registry");

        Ok(Self {
            registry: Arc::new(registry),
            phases_started_total,
            phases_completed_total,
            phases_failed_total,
            phases_reset_total,
            acquire_conflicts_total,
            retry_attempts_total,
            retries_exhausted_total,
            audit_reconciliation_iterations,
            audit_mismatches_total,
            audit_integrity_violations_total,
            stale_locks_swept_total,
        })
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn record_phase_started(&self, phase: &str) {
        self.phases_started_total.with_label_values(&[phase]).inc();
    }

    pub fn record_phase_completed(&self, phase: &str) {
        self.phases_completed_total.with_label_values(&[phase]).inc();
    }

    pub fn record_phase_failed(&self, phase: &str) {
        self.phases_failed_total.with_label_values(&[phase]).inc();
    }

    pub fn record_phase_reset(&self, phase: &str) {
        self.phases_reset_total.with_label_values(&[phase]).inc();
    }

    pub fn record_acquire_conflict(&self) {
        self.acquire_conflicts_total.inc();
    }

    pub fn record_retry_attempt(&self) {
        self.retry_attempts_total.inc();
    }

    pub fn record_retries_exhausted(&self) {
        self.retries_exhausted_total.inc();
    }

    pub fn record_audit_reconciliation_iterations(&self, iterations: u32) {
        self.audit_reconciliation_iterations.observe(iterations as f64);
    }

    pub fn record_audit_mismatch(&self) {
        self.audit_mismatches_total.inc();
    }

    pub fn record_audit_integrity_violation(&self) {
        self.audit_integrity_violations_total.inc();
    }

    pub fn record_stale_locks_swept(&self, count: u64) {
        self.stale_locks_swept_total.inc_by(count);
    }
}
