// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! Hierarchical error type for the orchestrator's control plane. Errors are
//! categorized so the phase runner and retry harness can decide, without
//! inspecting messages, whether a failure is transient (retry), a benign
//! short-circuit (skip), or terminal (reset the phase and surface it).

use thiserror::Error;

/// Domain-specific errors for the pipeline control plane.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    /// Malformed duration string or configuration value. Fatal for the run;
    /// no state is written.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Record store unreachable, or a CAS operation failed for a reason
    /// other than its precondition not holding.
    #[error("store error: {0}")]
    StoreError(String),

    /// A source/stage/target/transfer adapter call failed after the retry
    /// harness exhausted its attempts.
    #[error("adapter error: {0}")]
    AdapterTransient(String),

    /// ACQUIRE's compare-and-set precondition was not met: another run
    /// already holds the lock. The record is left untouched.
    #[error("pipeline {0} is already in progress under another owner")]
    AcquireConflict(String),

    /// Audit observed `target_count > source_count` for the window.
    #[error("integrity violation: target_count {target} > source_count {source}")]
    IntegrityViolation { source: i64, target: i64 },

    /// Audit's reconciliation budget was exhausted without counts matching.
    #[error("mismatch after reconciliation budget exhausted: source={source}, target={target}")]
    Mismatch { source: i64, target: i64 },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("pipeline record not found: {0}")]
    RecordNotFound(String),

    #[error("internal error: {0}")]
    InternalError(String),

    #[error("metrics error: {0}")]
    MetricsError(String),
}

impl PipelineError {
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    pub fn store_error(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn adapter_transient(msg: impl Into<String>) -> Self {
        Self::AdapterTransient(msg.into())
    }

    pub fn acquire_conflict(pipeline_id: impl Into<String>) -> Self {
        Self::AcquireConflict(pipeline_id.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn validation_error(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    pub fn metrics_error(msg: impl Into<String>) -> Self {
        Self::MetricsError(msg.into())
    }

    /// Errors that the retry harness should attempt again.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PipelineError::AdapterTransient(_) | PipelineError::StoreError(_))
    }

    /// Errors that leave the pipeline's `IN_PROGRESS` lock in place and must
    /// never trigger a phase reset (the caller never acquired anything).
    pub fn is_acquire_conflict(&self) -> bool {
        matches!(self, PipelineError::AcquireConflict(_))
    }

    pub fn category(&self) -> &'static str {
        match self {
            PipelineError::ParseError(_) => "parse",
            PipelineError::StoreError(_) => "store",
            PipelineError::AdapterTransient(_) => "adapter",
            PipelineError::AcquireConflict(_) => "concurrency",
            PipelineError::IntegrityViolation { .. } => "integrity",
            PipelineError::Mismatch { .. } => "audit",
            PipelineError::InvalidConfiguration(_) => "configuration",
            PipelineError::ValidationError(_) => "validation",
            PipelineError::SerializationError(_) => "serialization",
            PipelineError::RecordNotFound(_) => "not_found",
            PipelineError::InternalError(_) => "internal",
            PipelineError::MetricsError(_) => "metrics",
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::StoreError(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::SerializationError(err.to_string())
    }
}

// sqlx errors are mapped explicitly at each call site in the infrastructure
// layer (`.map_err(|e| PipelineError::store_error(...))`), not via a blanket
// `From`, so the domain crate never needs to depend on sqlx.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_errors_are_flagged() {
        assert!(PipelineError::adapter_transient("timeout").is_recoverable());
        assert!(PipelineError::store_error("pool exhausted").is_recoverable());
        assert!(!PipelineError::acquire_conflict("p1").is_recoverable());
    }

    #[test]
    fn categories_are_distinct_for_control_flow() {
        assert_eq!(PipelineError::ParseError("x".into()).category(), "parse");
        assert_eq!(
            PipelineError::IntegrityViolation { source: 10, target: 11 }.category(),
            "integrity"
        );
    }

    #[test]
    fn acquire_conflict_never_recoverable_via_retry() {
        let err = PipelineError::acquire_conflict("pipe-1");
        assert!(err.is_acquire_conflict());
        assert!(!err.is_recoverable());
    }
}
