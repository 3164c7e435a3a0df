// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # External System Adapters
//!
//! Domain-service contracts for the four external collaborators named in the
//! design: the source system, the staging system, the target system, and the
//! transfer operation that moves data from source to stage. Infrastructure
//! provides concrete adapters (network clients, reference in-memory fakes);
//! the application layer's phase runners depend only on these traits.

use crate::error::PipelineError;
use crate::value_objects::Window;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

/// Wall-clock time, abstracted so phase runners and tests can supply a fixed
/// or simulated instant instead of reading the system clock directly.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The upstream system a pipeline reads counts and records from.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Number of records available in `window` at the source.
    async fn count(&self, window: &Window) -> Result<i64, PipelineError>;
}

/// The intermediate staging area a pipeline writes to and later reads counts
/// from for validation.
#[async_trait]
pub trait StageAdapter: Send + Sync {
    /// Number of records currently staged for `window`.
    async fn count(&self, window: &Window) -> Result<i64, PipelineError>;

    /// Removes any partially-staged data for `window`, used when a transfer
    /// is reset and retried.
    async fn clear(&self, window: &Window) -> Result<(), PipelineError>;
}

/// The downstream system a pipeline's audited data ultimately lands in.
#[async_trait]
pub trait TargetAdapter: Send + Sync {
    /// Number of records present at the target for `window`, used by the
    /// audit phase to reconcile against the source count.
    async fn count(&self, window: &Window) -> Result<i64, PipelineError>;

    /// Removes any data landed for `window`, invoked only by the audit
    /// phase's failure-path cleanup (audit is the sole authority that
    /// deletes data).
    async fn delete(&self, window: &Window) -> Result<(), PipelineError>;
}

/// Moves data for `window` from the source system into the staging area.
/// Implementations report how many records they moved so the validator can
/// compare against [`SourceAdapter::count`] without a second round trip.
#[async_trait]
pub trait SourceToStageTransfer: Send + Sync {
    async fn transfer(&self, window: &Window) -> Result<i64, PipelineError>;
}

/// Moves staged data for `window` on into the target system.
#[async_trait]
pub trait StageToTargetTransfer: Send + Sync {
    async fn transfer(&self, window: &Window) -> Result<i64, PipelineError>;
}
