// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! In-memory fakes for the source/stage/target systems and the transfer
//! operations between them. Counts are keyed by window, so a test can seed a
//! source count and observe it propagate through a transfer.

use async_trait::async_trait;
use pipeline_domain::{
    PipelineError, SourceAdapter, SourceToStageTransfer, StageAdapter, StageToTargetTransfer, TargetAdapter, Window,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn window_key(window: &Window) -> String {
    format!("{}|{}", window.start.to_rfc3339(), window.end.to_rfc3339())
}

type Counts = Arc<Mutex<HashMap<String, i64>>>;

/// Preset source record counts per window.
#[derive(Clone, Default)]
pub struct InMemorySource {
    counts: Counts,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, window: &Window, count: i64) {
        self.counts.lock().unwrap().insert(window_key(window), count);
    }
}

#[async_trait]
impl SourceAdapter for InMemorySource {
    async fn count(&self, window: &Window) -> Result<i64, PipelineError> {
        Ok(*self.counts.lock().unwrap().get(&window_key(window)).unwrap_or(&0))
    }
}

/// Staging area: records land here after [`InMemoryTransfer::transfer`] and
/// are readable back out via [`StageAdapter::count`].
#[derive(Clone, Default)]
pub struct InMemoryStage {
    counts: Counts,
}

impl InMemoryStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, window: &Window, count: i64) {
        self.counts.lock().unwrap().insert(window_key(window), count);
    }
}

#[async_trait]
impl StageAdapter for InMemoryStage {
    async fn count(&self, window: &Window) -> Result<i64, PipelineError> {
        Ok(*self.counts.lock().unwrap().get(&window_key(window)).unwrap_or(&0))
    }

    async fn clear(&self, window: &Window) -> Result<(), PipelineError> {
        self.counts.lock().unwrap().remove(&window_key(window));
        Ok(())
    }
}

/// Target system: the final landing spot, read by the audit phase.
#[derive(Clone, Default)]
pub struct InMemoryTarget {
    counts: Counts,
}

impl InMemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, window: &Window, count: i64) {
        self.counts.lock().unwrap().insert(window_key(window), count);
    }
}

#[async_trait]
impl TargetAdapter for InMemoryTarget {
    async fn count(&self, window: &Window) -> Result<i64, PipelineError> {
        Ok(*self.counts.lock().unwrap().get(&window_key(window)).unwrap_or(&0))
    }

    async fn delete(&self, window: &Window) -> Result<(), PipelineError> {
        self.counts.lock().unwrap().remove(&window_key(window));
        Ok(())
    }
}

/// Moves a window's count from one in-memory store to another, implementing
/// both transfer contracts — the two data-movement phases differ only in
/// which pair of stores they're wired to.
#[derive(Clone)]
pub struct InMemoryTransfer {
    from: Counts,
    to: Counts,
}

impl InMemoryTransfer {
    pub fn source_to_stage(source: &InMemorySource, stage: &InMemoryStage) -> Self {
        Self {
            from: source.counts.clone(),
            to: stage.counts.clone(),
        }
    }

    pub fn stage_to_target(stage: &InMemoryStage, target: &InMemoryTarget) -> Self {
        Self {
            from: stage.counts.clone(),
            to: target.counts.clone(),
        }
    }

    fn move_count(&self, window: &Window) -> i64 {
        let key = window_key(window);
        let count = *self.from.lock().unwrap().get(&key).unwrap_or(&0);
        self.to.lock().unwrap().insert(key, count);
        count
    }
}

#[async_trait]
impl SourceToStageTransfer for InMemoryTransfer {
    async fn transfer(&self, window: &Window) -> Result<i64, PipelineError> {
        Ok(self.move_count(window))
    }
}

#[async_trait]
impl StageToTargetTransfer for InMemoryTransfer {
    async fn transfer(&self, window: &Window) -> Result<i64, PipelineError> {
        Ok(self.move_count(window))
    }
}
