// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Entities
//!
//! Objects with identity that persists through state changes. The only
//! entity in this domain is [`PipelineRecord`]; phases and their blocks are
//! its constituent parts, not separate entities.

mod pipeline_record;

pub use pipeline_record::{AuditResult, Phase, PhaseBlock, PhaseStatus, PipelineRecord, RecordMetadata};
