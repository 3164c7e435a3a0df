// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Repository Layer
//!
//! Concrete implementation of [`pipeline_domain::PipelineRecordRepository`]
//! over SQLite.

mod schema;
mod sqlite_record_repository;

pub use sqlite_record_repository::SqliteRecordRepository;
