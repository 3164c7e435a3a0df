// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Repositories
//!
//! Abstractions over durable storage. The domain depends only on
//! [`PipelineRecordRepository`]; concrete storage technology (SQLite via
//! `sqlx`, or an in-memory fake for tests) lives in the infrastructure layer.

mod pipeline_record_repository;

pub use pipeline_record_repository::PipelineRecordRepository;
