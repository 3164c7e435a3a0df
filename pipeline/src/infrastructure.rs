// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Layer
//!
//! Concrete implementations of the domain's ports, following Hexagonal
//! Architecture: this layer depends on `pipeline-domain`, never the reverse.
//!
//! - [`adapters`] — source/stage/target/transfer/clock adapters (reference
//!   in-memory implementations; real deployments wire in their own).
//! - [`config`] — layered `AppConfig` loading.
//! - [`logging`] — `tracing` subscriber setup.
//! - [`metrics`] — Prometheus registry and counters.
//! - [`repositories`] — the SQLite-backed [`pipeline_domain::PipelineRecordRepository`].

pub mod adapters;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod repositories;
