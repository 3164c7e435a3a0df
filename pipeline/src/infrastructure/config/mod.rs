// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Configuration
//!
//! Layered configuration loading for the orchestrator ([`AppConfig`]).

mod app_config;

pub use app_config::{AppConfig, AuditConfig, DatabaseConfig, LockConfig, RetryConfig, StageToTargetConfig, SweeperConfig, WindowConfig};
