// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Logging
//!
//! Structured logging setup ([`ObservabilityService`]) built on `tracing`.

mod observability_service;

pub use observability_service::{LogFormat, ObservabilityService};
