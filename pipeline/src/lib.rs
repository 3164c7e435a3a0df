// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline
//!
//! The control-plane orchestrator's application, infrastructure, and
//! presentation layers. Exposed as a library, with `main.rs` a thin binary
//! shim, so `tests/` can drive real phase sequences against an in-memory
//! SQLite store instead of re-deriving the logic under test.

pub mod application;
pub mod infrastructure;
pub mod presentation;
