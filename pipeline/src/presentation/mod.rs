// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Presentation Layer
//!
//! The `pipeline` binary's CLI, standing in locally for the external
//! workflow host that would otherwise schedule phase invocations.

pub mod cli;
