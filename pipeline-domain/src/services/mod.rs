// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Services
//!
//! Contracts for external collaborators ([`adapters`]) and the pure window
//! calculation algorithm ([`window_calculator`]). Neither depends on a
//! concrete I/O technology; infrastructure supplies implementations.

mod adapters;
mod window_calculator;

pub use adapters::{Clock, SourceAdapter, SourceToStageTransfer, StageAdapter, StageToTargetTransfer, TargetAdapter};
pub use window_calculator::{compute_window, WindowRequest};
