// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Adapters
//!
//! Concrete implementations of the domain's external-collaborator contracts
//! ([`pipeline_domain::SourceAdapter`], [`pipeline_domain::StageAdapter`],
//! [`pipeline_domain::TargetAdapter`], the transfer traits, and
//! [`pipeline_domain::Clock`]). Only the in-memory [`reference`] adapters are
//! provided here; a real deployment wires in adapters for its actual source,
//! staging, and target systems, which is out of scope for this crate.

pub mod reference;
