// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Identity
//!
//! Identity value objects for the (source, stage, target) triple a pipeline
//! record belongs to, and the deterministic [`PipelineId`] derived from that
//! triple plus a processing window (C3 in the design).

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A source, stage, or target endpoint's identity. The three endpoints of a
/// pipeline share this shape; spec.md names them `source_{id,name,category,
/// sub_category}` etc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointIdentity {
    pub id: String,
    pub name: String,
    pub category: String,
    pub sub_category: String,
}

impl EndpointIdentity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        sub_category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            sub_category: sub_category.into(),
        }
    }

    fn canonical(&self) -> String {
        format!("{}|{}|{}|{}", self.id, self.name, self.category, self.sub_category)
    }
}

/// The (source, stage, target) triple a pipeline record moves data through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineIdentity {
    pub source: EndpointIdentity,
    pub stage: EndpointIdentity,
    pub target: EndpointIdentity,
}

impl PipelineIdentity {
    pub fn new(source: EndpointIdentity, stage: EndpointIdentity, target: EndpointIdentity) -> Self {
        Self { source, stage, target }
    }

    fn canonical(&self) -> String {
        format!(
            "{}::{}::{}",
            self.source.canonical(),
            self.stage.canonical(),
            self.target.canonical()
        )
    }

    /// Stable string key for this identity triple, used by repository
    /// implementations to index records without re-deriving a `PipelineId`
    /// (which also folds in the window).
    pub fn identity_key(&self) -> String {
        self.canonical()
    }
}

/// Stable, deterministic identifier for a pipeline record: the first 32 hex
/// characters of a SHA-256 digest over the identity triple and window
/// boundaries in canonical ISO-8601 form (invariant 1 in spec.md §3 — this is
/// a collision-resistant key, not a security property).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineId(String);

impl PipelineId {
    pub fn compute(
        identity: &PipelineIdentity,
        target_day: NaiveDate,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Self {
        let canonical = format!(
            "{}::{}::{}::{}",
            identity.canonical(),
            target_day.format("%Y-%m-%d"),
            window_start.to_rfc3339(),
            window_end.to_rfc3339(),
        );

        let digest = Sha256::digest(canonical.as_bytes());
        let hex = format!("{:x}", digest);
        Self(hex[..32].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reconstructs a `PipelineId` from its persisted string form, e.g. when
    /// loading a record back out of the store.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_identity() -> PipelineIdentity {
        PipelineIdentity::new(
            EndpointIdentity::new("src-1", "orders-db", "database", "postgres"),
            EndpointIdentity::new("stg-1", "landing", "object-store", "s3"),
            EndpointIdentity::new("tgt-1", "warehouse", "warehouse", "snowflake"),
        )
    }

    #[test]
    fn same_inputs_yield_same_id() {
        let identity = sample_identity();
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let start = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .unwrap();
        let end = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 1, 0, 30, 0)
            .unwrap();

        let id_a = PipelineId::compute(&identity, day, start, end);
        let id_b = PipelineId::compute(&identity, day, start, end);
        assert_eq!(id_a, id_b);
        assert_eq!(id_a.as_str().len(), 32);
    }

    #[test]
    fn different_windows_yield_different_ids() {
        let identity = sample_identity();
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let tz = FixedOffset::east_opt(0).unwrap();
        let start = tz.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end_a = tz.with_ymd_and_hms(2025, 1, 1, 0, 30, 0).unwrap();
        let end_b = tz.with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap();

        let id_a = PipelineId::compute(&identity, day, start, end_a);
        let id_b = PipelineId::compute(&identity, day, start, end_b);
        assert_ne!(id_a, id_b);
    }
}
