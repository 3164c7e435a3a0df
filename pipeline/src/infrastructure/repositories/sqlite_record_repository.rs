// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # SQLite Record Repository
//!
//! Implements [`PipelineRecordRepository`] over a single `pipeline_records`
//! table: the full record is kept as a JSON blob (`data`), and a handful of
//! columns needed for filtering and compare-and-set predicates are kept in
//! sync alongside it on every write.

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use pipeline_domain::{
    AuditResult, Phase, PhaseStatus, PipelineError, PipelineId, PipelineIdentity, PipelineRecord,
    PipelineRecordRepository,
};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::schema::initialize_database;

pub struct SqliteRecordRepository {
    pool: SqlitePool,
}

impl SqliteRecordRepository {
    pub async fn new(database_path: &str) -> Result<Self, PipelineError> {
        debug!("connecting record store: {}", database_path);
        let database_url = if database_path == ":memory:" || database_path == "sqlite::memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}", database_path)
        };
        let pool = initialize_database(&database_url).await?;
        Ok(Self { pool })
    }

    async fn fetch(&self, pipeline_id: &PipelineId) -> Result<Option<PipelineRecord>, PipelineError> {
        let row = sqlx::query("SELECT data FROM pipeline_records WHERE pipeline_id = ?")
            .bind(pipeline_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PipelineError::store_error(format!("fetch failed: {}", e)))?;

        match row {
            Some(row) => {
                let data: String = row.get("data");
                let record: PipelineRecord = serde_json::from_str(&data)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn write(&self, record: &PipelineRecord) -> Result<(), PipelineError> {
        let data = serde_json::to_string(record)?;
        sqlx::query(
            r#"
            INSERT INTO pipeline_records (
                pipeline_id, identity_key, target_day, window_start, window_end,
                pipeline_status, dag_run_id, pipeline_start_time, data,
                record_first_created_time, record_last_updated_time
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(pipeline_id) DO UPDATE SET
                identity_key = excluded.identity_key,
                target_day = excluded.target_day,
                window_start = excluded.window_start,
                window_end = excluded.window_end,
                pipeline_status = excluded.pipeline_status,
                dag_run_id = excluded.dag_run_id,
                pipeline_start_time = excluded.pipeline_start_time,
                data = excluded.data,
                record_last_updated_time = excluded.record_last_updated_time
            "#,
        )
        .bind(record.pipeline_id.as_str())
        .bind(record.identity.identity_key())
        .bind(record.window.target_day.format("%Y-%m-%d").to_string())
        .bind(record.window.start.to_rfc3339())
        .bind(record.window.end.to_rfc3339())
        .bind(status_str(record.pipeline_status))
        .bind(&record.dag_run_id)
        .bind(record.pipeline_start_time.map(|t| t.to_rfc3339()))
        .bind(data)
        .bind(record.record_first_created_time.to_rfc3339())
        .bind(record.record_last_updated_time.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| PipelineError::store_error(format!("write failed: {}", e)))?;

        Ok(())
    }
}

fn status_str(status: PhaseStatus) -> &'static str {
    match status {
        PhaseStatus::Pending => "PENDING",
        PhaseStatus::InProgress => "IN_PROGRESS",
        PhaseStatus::Completed => "COMPLETED",
        PhaseStatus::Failed => "FAILED",
    }
}

#[async_trait]
impl PipelineRecordRepository for SqliteRecordRepository {
    async fn upsert_new(&self, record: &PipelineRecord) -> Result<bool, PipelineError> {
        let data = serde_json::to_string(record)?;
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO pipeline_records (
                pipeline_id, identity_key, target_day, window_start, window_end,
                pipeline_status, dag_run_id, pipeline_start_time, data,
                record_first_created_time, record_last_updated_time
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.pipeline_id.as_str())
        .bind(record.identity.identity_key())
        .bind(record.window.target_day.format("%Y-%m-%d").to_string())
        .bind(record.window.start.to_rfc3339())
        .bind(record.window.end.to_rfc3339())
        .bind(status_str(record.pipeline_status))
        .bind(&record.dag_run_id)
        .bind(record.pipeline_start_time.map(|t| t.to_rfc3339()))
        .bind(data)
        .bind(record.record_first_created_time.to_rfc3339())
        .bind(record.record_last_updated_time.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| PipelineError::store_error(format!("upsert_new failed: {}", e)))?;

        Ok(result.rows_affected() == 1)
    }

    async fn acquire(&self, pipeline_id: &PipelineId, dag_run_id: &str, now: DateTime<FixedOffset>) -> Result<bool, PipelineError> {
        let Some(mut record) = self.fetch(pipeline_id).await? else {
            return Err(PipelineError::RecordNotFound(pipeline_id.to_string()));
        };

        if !record.acquire(dag_run_id, now) {
            return Ok(false);
        }

        let data = serde_json::to_string(&record)?;
        let result = sqlx::query(
            r#"
            UPDATE pipeline_records
            SET data = ?, pipeline_status = ?, dag_run_id = ?, pipeline_start_time = ?, record_last_updated_time = ?
            WHERE pipeline_id = ? AND pipeline_status IN ('PENDING', 'FAILED') AND dag_run_id IS NULL
            "#,
        )
        .bind(data)
        .bind(status_str(record.pipeline_status))
        .bind(&record.dag_run_id)
        .bind(record.pipeline_start_time.map(|t| t.to_rfc3339()))
        .bind(now.to_rfc3339())
        .bind(pipeline_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| PipelineError::store_error(format!("acquire failed: {}", e)))?;

        Ok(result.rows_affected() == 1)
    }

    async fn begin_phase(&self, pipeline_id: &PipelineId, phase: Phase, now: DateTime<FixedOffset>) -> Result<(), PipelineError> {
        let Some(mut record) = self.fetch(pipeline_id).await? else {
            return Err(PipelineError::RecordNotFound(pipeline_id.to_string()));
        };
        record.begin_phase(phase, now);
        self.write(&record).await
    }

    async fn end_phase_ok(&self, pipeline_id: &PipelineId, phase: Phase, now: DateTime<FixedOffset>) -> Result<(), PipelineError> {
        let Some(mut record) = self.fetch(pipeline_id).await? else {
            return Err(PipelineError::RecordNotFound(pipeline_id.to_string()));
        };
        record.end_phase_ok(phase, now);
        self.write(&record).await
    }

    async fn reset_phase(
        &self,
        pipeline_id: &PipelineId,
        phase: Phase,
        now: DateTime<FixedOffset>,
        release_lock: bool,
    ) -> Result<(), PipelineError> {
        let Some(mut record) = self.fetch(pipeline_id).await? else {
            return Err(PipelineError::RecordNotFound(pipeline_id.to_string()));
        };
        record.reset_phase(phase, now, release_lock);
        self.write(&record).await
    }

    async fn finalize_ok(
        &self,
        pipeline_id: &PipelineId,
        now: DateTime<FixedOffset>,
        source_count: i64,
        target_count: i64,
    ) -> Result<(), PipelineError> {
        let Some(mut record) = self.fetch(pipeline_id).await? else {
            return Err(PipelineError::RecordNotFound(pipeline_id.to_string()));
        };
        record.finalize_ok(now, source_count, target_count);
        self.write(&record).await
    }

    async fn finalize_fail(&self, pipeline_id: &PipelineId, now: DateTime<FixedOffset>, result: AuditResult) -> Result<(), PipelineError> {
        let Some(mut record) = self.fetch(pipeline_id).await? else {
            return Err(PipelineError::RecordNotFound(pipeline_id.to_string()));
        };
        record.finalize_fail(now, result);
        self.write(&record).await
    }

    async fn select_max_window_end(
        &self,
        identity: &PipelineIdentity,
        target_day: NaiveDate,
    ) -> Result<Option<DateTime<FixedOffset>>, PipelineError> {
        let row = sqlx::query("SELECT MAX(window_end) AS max_end FROM pipeline_records WHERE identity_key = ? AND target_day = ?")
            .bind(identity.identity_key())
            .bind(target_day.format("%Y-%m-%d").to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PipelineError::store_error(format!("select_max_window_end failed: {}", e)))?;

        let max_end: Option<String> = row.get("max_end");
        match max_end {
            Some(s) => {
                let parsed = DateTime::parse_from_rfc3339(&s)
                    .map_err(|e| PipelineError::store_error(format!("corrupt window_end '{}': {}", s, e)))?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    async fn select_recorded_counts(&self, pipeline_id: &PipelineId) -> Result<Option<(i64, i64)>, PipelineError> {
        let record = self.fetch(pipeline_id).await?;
        Ok(record.and_then(|r| match (r.source_count, r.target_count) {
            (Some(s), Some(t)) => Some((s, t)),
            _ => None,
        }))
    }

    async fn select_stale(&self, now: DateTime<FixedOffset>, threshold: Duration) -> Result<Vec<PipelineRecord>, PipelineError> {
        let rows = sqlx::query("SELECT data FROM pipeline_records WHERE pipeline_status = 'IN_PROGRESS' AND dag_run_id IS NOT NULL")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PipelineError::store_error(format!("select_stale failed: {}", e)))?;

        let mut stale = Vec::new();
        for row in rows {
            let data: String = row.get("data");
            let record: PipelineRecord = serde_json::from_str(&data)?;
            if let Some(start) = record.pipeline_start_time {
                if now - start > threshold {
                    stale.push(record);
                }
            }
        }
        Ok(stale)
    }

    async fn find_by_id(&self, pipeline_id: &PipelineId) -> Result<Option<PipelineRecord>, PipelineError> {
        self.fetch(pipeline_id).await
    }

    async fn save(&self, record: &PipelineRecord) -> Result<(), PipelineError> {
        self.write(record).await
    }
}
