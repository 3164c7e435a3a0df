// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Record Store Schema
//!
//! `pipeline_records` stores one row per [`PipelineRecord`](pipeline_domain::PipelineRecord),
//! JSON-serialized in full (`data`), alongside a handful of indexed columns
//! that the repository's compare-and-set queries and lookups filter on
//! directly rather than round-tripping through JSON.

use pipeline_domain::PipelineError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub async fn initialize_database(database_url: &str) -> Result<SqlitePool, PipelineError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| PipelineError::store_error(format!("invalid database url '{}': {}", database_url, e)))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| PipelineError::store_error(format!("failed to connect: {}", e)))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipeline_records (
            pipeline_id TEXT PRIMARY KEY,
            identity_key TEXT NOT NULL,
            target_day TEXT NOT NULL,
            window_start TEXT NOT NULL,
            window_end TEXT NOT NULL,
            pipeline_status TEXT NOT NULL,
            dag_run_id TEXT,
            pipeline_start_time TEXT,
            data TEXT NOT NULL,
            record_first_created_time TEXT NOT NULL,
            record_last_updated_time TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .map_err(|e| PipelineError::store_error(format!("failed to create schema: {}", e)))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_pipeline_records_identity_day ON pipeline_records(identity_key, target_day)")
        .execute(&pool)
        .await
        .map_err(|e| PipelineError::store_error(format!("failed to create index: {}", e)))?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pipeline_records_stale ON pipeline_records(pipeline_status, pipeline_start_time)",
    )
    .execute(&pool)
    .await
    .map_err(|e| PipelineError::store_error(format!("failed to create index: {}", e)))?;

    Ok(pool)
}
