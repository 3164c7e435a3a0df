// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Retry Harness (C5)
//!
//! Wraps an adapter call with bounded attempts and exponential backoff plus
//! jitter. Only [`PipelineError::is_recoverable`] errors are retried; the
//! AcquireConflict and other terminal categories propagate on the first
//! attempt.

use crate::infrastructure::config::RetryConfig;
use crate::infrastructure::metrics::MetricsService;
use pipeline_domain::error::PipelineError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Runs `f`, retrying up to `cfg.max_attempts` times on a recoverable error
/// with exponential backoff (`base_delay * multiplier^attempt`) plus up to
/// 20% uniform jitter. `operation_name` is only used for logging.
pub async fn retry<F, Fut, T>(
    cfg: &RetryConfig,
    operation_name: &str,
    metrics: Option<&MetricsService>,
    mut f: F,
) -> Result<T, PipelineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let base_delay = pipeline_domain::parse_duration(&cfg.base_delay)?
        .to_std()
        .map_err(|e| PipelineError::invalid_config(format!("retry.base_delay out of range: {}", e)))?;

    let mut attempt = 0u32;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt + 1 < cfg.max_attempts && err.is_recoverable() => {
                attempt += 1;
                if let Some(metrics) = metrics {
                    metrics.record_retry_attempt();
                }
                let delay = backoff_delay(base_delay, cfg.multiplier, attempt);
                warn!(
                    operation = operation_name,
                    attempt, error = %err, delay_ms = delay.as_millis() as u64, "retrying after recoverable error"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                if attempt > 0 {
                    if let Some(metrics) = metrics {
                        metrics.record_retries_exhausted();
                    }
                }
                debug!(operation = operation_name, attempts = attempt + 1, "operation finished without further retry");
                return Err(err);
            }
        }
    }
}

fn backoff_delay(base_delay: Duration, multiplier: f64, attempt: u32) -> Duration {
    let scaled = base_delay.as_secs_f64() * multiplier.powi(attempt as i32 - 1).max(1.0);
    let jitter_fraction = rand::rng().random_range(0.0..0.2);
    Duration::from_secs_f64(scaled * (1.0 + jitter_fraction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_retry_config() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay: "1ms".to_string(),
            multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn succeeds_without_retry_when_first_attempt_ok() {
        let calls = AtomicU32::new(0);
        let result = retry(&fast_retry_config(), "op", None, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, PipelineError>(42)
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_recoverable_errors_until_exhausted() {
        let calls = AtomicU32::new(0);
        let result: Result<(), PipelineError> = retry(&fast_retry_config(), "op", None, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(PipelineError::adapter_transient("timeout"))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_recoverable_errors_do_not_retry() {
        let calls = AtomicU32::new(0);
        let result: Result<(), PipelineError> = retry(&fast_retry_config(), "op", None, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(PipelineError::acquire_conflict("p1"))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
