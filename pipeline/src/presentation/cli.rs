// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface
//!
//! Stands in for the external workflow host for local runs and tests: `run`
//! drives one full scheduled execution (generator → validator → source→stage
//! → stage→target → audit), honoring skip/fail short-circuiting, then always
//! invokes the sweeper regardless of outcome; `sweep` invokes the sweeper in
//! isolation. Both use the reference in-memory adapters — wiring in adapters
//! for a real source/stage/target system is left to the deployment.

use crate::application::services::phases::{
    run_audit, run_generator, run_source_to_stage, run_stage_to_target, run_sweeper, run_validator,
};
use crate::application::services::PhaseOutcome;
use crate::infrastructure::adapters::reference::{InMemorySource, InMemoryStage, InMemoryTarget, InMemoryTransfer, SystemClock};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::logging::{LogFormat, ObservabilityService};
use crate::infrastructure::metrics::MetricsService;
use crate::infrastructure::repositories::SqliteRecordRepository;
use bootstrap::cli::GlobalArgs;
use bootstrap::exit_code::ExitCode;
use bootstrap::shutdown::{CancellationToken, ShutdownCoordinator};
use bootstrap::signals::create_signal_handler;
use clap::{Parser, Subcommand};
use pipeline_domain::error::PipelineError;
use pipeline_domain::{Clock, PipelineIdentity, PipelineRecordRepository};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "pipeline")]
#[command(about = concat!("Optimized Adaptive Pipeline RS v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one full scheduled execution for an identity triple: generator,
    /// validator, source→stage, stage→target, audit, then the sweeper.
    Run {
        /// Identity triple as JSON: `{"source":{...},"stage":{...},"target":{...}}`,
        /// each endpoint shaped `{"id","name","category","sub_category"}`.
        #[arg(long)]
        identity: String,

        /// Owner id recorded on the acquired lock; defaults to a fresh UUID.
        #[arg(long)]
        dag_run_id: Option<String>,
    },

    /// Run only the stale-lock sweeper.
    Sweep,
}

pub async fn run(cli: Cli) -> Result<ExitCode, PipelineError> {
    let config = AppConfig::load(
        cli.global
            .config
            .clone()
            .unwrap_or_else(|| "config/pipeline.toml".into()),
    )?;

    let log_format = if cli.global.json_logs { LogFormat::Json } else { LogFormat::Pretty };
    let log_level = if cli.global.verbose { "debug" } else { "info" };
    ObservabilityService::init(log_level, log_format)?;

    let metrics = MetricsService::new()?;

    let database_path = cli
        .global
        .database
        .clone()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.database.path.clone());
    let repo = SqliteRecordRepository::new(&database_path).await?;

    let clock = SystemClock;

    let shutdown = ShutdownCoordinator::default();
    let signal_handler = create_signal_handler();
    let shutdown_for_signals = shutdown.clone();
    tokio::spawn(async move {
        signal_handler
            .wait_for_signal(Box::new(move || shutdown_for_signals.initiate_shutdown()))
            .await;
    });

    match cli.command {
        Command::Run { identity, dag_run_id } => {
            let identity: PipelineIdentity = serde_json::from_str(&identity)
                .map_err(|e| PipelineError::invalid_config(format!("invalid --identity JSON: {}", e)))?;
            let dag_run_id = dag_run_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

            let outcome = run_scheduled(&repo, &metrics, &clock, &config, &identity, &dag_run_id, &shutdown.token()).await?;
            run_sweeper(&repo, &metrics, &clock, sweeper_threshold(&config)?).await;
            Ok(outcome)
        }
        Command::Sweep => {
            let cleaned = run_sweeper(&repo, &metrics, &clock, sweeper_threshold(&config)?).await;
            info!(cleaned, "sweeper run complete");
            Ok(ExitCode::Success)
        }
    }
}

fn sweeper_threshold(config: &AppConfig) -> Result<chrono::Duration, PipelineError> {
    pipeline_domain::parse_duration(&config.sweeper.stale_threshold)
}

/// One full generator → validator → s→s → s→t → audit pass for `identity`,
/// short-circuiting on the first `Skip` or `Fail` per the host contracts.
/// Checked between phases against `shutdown`, which a signal handler cancels
/// from outside, so a SIGTERM/SIGINT stops the run at a phase boundary
/// instead of mid-write.
async fn run_scheduled(
    repo: &SqliteRecordRepository,
    metrics: &MetricsService,
    clock: &dyn Clock,
    config: &AppConfig,
    identity: &PipelineIdentity,
    dag_run_id: &str,
    shutdown: &CancellationToken,
) -> Result<ExitCode, PipelineError> {
    let source = InMemorySource::new();
    let stage = InMemoryStage::new();
    let target = InMemoryTarget::new();
    let source_to_stage = InMemoryTransfer::source_to_stage(&source, &stage);
    let stage_to_target = InMemoryTransfer::stage_to_target(&stage, &target);

    let generator_outcome = run_generator(repo, clock, identity, &config.window).await?;
    if !generator_outcome.record_present {
        info!("run: generator produced no record, nothing to do today");
        return Ok(ExitCode::Success);
    }

    if shutdown.is_cancelled() {
        warn!("run: shutdown requested before validator, stopping at phase boundary");
        return Ok(ExitCode::Terminated);
    }

    let validated = run_validator(
        repo,
        clock,
        &config.retry,
        identity,
        &config.window,
        &source,
        &target,
        &generator_outcome,
    )
    .await?;
    let (record, validator_observed_empty) = match validated {
        PhaseOutcome::Success(validated) => (validated.record, validated.observed_empty),
        PhaseOutcome::Skip(reason) => {
            info!(reason = %reason, "run: validator skipped this window");
            return Ok(ExitCode::Success);
        }
        PhaseOutcome::Fail(err) => {
            error!(error = %err, "run: validator failed");
            return Ok(ExitCode::from_error(&err));
        }
    };

    if shutdown.is_cancelled() {
        warn!("run: shutdown requested before source→stage, stopping at phase boundary");
        return Ok(ExitCode::Terminated);
    }

    let s2s = run_source_to_stage(repo, metrics, clock, &config.retry, &source_to_stage, &record, dag_run_id).await?;
    let record = match s2s {
        PhaseOutcome::Success(_) => repo
            .find_by_id(&record.pipeline_id)
            .await?
            .ok_or_else(|| PipelineError::internal_error("record vanished after source→stage"))?,
        PhaseOutcome::Skip(reason) => {
            warn!(reason = %reason, "run: source→stage skipped (lock conflict)");
            return Ok(ExitCode::Success);
        }
        PhaseOutcome::Fail(err) => {
            error!(error = %err, "run: source→stage failed");
            return Ok(ExitCode::from_error(&err));
        }
    };

    if shutdown.is_cancelled() {
        warn!("run: shutdown requested before stage→target, stopping at phase boundary");
        return Ok(ExitCode::Terminated);
    }

    let s2t = run_stage_to_target(repo, metrics, clock, &config.retry, &config.stage_to_target, &stage_to_target, &record).await?;
    let record = match s2t {
        PhaseOutcome::Success(_) => repo
            .find_by_id(&record.pipeline_id)
            .await?
            .ok_or_else(|| PipelineError::internal_error("record vanished after stage→target"))?,
        PhaseOutcome::Skip(reason) => {
            warn!(reason = %reason, "run: stage→target skipped");
            return Ok(ExitCode::Success);
        }
        PhaseOutcome::Fail(err) => {
            error!(error = %err, "run: stage→target failed");
            return Ok(ExitCode::from_error(&err));
        }
    };

    let audited = run_audit(
        repo,
        metrics,
        clock,
        &config.retry,
        &config.audit,
        &source,
        &stage,
        &target,
        &record,
        validator_observed_empty,
    )
    .await?;
    match audited {
        PhaseOutcome::Success(result) => {
            info!(?result, "run: audit complete, pipeline COMPLETED");
            Ok(ExitCode::Success)
        }
        PhaseOutcome::Skip(reason) => {
            info!(reason = %reason, "run: audit skipped");
            Ok(ExitCode::Success)
        }
        PhaseOutcome::Fail(err) => {
            error!(error = %err, "run: audit failed, pipeline reset for retry");
            Ok(ExitCode::from_error(&err))
        }
    }
}
