// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Orchestrator CLI
//!
//! Entry point for the `pipeline` binary. Parses CLI flags, loads the
//! layered configuration, installs structured logging, then hands off to the
//! presentation layer which drives the control-plane phases.

use bootstrap::exit_code::ExitCode;
use clap::Parser;
use pipeline::presentation::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let exit_code = match pipeline::presentation::cli::run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("pipeline: {}", err);
            ExitCode::from_error(&err)
        }
    };

    std::process::exit(exit_code.as_i32());
}
