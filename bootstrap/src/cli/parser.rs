// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! The global, bootstrap-owned flags, defined as a `clap::Args` struct so the
//! `pipeline` binary's presentation layer can `#[command(flatten)]` them
//! alongside its own phase subcommands (generate/validate/run/...).
//!
//! Security validation of the parsed path-like arguments happens in the
//! [`super::validator`] module after parsing.

use clap::Args;
use std::path::PathBuf;

/// Global CLI flags shared by every invocation of the `pipeline` binary.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Layered TOML configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the sqlite record store path
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Log output as JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        global: GlobalArgs,
    }

    #[test]
    fn parses_bare_invocation() {
        let cli = TestCli::parse_from(["pipeline"]);
        assert!(!cli.global.verbose);
        assert!(cli.global.config.is_none());
    }

    #[test]
    fn parses_config_and_database_overrides() {
        let cli = TestCli::parse_from(["pipeline", "--config", "cfg.toml", "--database", "run.db", "--verbose"]);
        assert_eq!(cli.global.config, Some(PathBuf::from("cfg.toml")));
        assert_eq!(cli.global.database, Some(PathBuf::from("run.db")));
        assert!(cli.global.verbose);
    }
}
