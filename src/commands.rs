//! CLI command definitions
//!
//! Defines the clap commands for the playbook-test CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run one or more suite files
    Run {
        /// Paths to YAML suite files, run one after another
        #[arg(required = true)]
        suites: Vec<PathBuf>,

        /// Only run scenarios whose name contains this string
        #[arg(long, short)]
        filter: Option<String>,

        /// Program to invoke instead of the configured one
        #[arg(long)]
        program: Option<String>,

        /// Default per-scenario timeout in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,

        /// Maximum number of scenarios running at once
        #[arg(long, short)]
        jobs: Option<usize>,

        /// Use this config file instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the prebuild playbooks and scenarios of suite files
    List {
        /// Paths to YAML suite files
        #[arg(required = true)]
        suites: Vec<PathBuf>,
    },
}
