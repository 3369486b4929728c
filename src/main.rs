//! playbook-test - run playbook scenario suites
//!
//! Runs each suite's prebuild playbooks, then every scenario concurrently,
//! and exits non-zero if anything failed.

use clap::Parser;
use playbook_harness::{cli, commands, common::logging};
use commands::Commands;

#[derive(Parser)]
#[command(name = "playbook-test", about = "Parallel playbook integration-test runner")]
#[command(version, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.verbose);

    if let Err(e) = cli::dispatch(cli.command, cli.verbose).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
