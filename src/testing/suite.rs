//! Suite runner
//!
//! Prebuild barrier first, then every selected scenario as its own task,
//! with at most `jobs` scenarios running at once.

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::common::config::RunnerConfig;
use crate::common::Result;

use super::config::Suite;
use super::prebuild::prebuild;
use super::report::print_outcome;
use super::runner::{run_scenario, Failure, Invocation, ScenarioOutcome};

/// Outcomes of one suite, in completion order
#[derive(Debug)]
pub struct SuiteReport {
    pub name: String,
    pub outcomes: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn success(&self) -> bool {
        self.failed() == 0
    }
}

/// Run a suite: prebuild barrier, then all selected scenarios concurrently
///
/// Returns an error only when the prebuild barrier fails, in which case no
/// scenario has been started.
pub async fn run_suite(
    runner: &RunnerConfig,
    suite: &Suite,
    filter: Option<&str>,
    verbose: bool,
) -> Result<SuiteReport> {
    println!(
        "\n{} {}",
        "Running Suite:".blue().bold(),
        suite.name.white().bold()
    );
    if let Some(desc) = &suite.description {
        println!("  {}", desc.dimmed());
    }

    let selected = suite.select(filter);
    if selected.is_empty() {
        tracing::info!(suite = %suite.name, "No scenarios selected, skipping suite");
        return Ok(SuiteReport {
            name: suite.name.clone(),
            outcomes: Vec::new(),
        });
    }

    let invocation = Arc::new(Invocation::from_config(runner, &suite.dir));

    prebuild(&invocation, &suite.prebuild).await?;

    println!("\n{}", "Scenarios:".cyan());

    let jobs = Arc::new(Semaphore::new(runner.jobs.max(1)));
    tracing::debug!(scenarios = selected.len(), jobs = runner.jobs, "Starting scenarios");

    let mut pending: FuturesUnordered<_> = selected
        .into_iter()
        .map(|test| {
            let invocation = Arc::clone(&invocation);
            let jobs = Arc::clone(&jobs);
            let name = test.name.clone();
            let command_line = invocation.command_line(&test.path);
            let handle = tokio::spawn(async move {
                // The semaphore is never closed, so acquiring cannot fail
                let _permit = jobs.acquire_owned().await.ok();
                run_scenario(&invocation, &test).await
            });
            async move { (name, command_line, handle.await) }
        })
        .collect();

    let mut outcomes = Vec::new();
    while let Some((name, command_line, joined)) = pending.next().await {
        let outcome = joined.unwrap_or_else(|e| {
            tracing::error!(scenario = %name, "Scenario task failed: {}", e);
            ScenarioOutcome {
                name,
                command_line,
                failures: vec![Failure::Execution(format!("scenario task failed: {}", e))],
                output: Vec::new(),
                elapsed: Duration::ZERO,
            }
        });
        print_outcome(&outcome, verbose);
        outcomes.push(outcome);
    }

    let report = SuiteReport {
        name: suite.name.clone(),
        outcomes,
    };

    let summary = format!(
        "{} passed, {} failed",
        report.passed(),
        report.failed()
    );
    if report.success() {
        println!("\n{} {}\n", "✓".green().bold(), summary.green().bold());
    } else {
        println!("\n{} {}\n", "✗".red().bold(), summary.red().bold());
    }

    Ok(report)
}
