//! CLI command handling
//!
//! Loads configuration and suites, then runs or lists them.

use std::path::PathBuf;

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::testing::{run_suite, Suite};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, verbose: bool) -> Result<()> {
    match command {
        Commands::Run {
            suites,
            filter,
            program,
            timeout,
            jobs,
            config,
        } => {
            let mut config = match config {
                Some(path) => Config::load_from(&path)?,
                None => Config::load()?,
            };
            if let Some(program) = program {
                config.runner.program = program;
            }
            if let Some(timeout) = timeout {
                config.runner.timeout_secs = timeout;
            }
            if let Some(jobs) = jobs {
                config.runner.jobs = jobs;
            }
            config.runner.validate()?;

            if let Some(path) = config.resolve_program() {
                tracing::debug!(program = %path.display(), "Resolved program");
            }

            // Load everything up front so a typo in the last suite is
            // reported before the first one starts running.
            let suites = load_suites(&suites)?;

            let mut total = 0;
            let mut failed = 0;
            for suite in &suites {
                let report = match run_suite(&config.runner, suite, filter.as_deref(), verbose).await
                {
                    Ok(report) => report,
                    Err(e) => {
                        if total > 0 {
                            println!(
                                "{} passed, {} failed in earlier suites",
                                total - failed,
                                failed
                            );
                        }
                        return Err(e);
                    }
                };
                total += report.outcomes.len();
                failed += report.failed();
            }

            if failed > 0 {
                return Err(Error::ScenariosFailed { failed, total });
            }
            if total == 0 {
                println!("No scenarios matched");
            }
            Ok(())
        }

        Commands::List { suites } => {
            for suite in load_suites(&suites)? {
                println!("{} {}", suite.name.white().bold(), suite.dir.display().to_string().dimmed());
                if let Some(desc) = &suite.description {
                    println!("  {}", desc.dimmed());
                }
                for script in &suite.prebuild {
                    println!("  {} {}", "prebuild".cyan(), script.display());
                }
                for scenario in &suite.scenarios {
                    println!(
                        "  {} {} -> exit {}",
                        scenario.name,
                        scenario.path.display().to_string().dimmed(),
                        scenario.exit_code
                    );
                    for fragment in &scenario.output {
                        println!("      contains {:?}", fragment);
                    }
                }
            }
            Ok(())
        }
    }
}

fn load_suites(paths: &[PathBuf]) -> Result<Vec<Suite>> {
    paths.iter().map(|path| Suite::load(path)).collect()
}
