//! Playbook test harness
//!
//! Runs playbooks as subprocesses and checks their exit code and combined
//! output. A suite's prebuild playbooks act as a barrier: all of them must
//! succeed before any scenario starts, after which scenarios run
//! concurrently and fail independently.

mod config;
mod prebuild;
mod report;
mod runner;
mod status;
mod suite;

pub use config::*;
pub use prebuild::prebuild;
pub use report::{reproduction, tail, CommandLine, MAX_TAIL_LINES};
pub use runner::{
    evaluate, missing_fragments, run_scenario, Completion, Failure, Invocation, ScenarioOutcome,
};
pub use status::Termination;
pub use suite::{run_suite, SuiteReport};
