//! Playbook harness - parallel integration tests for configuration playbooks
//!
//! This library runs an external configuration-management tool against
//! scenario playbooks and checks exit codes and output, with a prebuild
//! barrier that must pass before any scenario runs.

pub mod cli;
pub mod commands;
pub mod common;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use testing::{Failure, ScenarioTest, Suite};
