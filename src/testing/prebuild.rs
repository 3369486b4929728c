//! Prebuild barrier
//!
//! Setup playbooks run concurrently before any scenario. Every one of them
//! must succeed; the first failure aborts the barrier and kills the
//! playbooks still running. There is no retry and no partial success.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use colored::Colorize;
use futures_util::stream::{FuturesUnordered, StreamExt};

use crate::common::{Error, Result};

use super::runner::Invocation;
use super::status::Termination;

/// Run all prebuild playbooks, stopping at the first failure
///
/// Output is passed straight through to the terminal. Playbooks still
/// running when one fails are dropped, which kills their processes.
pub async fn prebuild(invocation: &Invocation, scripts: &[PathBuf]) -> Result<()> {
    if scripts.is_empty() {
        return Ok(());
    }

    tracing::info!(count = scripts.len(), "Running prebuild playbooks");
    println!("\n{}", "Prebuild:".cyan());

    let mut pending: FuturesUnordered<_> = scripts
        .iter()
        .map(|script| async move { (script, run_one(invocation, script).await) })
        .collect();

    while let Some((script, result)) = pending.next().await {
        let script = script.display().to_string();
        match result {
            Ok(()) => println!("  {} {}", "✓".green(), script.dimmed()),
            Err(reason) => {
                tracing::error!(
                    script = %script,
                    remaining = pending.len(),
                    "Prebuild playbook failed: {}",
                    reason
                );
                println!("  {} {}", "✗".red(), script);
                return Err(Error::prebuild_failed(&script, reason));
            }
        }
    }

    Ok(())
}

async fn run_one(invocation: &Invocation, script: &Path) -> std::result::Result<(), String> {
    tracing::debug!(script = %script.display(), "Starting prebuild playbook");

    let mut child = invocation
        .command(script)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| format!("failed to run '{}': {}", invocation.program, e))?;

    match tokio::time::timeout(invocation.timeout, child.wait()).await {
        Ok(Ok(status)) if status.success() => Ok(()),
        Ok(Ok(status)) => Err(Termination::from(status).to_string()),
        Ok(Err(e)) => Err(format!("failed to wait on process: {}", e)),
        Err(_) => {
            if let Err(e) = child.kill().await {
                tracing::warn!("Failed to kill timed out prebuild: {}", e);
            }
            Err(format!("timed out after {:?}", invocation.timeout))
        }
    }
}
