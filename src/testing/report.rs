//! Outcome reporting
//!
//! Failed scenarios are printed with a copy-pasteable command and the tail
//! of what the playbook wrote, so most failures can be diagnosed without
//! re-running anything.

use std::fmt;
use std::path::PathBuf;

use colored::Colorize;

use super::runner::ScenarioOutcome;

/// Number of trailing output lines shown for a failed scenario
pub const MAX_TAIL_LINES: usize = 10;

/// A reproducible command: working directory, program and arguments
///
/// Displayed with shell quoting so it can be pasted into a terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub dir: PathBuf,
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(cd {} && {}",
            shell_words::quote(&self.dir.to_string_lossy()),
            shell_words::quote(&self.program)
        )?;
        for arg in &self.args {
            write!(f, " {}", shell_words::quote(arg))?;
        }
        write!(f, ")")
    }
}

/// Last `max_lines` lines of `output`, prefixed by `...` when truncated
///
/// Trailing newlines are dropped first so a final `\n` does not count as
/// an empty line.
pub fn tail(output: &[u8], max_lines: usize) -> String {
    let end = output
        .iter()
        .rposition(|&b| b != b'\n')
        .map_or(0, |i| i + 1);
    let lines: Vec<&[u8]> = output[..end].split(|&b| b == b'\n').collect();

    let shown = if lines.len() > max_lines {
        let mut shown: Vec<&[u8]> = Vec::with_capacity(max_lines + 1);
        shown.push(b"...");
        shown.extend_from_slice(&lines[lines.len() - max_lines..]);
        shown
    } else {
        lines
    };

    String::from_utf8_lossy(&shown.join(&b'\n')).into_owned()
}

/// Reproduction block for a failed scenario
pub fn reproduction(command_line: &CommandLine, output: &[u8]) -> String {
    format!("$ {}\n{}", command_line, tail(output, MAX_TAIL_LINES))
}

/// Print a single outcome as it completes
pub fn print_outcome(outcome: &ScenarioOutcome, verbose: bool) {
    if outcome.passed() {
        println!(
            "  {} {} {}",
            "✓".green(),
            outcome.name,
            format!("({:.2}s)", outcome.elapsed.as_secs_f64()).dimmed()
        );
        if verbose {
            println!("    {}", format!("$ {}", outcome.command_line).dimmed());
        }
        return;
    }

    tracing::warn!(scenario = %outcome.name, failures = outcome.failures.len(), "Scenario failed");

    println!(
        "  {} {} {}",
        "✗".red(),
        outcome.name.red().bold(),
        format!("({:.2}s)", outcome.elapsed.as_secs_f64()).dimmed()
    );
    for failure in &outcome.failures {
        println!("      {}", failure);
    }
    for line in reproduction(&outcome.command_line, &outcome.output).lines() {
        println!("      {}", line);
    }
}
