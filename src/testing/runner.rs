//! Scenario executor
//!
//! Runs one playbook, captures its combined output and checks the exit
//! code and required output fragments. Assertion failures are collected
//! rather than returned as errors so one scenario never affects another.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command as TokioCommand};

use crate::common::config::RunnerConfig;

use super::config::ScenarioTest;
use super::report::CommandLine;
use super::status::Termination;

/// How the external tool is launched for every playbook in a suite
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Program name, resolved via PATH
    pub program: String,
    /// Variables added on top of the inherited environment
    pub env: BTreeMap<String, String>,
    /// Working directory; playbook paths are relative to it
    pub dir: PathBuf,
    /// Default timeout when a scenario does not set one
    pub timeout: Duration,
}

impl Invocation {
    pub fn from_config(runner: &RunnerConfig, dir: impl Into<PathBuf>) -> Self {
        Self {
            program: runner.program.clone(),
            env: runner.env.clone(),
            dir: dir.into(),
            timeout: runner.timeout(),
        }
    }

    /// Build the command for one playbook
    ///
    /// stdin is closed and the child is killed if its handle is dropped.
    /// Callers choose where stdout/stderr go.
    pub fn command(&self, script: &Path) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.program);
        cmd.arg(script)
            .current_dir(&self.dir)
            .envs(&self.env)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    /// The command line a human would type to reproduce a run
    pub fn command_line(&self, script: &Path) -> CommandLine {
        CommandLine {
            dir: self.dir.clone(),
            program: self.program.clone(),
            args: vec![script.display().to_string()],
        }
    }
}

/// How a scenario's process run ended, before any assertion is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The process ran and terminated
    Terminated(Termination),
    /// The process could not be started or waited on
    LaunchFailed(String),
    /// The process was killed after exceeding its timeout
    TimedOut(Duration),
}

/// A single failed check
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    #[error("got exit code {got}, want {want}")]
    ExitCodeMismatch { got: i32, want: i32 },

    #[error("unexpected error: {0}")]
    Execution(String),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("missing in output: {0:?}")]
    MissingOutput(Vec<String>),
}

/// Result of running one scenario
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub name: String,
    pub command_line: CommandLine,
    pub failures: Vec<Failure>,
    /// Combined stdout and stderr
    pub output: Vec<u8>,
    pub elapsed: Duration,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run one scenario to completion and evaluate it
pub async fn run_scenario(invocation: &Invocation, test: &ScenarioTest) -> ScenarioOutcome {
    let started = Instant::now();
    let command_line = invocation.command_line(&test.path);
    let timeout = test.timeout.unwrap_or(invocation.timeout);

    tracing::debug!(scenario = %test.name, command = %command_line, "Running scenario");

    let mut output = Vec::new();
    let completion = execute(invocation, &test.path, timeout, &mut output).await;

    tracing::debug!(scenario = %test.name, ?completion, bytes = output.len(), "Scenario finished");

    let failures = evaluate(test, &completion, &output);

    ScenarioOutcome {
        name: test.name.clone(),
        command_line,
        failures,
        output,
        elapsed: started.elapsed(),
    }
}

/// Spawn the playbook and drain its output into `output`
///
/// On timeout the bytes read so far are kept for the report.
async fn execute(
    invocation: &Invocation,
    script: &Path,
    timeout: Duration,
    output: &mut Vec<u8>,
) -> Completion {
    let mut child = match invocation
        .command(script)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            return Completion::LaunchFailed(format!(
                "failed to run '{}': {}",
                invocation.program, e
            ))
        }
    };

    match tokio::time::timeout(timeout, capture_combined(&mut child, output)).await {
        Ok(Ok(status)) => Completion::Terminated(status),
        Ok(Err(e)) => Completion::LaunchFailed(format!("failed to wait on process: {}", e)),
        Err(_) => {
            if let Err(e) = child.kill().await {
                tracing::warn!("Failed to kill timed out process: {}", e);
            }
            Completion::TimedOut(timeout)
        }
    }
}

/// Read stdout and stderr into one buffer in arrival order, then reap the child
async fn capture_combined(child: &mut Child, output: &mut Vec<u8>) -> io::Result<Termination> {
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "stdout not captured"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "stderr not captured"))?;

    let mut out_buf = [0u8; 8192];
    let mut err_buf = [0u8; 8192];
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            read = stdout.read(&mut out_buf), if out_open => match read? {
                0 => out_open = false,
                n => output.extend_from_slice(&out_buf[..n]),
            },
            read = stderr.read(&mut err_buf), if err_open => match read? {
                0 => err_open = false,
                n => output.extend_from_slice(&err_buf[..n]),
            },
        }
    }

    let status = child.wait().await?;
    Ok(Termination::from(status))
}

/// Apply the exit code and output checks
///
/// Launch errors, signals and timeouts end evaluation early since there
/// is no meaningful exit code or complete output to check.
pub fn evaluate(test: &ScenarioTest, completion: &Completion, output: &[u8]) -> Vec<Failure> {
    let mut failures = Vec::new();

    match completion {
        Completion::LaunchFailed(reason) => {
            failures.push(Failure::Execution(reason.clone()));
            return failures;
        }
        Completion::TimedOut(after) => {
            failures.push(Failure::TimedOut(*after));
            return failures;
        }
        Completion::Terminated(Termination::Exited(got)) => {
            if *got != test.exit_code {
                failures.push(Failure::ExitCodeMismatch {
                    got: *got,
                    want: test.exit_code,
                });
            }
        }
        Completion::Terminated(other) => {
            failures.push(Failure::Execution(other.to_string()));
            return failures;
        }
    }

    let missing = missing_fragments(output, &test.output);
    if !missing.is_empty() {
        failures.push(Failure::MissingOutput(missing));
    }

    failures
}

/// Every fragment that does not occur in `output`, in order
pub fn missing_fragments(output: &[u8], fragments: &[String]) -> Vec<String> {
    fragments
        .iter()
        .filter(|fragment| !contains(output, fragment.as_bytes()))
        .cloned()
        .collect()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "Cannot install all of the necessary packages";

    fn install_missing_required() -> ScenarioTest {
        ScenarioTest::new("install-missing-required", "test-install-missing-required.yml")
            .exit_code(1)
            .expect_output(PHRASE)
    }

    fn exited(code: i32) -> Completion {
        Completion::Terminated(Termination::Exited(code))
    }

    #[test]
    fn test_expected_failure_with_phrase_passes() {
        let output = format!("TASK [check]\nfatal: {}\n", PHRASE);
        assert!(evaluate(&install_missing_required(), &exited(1), output.as_bytes()).is_empty());
    }

    #[test]
    fn test_success_when_failure_expected_is_mismatch() {
        let failures = evaluate(&install_missing_required(), &exited(0), PHRASE.as_bytes());
        assert_eq!(failures, vec![Failure::ExitCodeMismatch { got: 0, want: 1 }]);
    }

    #[test]
    fn test_failure_when_success_expected_is_mismatch() {
        let test = ScenarioTest::new("ping", "test_ping.yml");
        let failures = evaluate(&test, &exited(2), b"");
        assert_eq!(failures, vec![Failure::ExitCodeMismatch { got: 2, want: 0 }]);
    }

    #[test]
    fn test_different_nonzero_code_is_mismatch() {
        let failures = evaluate(&install_missing_required(), &exited(2), PHRASE.as_bytes());
        assert_eq!(failures, vec![Failure::ExitCodeMismatch { got: 2, want: 1 }]);
    }

    #[test]
    fn test_missing_phrase_is_reported() {
        let failures = evaluate(&install_missing_required(), &exited(1), b"PLAY RECAP\n");
        assert_eq!(failures, vec![Failure::MissingOutput(vec![PHRASE.to_string()])]);
    }

    #[test]
    fn test_all_missing_fragments_collected() {
        let test = ScenarioTest::new("repo", "test-yum-repo-unreachable.yml")
            .exit_code(1)
            .expect_output("repo cannot reach its url")
            .expect_output("present")
            .expect_output("Error getting data from at least one yum repository");
        let failures = evaluate(&test, &exited(1), b"something present here");
        assert_eq!(
            failures,
            vec![Failure::MissingOutput(vec![
                "repo cannot reach its url".to_string(),
                "Error getting data from at least one yum repository".to_string(),
            ])]
        );
    }

    #[test]
    fn test_mismatch_and_missing_reported_together() {
        let failures = evaluate(&install_missing_required(), &exited(0), b"ok=3 failed=0");
        assert_eq!(failures.len(), 2);
        assert!(matches!(failures[0], Failure::ExitCodeMismatch { got: 0, want: 1 }));
        assert!(matches!(failures[1], Failure::MissingOutput(_)));
    }

    #[test]
    fn test_no_fragments_always_passes_containment() {
        assert!(missing_fragments(b"", &[]).is_empty());
        let test = ScenarioTest::new("ping", "test_ping.yml");
        assert!(evaluate(&test, &exited(0), b"").is_empty());
    }

    #[test]
    fn test_launch_failure_is_execution_error() {
        let completion = Completion::LaunchFailed("failed to run 'ansible-playbook': not found".into());
        let failures = evaluate(&install_missing_required(), &completion, b"");
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], Failure::Execution(_)));
    }

    #[test]
    fn test_signal_is_execution_error_not_mismatch() {
        let completion = Completion::Terminated(Termination::Signaled(9));
        let failures = evaluate(&install_missing_required(), &completion, PHRASE.as_bytes());
        assert_eq!(
            failures,
            vec![Failure::Execution("terminated by signal 9".to_string())]
        );
    }

    #[test]
    fn test_timeout_reported() {
        let completion = Completion::TimedOut(Duration::from_secs(5));
        let failures = evaluate(&install_missing_required(), &completion, b"");
        assert_eq!(failures, vec![Failure::TimedOut(Duration::from_secs(5))]);
        assert_eq!(failures[0].to_string(), "timed out after 5s");
        assert_eq!(
            Failure::TimedOut(Duration::from_millis(900)).to_string(),
            "timed out after 900ms"
        );
    }

    #[test]
    fn test_contains_bytes() {
        assert!(contains(b"abc", b""));
        assert!(contains(b"\x1b[0;31mfailed=2\x1b[0m", b"failed=2"));
        assert!(!contains(b"fail", b"failed"));
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            Failure::ExitCodeMismatch { got: 0, want: 1 }.to_string(),
            "got exit code 0, want 1"
        );
        assert_eq!(
            Failure::MissingOutput(vec!["a".into(), "b".into()]).to_string(),
            r#"missing in output: ["a", "b"]"#
        );
    }
}
