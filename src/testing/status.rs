//! Exit status decoding
//!
//! The assertion logic only ever looks at [`Termination`]; how a raw
//! [`ExitStatus`] maps onto it is decided per platform.

use std::fmt;
use std::process::ExitStatus;

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Normal exit with a status code
    Exited(i32),
    /// Killed by a signal (Unix only)
    Signaled(i32),
    /// Ended in a way this platform cannot decode
    Abnormal,
}

impl Termination {
    /// The exit code, if the process exited normally
    pub fn code(self) -> Option<i32> {
        match self {
            Termination::Exited(code) => Some(code),
            _ => None,
        }
    }
}

impl From<ExitStatus> for Termination {
    fn from(status: ExitStatus) -> Self {
        decode(status)
    }
}

#[cfg(unix)]
fn decode(status: ExitStatus) -> Termination {
    use std::os::unix::process::ExitStatusExt;

    if let Some(code) = status.code() {
        Termination::Exited(code)
    } else if let Some(signal) = status.signal() {
        Termination::Signaled(signal)
    } else {
        Termination::Abnormal
    }
}

#[cfg(not(unix))]
fn decode(status: ExitStatus) -> Termination {
    status.code().map_or(Termination::Abnormal, Termination::Exited)
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "exit status: {}", code),
            Termination::Signaled(signal) => write!(f, "terminated by signal {}", signal),
            Termination::Abnormal => write!(f, "abnormal termination"),
        }
    }
}
