//! Error types for lwconfig operations.
//!
//! Only process-level failures are errors here. A dump that runs fine but
//! prints malformed text is reported as a [`crate::parser::Diagnostic`]
//! instead, so callers can still use the settings that did parse.

use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Categories of lwconfig errors for user feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The lwconfig binary could not be found or spawned
    NotFound,
    /// The command ran but was refused (usually needs root)
    Permission,
    /// The command did not finish in time
    Timeout,
    /// The command exited with a failure status
    Failed,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "lwconfig not available",
            Self::Permission => "Permission denied",
            Self::Timeout => "Command timed out",
            Self::Failed => "Command failed",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::NotFound => "Install Likewise Open / PBIS or pass --lwconfig <path>",
            Self::Permission => "Run as root; lwconfig only writes settings for privileged users",
            Self::Timeout => "Check that lwsmd is running, or raise --timeout",
            Self::Failed => "Check the setting name and value against `lwconfig --list`",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur while talking to lwconfig.
#[derive(Debug, Error)]
pub enum Error {
    /// The program could not be spawned because it does not exist
    #[error("lwconfig not found: {program}")]
    NotFound {
        /// Program that was looked up
        program: String,
    },

    /// The program exited with a non-zero status
    #[error("command failed: {command} ({status}): {stderr}")]
    CommandFailed {
        /// Reconstructed command line
        command: String,
        /// Exit status description
        status: String,
        /// Trimmed standard error output
        stderr: String,
    },

    /// The program was killed after exceeding its timeout
    #[error("command timed out after {timeout:?}: {command}")]
    Timeout {
        /// Reconstructed command line
        command: String,
        /// Timeout that expired
        timeout: Duration,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Timeout { .. } => ErrorCategory::Timeout,
            Error::CommandFailed { stderr, .. } if is_permission_error(stderr) => {
                ErrorCategory::Permission
            }
            Error::CommandFailed { .. } => ErrorCategory::Failed,
            _ => ErrorCategory::Other,
        }
    }

    /// Whether the error came from running (or failing to run) a command.
    pub fn is_execution(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. } | Error::CommandFailed { .. } | Error::Timeout { .. }
        )
    }

    /// Create an error from a finished command that did not succeed.
    pub fn from_output(command: &str, status: ExitStatus, stderr: &str) -> Self {
        let status = match status.code() {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        };
        Error::CommandFailed {
            command: command.to_string(),
            status,
            stderr: stderr.trim().to_string(),
        }
    }
}

fn is_permission_error(stderr: &str) -> bool {
    let stderr = stderr.to_lowercase();
    stderr.contains("permission denied")
        || stderr.contains("access denied")
        || stderr.contains("access_denied")
        || stderr.contains("must be root")
}

/// Result type for lwconfig operations.
pub type Result<T> = std::result::Result<T, Error>;
