//! Backend abstraction for lwconfig operations.
//!
//! The [`Backend`] trait is the process boundary: one bulk dump and one
//! single-key write. [`cli::CliBackend`] runs the real program;
//! [`MockBackend`] keeps everything in memory for tests.
//!
//! # Testing
//!
//! ```
//! use lwconfig::backend::{Backend, MockBackend};
//!
//! let mock = MockBackend::with_output("AssumeDefaultDomain true\n");
//! assert_eq!(mock.dump().unwrap(), "AssumeDefaultDomain true\n");
//! mock.set("AssumeDefaultDomain", "false").unwrap();
//! assert_eq!(mock.set_calls().len(), 1);
//! ```

pub mod cli;

use crate::error::{Error, Result};
use crate::types::{CommandConfig, command_line};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Backend trait for lwconfig operations.
pub trait Backend: Send + Sync {
    /// Program name, for messages.
    fn program(&self) -> &str;

    /// Command line of the dump, for diagnostics.
    fn dump_command(&self) -> String;

    /// Check if the program can be run.
    fn is_available(&self) -> bool;

    /// Print every setting (`lwconfig --dump`) and return stdout.
    fn dump(&self) -> Result<String>;

    /// Write one setting (`lwconfig <name> <value>`).
    fn set(&self, name: &str, value: &str) -> Result<()>;
}

/// Get the default backend (real lwconfig CLI with default options).
pub fn default_backend() -> cli::CliBackend {
    cli::CliBackend::new(CommandConfig::default())
}

/// Mock backend for testing without lwconfig installed.
///
/// Clones share state, so a test can hand one clone to the code under
/// test and inspect calls through another.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    output: Arc<Mutex<String>>,
    dump_error: Arc<Mutex<Option<String>>>,
    failing_keys: Arc<Mutex<HashSet<String>>>,
    missing: Arc<AtomicBool>,
    dumps: Arc<AtomicUsize>,
    sets: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockBackend {
    /// Create a mock whose dump prints nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose dump prints `output`.
    #[must_use]
    pub fn with_output(output: &str) -> Self {
        let mock = Self::new();
        mock.set_output(output);
        mock
    }

    /// Replace the dump output.
    pub fn set_output(&self, output: &str) {
        *lock(&self.output) = output.to_string();
    }

    /// Make every dump fail with a non-zero exit carrying `stderr`.
    pub fn fail_dump(&self, stderr: &str) {
        *lock(&self.dump_error) = Some(stderr.to_string());
    }

    /// Let dumps succeed again.
    pub fn clear_dump_failure(&self) {
        *lock(&self.dump_error) = None;
    }

    /// Report the program as not installed.
    pub fn set_missing(&self) {
        self.missing.store(true, Ordering::SeqCst);
    }

    /// Make writes to `name` fail.
    pub fn fail_set(&self, name: &str) {
        lock(&self.failing_keys).insert(name.to_string());
    }

    /// Number of dumps performed.
    pub fn dump_calls(&self) -> usize {
        self.dumps.load(Ordering::SeqCst)
    }

    /// Writes attempted so far, in order, including failed ones.
    pub fn set_calls(&self) -> Vec<(String, String)> {
        lock(&self.sets).clone()
    }
}

impl Backend for MockBackend {
    fn program(&self) -> &str {
        "lwconfig"
    }

    fn dump_command(&self) -> String {
        CommandConfig::default().dump_command()
    }

    fn is_available(&self) -> bool {
        !self.missing.load(Ordering::SeqCst)
    }

    fn dump(&self) -> Result<String> {
        self.dumps.fetch_add(1, Ordering::SeqCst);
        if let Some(stderr) = lock(&self.dump_error).clone() {
            return Err(Error::CommandFailed {
                command: self.dump_command(),
                status: "exit code 1".to_string(),
                stderr,
            });
        }
        Ok(lock(&self.output).clone())
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        lock(&self.sets).push((name.to_string(), value.to_string()));
        if lock(&self.failing_keys).contains(name) {
            return Err(Error::CommandFailed {
                command: command_line(self.program(), [name, value]),
                status: "exit code 1".to_string(),
                stderr: format!("failed to set {name}"),
            });
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
