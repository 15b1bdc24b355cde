//! Core types for declarative resource management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Current state of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceState {
    /// Resource is set, with its current value
    Present { value: String },
    /// Resource is not set at all
    Absent,
}

impl ResourceState {
    /// Build a state from an optional current value
    pub fn from_value(value: Option<String>) -> Self {
        match value {
            Some(value) => Self::Present { value },
            None => Self::Absent,
        }
    }

    /// The current value, if present
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Present { value } => Some(value),
            Self::Absent => None,
        }
    }

    /// Check if state represents presence
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }

    /// Check if state represents absence
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Whether this state already holds `desired`
    pub fn matches(&self, desired: &str) -> bool {
        self.value() == Some(desired)
    }
}

/// Where a single resource is in its reconciliation
///
/// `Unsynced → Read → Synced | Failed`. A resource whose current value
/// already matches goes straight from `Read` to `Synced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderState {
    /// Nothing read yet
    Unsynced,
    /// Current value read, not yet compared or written
    Read,
    /// Current value matches desired (possibly after a write)
    Synced,
    /// Reading or writing failed
    Failed,
}

impl ProviderState {
    /// Whether the state is final for this batch
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Synced | Self::Failed)
    }
}

impl fmt::Display for ProviderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unsynced => "unsynced",
            Self::Read => "read",
            Self::Synced => "synced",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of reconciling a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// Already matched, nothing written
    NoChange,
    /// Was absent, desired value written
    Created,
    /// Held a different value, desired value written
    Modified,
    /// Read or write failed
    Failed { error: String },
    /// Not written (dry run or cancelled)
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Created | Self::Modified)
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub modified: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
    /// `(resource id, error)` for every failed resource
    pub failures: Vec<(String, String)>,
    /// Non-fatal problems reported during prefetch
    pub warnings: Vec<String>,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.modified
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of resources processed
    pub fn total(&self) -> usize {
        self.created + self.modified + self.skipped + self.failed + self.no_change
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, id: &str, result: &ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created => self.created += 1,
            ApplyResult::Modified => self.modified += 1,
            ApplyResult::Failed { error } => {
                self.failed += 1;
                self.failures.push((id.to_string(), error.clone()));
            }
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Number of parallel jobs; 1 reconciles resources one after another
    pub jobs: usize,
    /// Verbose output
    pub verbose: bool,
    /// Once set, no further writes are issued
    pub cancel: Option<Arc<AtomicBool>>,
}

impl ExecuteOptions {
    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 1,
            verbose: false,
            cancel: None,
        }
    }
}
