//! Apply context and provider traits
//!
//! These traits allow the declarative crate to be used without
//! depending on specific implementations of caches, progress, etc.

use crate::diff::DiffReport;
use crate::types::ApplyResult;
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};

/// Hook run once per batch before any resource is read
///
/// Implement this to build and warm state shared by many resources,
/// such as a cache filled by one bulk query.
pub trait Prefetch: Send + Sync {
    /// Prepare shared state for the batch
    ///
    /// `Ok(Some(warning))` lets the batch continue while recording a
    /// problem; `Err` aborts the whole batch.
    fn prefetch(&self) -> Result<Option<String>>;
}

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback: Send {
    /// Called once the diffs are known, before confirmation
    fn on_diff(&mut self, _report: &DiffReport) {}

    /// Called when starting to reconcile a batch of resources
    fn on_batch_start(&mut self, count: usize);

    /// Called when a resource reconciliation completes
    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult);

    /// Called when the batch completes
    fn on_batch_complete(&mut self);
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback: Send {
    /// Ask the user to confirm an action
    ///
    /// Returns `true` if the user confirmed.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize) {}
    fn on_resource_complete(&mut self, _id: &str, _result: &ApplyResult) {}
    fn on_batch_complete(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Context passed to resource apply operations
#[derive(Clone, Copy, Default)]
pub struct ApplyContext<'a> {
    /// Whether this is a dry run (no actual changes)
    pub dry_run: bool,
    /// Whether to output verbose information
    pub verbose: bool,
    /// Batch cancellation flag
    pub cancel: Option<&'a AtomicBool>,
}

impl<'a> ApplyContext<'a> {
    /// Create a new apply context
    pub fn new(dry_run: bool, verbose: bool) -> Self {
        Self {
            dry_run,
            verbose,
            cancel: None,
        }
    }

    /// Attach a cancellation flag
    pub fn with_cancel(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Whether the batch has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}
