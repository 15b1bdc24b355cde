//! # Declarative
//!
//! A framework for idempotent, declarative configuration.
//!
//! Each resource names one value and the value it should hold. The
//! executor reads the current value, compares it with the desired one,
//! and writes only on a mismatch, so running a plan twice changes
//! nothing the second time.
//!
//! ## Core Concepts
//!
//! - **Resource**: One named value that can be read and written
//! - **Prefetch**: A hook that warms state shared by a batch of resources
//! - **ExecutionPlan**: The resources and prefetch hooks of one batch
//! - **reconcile**: The per-resource state machine
//!   (`Unsynced → Read → Synced | Failed`)
//! - **Executor**: Runs a plan, optionally in parallel, and summarizes it
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{ApplyContext, ExecuteOptions, ExecutionPlan, Resource, execute_simple};
//!
//! #[derive(Debug)]
//! struct FileContent { path: String, content: String }
//!
//! impl Resource for FileContent {
//!     fn id(&self) -> String { self.path.clone() }
//!     fn description(&self) -> String { format!("Write {}", self.path) }
//!     fn resource_type(&self) -> &'static str { "file" }
//!     fn desired_value(&self) -> &str { &self.content }
//!
//!     fn current_value(&self) -> anyhow::Result<Option<String>> {
//!         match std::fs::read_to_string(&self.path) {
//!             Ok(content) => Ok(Some(content)),
//!             Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
//!             Err(e) => Err(e.into()),
//!         }
//!     }
//!
//!     fn apply_desired(&self, _ctx: &ApplyContext) -> anyhow::Result<()> {
//!         std::fs::write(&self.path, &self.content)?;
//!         Ok(())
//!     }
//! }
//!
//! let mut plan = ExecutionPlan::new();
//! plan.add_resource(Box::new(FileContent {
//!     path: "/tmp/test.txt".into(),
//!     content: "hello".into(),
//! }));
//!
//! let summary = execute_simple(plan, ExecuteOptions::default())?;
//! ```
//!
//! ## Provider Traits
//!
//! - [`Prefetch`]: Prepares shared state once per batch
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks or settings sources.

pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod reconcile;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{
    ApplyContext, AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, Prefetch,
    ProgressCallback,
};
pub use diff::{DiffReport, DiffSummary, ResourceDiff, compute_diffs, group_by_type};
pub use executor::{execute, execute_simple};
pub use planner::ExecutionPlan;
pub use reconcile::{Reconciliation, reconcile};
pub use resource::{BoxedResource, Resource};
pub use types::{
    ApplyResult, ExecuteOptions, ExecuteSummary, ProviderState, ResourceState,
};
