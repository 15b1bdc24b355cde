//! Execution engine for lwsync
//!
//! The engine orchestrates:
//! 1. Planning - Build one resource per desired setting, sharing one store
//! 2. Diffing - Compare the snapshot with the manifest
//! 3. Executing - Reconcile with confirmation and progress output

pub mod differ;
pub mod executor;
pub mod planner;

pub use executor::{ExecuteOptions, execute};
pub use planner::build_plan;
