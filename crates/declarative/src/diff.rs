//! Diff computation for resources

use crate::resource::Resource;
use crate::types::ResourceState;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A diff between current and desired value of a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Unique identifier of the resource
    pub resource_id: String,
    /// Type of the resource
    pub resource_type: String,
    /// Human-readable description
    pub description: String,
    /// Current state
    pub current: ResourceState,
    /// Desired value
    pub desired: String,
}

impl ResourceDiff {
    /// Create a diff from a resource, returning None if no changes needed
    pub fn from_resource(resource: &dyn Resource) -> Result<Option<Self>> {
        let current = resource.current_state()?;
        let desired = resource.desired_value();

        if current.matches(desired) {
            return Ok(None);
        }

        Ok(Some(Self {
            resource_id: resource.id(),
            resource_type: resource.resource_type().to_string(),
            description: resource.description(),
            current,
            desired: desired.to_string(),
        }))
    }

    /// Check if this diff sets a value that is currently absent
    pub fn is_addition(&self) -> bool {
        self.current.is_absent()
    }

    /// Check if this diff replaces an existing value
    pub fn is_modification(&self) -> bool {
        self.current.is_present()
    }
}

/// Diffs for a set of resources, plus the resources that could not be read
#[derive(Debug, Clone, Default)]
pub struct DiffReport {
    /// Resources whose current value differs from the desired one
    pub diffs: Vec<ResourceDiff>,
    /// `(resource id, error)` for resources whose current value could not be read
    pub errors: Vec<(String, String)>,
}

impl DiffReport {
    /// Whether every resource was read and none needs a change
    pub fn is_clean(&self) -> bool {
        self.diffs.is_empty() && self.errors.is_empty()
    }
}

/// Compute diffs for a list of resources
///
/// Resources already at their desired value are left out. Read failures
/// are collected in [`DiffReport::errors`] rather than dropped.
pub fn compute_diffs(resources: &[Box<dyn Resource>]) -> DiffReport {
    let mut report = DiffReport::default();
    for resource in resources {
        match ResourceDiff::from_resource(resource.as_ref()) {
            Ok(Some(diff)) => report.diffs.push(diff),
            Ok(None) => {}
            Err(e) => report.errors.push((resource.id(), format!("{e:#}"))),
        }
    }
    report
}

/// Diff summary statistics
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Number of values to set that are currently absent
    pub additions: usize,
    /// Number of values to replace
    pub modifications: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            if diff.is_addition() {
                summary.additions += 1;
            } else {
                summary.modifications += 1;
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.modifications
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group diffs by resource type
pub fn group_by_type(diffs: &[ResourceDiff]) -> BTreeMap<&str, Vec<&ResourceDiff>> {
    let mut groups: BTreeMap<&str, Vec<&ResourceDiff>> = BTreeMap::new();
    for diff in diffs {
        groups
            .entry(diff.resource_type.as_str())
            .or_default()
            .push(diff);
    }
    groups
}
