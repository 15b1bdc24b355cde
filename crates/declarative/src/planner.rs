//! Execution planner - builds resource execution plans

use crate::context::Prefetch;
use crate::resource::{BoxedResource, Resource};

/// An execution plan: the resources of one batch and the prefetch hooks
/// that prepare their shared state
#[derive(Default)]
pub struct ExecutionPlan {
    /// Resources to reconcile, in order
    pub resources: Vec<BoxedResource>,
    /// Hooks run once before any resource is read
    pub prefetchers: Vec<Box<dyn Prefetch>>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource to the plan
    pub fn add_resource(&mut self, resource: BoxedResource) {
        self.resources.push(resource);
    }

    /// Register a prefetch hook
    pub fn add_prefetch(&mut self, prefetch: Box<dyn Prefetch>) {
        self.prefetchers.push(prefetch);
    }

    /// Filter plan to only include resources matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn Resource) -> bool,
    {
        Self {
            resources: self
                .resources
                .into_iter()
                .filter(|r| predicate(r.as_ref()))
                .collect(),
            prefetchers: self.prefetchers,
        }
    }

    /// Filter plan to only include resources matching a target pattern
    ///
    /// Target format: "name" (substring of the id, or an exact type) or
    /// "type.name". A target containing a dot also matches ids that
    /// contain it verbatim, so dotted names stay selectable.
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (resource_type, name) = parse_target(t);
                self.filter(|r| {
                    r.id().contains(t) || matches_filter(r, resource_type.as_deref(), &name)
                })
            }
        }
    }

    /// Total number of resources in the plan
    pub fn total_resources(&self) -> usize {
        self.resources.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Parse a target string like "type.name" into (type, name)
fn parse_target(target: &str) -> (Option<String>, String) {
    match target.split_once('.') {
        Some((resource_type, name)) if !resource_type.is_empty() => {
            (Some(resource_type.to_string()), name.to_string())
        }
        _ => (None, target.to_string()),
    }
}

/// Check if a resource matches the filter criteria
fn matches_filter(resource: &dyn Resource, resource_type: Option<&str>, name: &str) -> bool {
    match resource_type {
        Some(rt) => resource.resource_type() == rt && resource.id().contains(name),
        None => resource.resource_type() == name || resource.id().contains(name),
    }
}
