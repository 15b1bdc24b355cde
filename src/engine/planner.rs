//! Execution planner - turns the manifest into an execution plan

use crate::config::Config;
use crate::resource::{LikewiseSetting, StorePrefetch};
use declarative::ExecutionPlan;
use lwconfig::SettingsStore;
use std::sync::Arc;

/// Build a plan with one resource per desired setting
///
/// All resources share `store`, and the store's prefetch hook is
/// registered once, so the batch runs a single dump.
pub fn build_plan(config: &Config, store: &Arc<SettingsStore>, target: Option<&str>) -> ExecutionPlan {
    let mut plan = ExecutionPlan::new();
    plan.add_prefetch(Box::new(StorePrefetch(Arc::clone(store))));

    for setting in config.desired_settings() {
        plan.add_resource(Box::new(LikewiseSetting::new(setting, Arc::clone(store))));
    }

    let plan = plan.filter_by_target(target);
    log::debug!(
        "Planned {} settings (target: {})",
        plan.total_resources(),
        target.unwrap_or("all")
    );
    plan
}
