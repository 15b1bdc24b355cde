//! Declarative commands
//!
//! - `status` - Show every managed setting against the manifest
//! - `diff` - Preview what apply would change
//! - `apply` - Make the current settings match the manifest

use anyhow::{Result, bail};
use declarative::{Prefetch, compute_diffs};
use lwconfig::SettingsStore;
use std::sync::Arc;

use crate::Context;
use crate::engine::differ::{collect_status, display_diff, display_status};
use crate::engine::{self, ExecuteOptions, build_plan};
use crate::resource::StorePrefetch;
use crate::ui;

/// Load the shared snapshot up front so a failing dump is reported once
fn prefetch(store: &Arc<SettingsStore>) -> Result<()> {
    if let Some(warning) = StorePrefetch(Arc::clone(store)).prefetch()? {
        ui::warn(&warning);
    }
    Ok(())
}

pub fn status(ctx: &Context, target: Option<&str>) -> Result<()> {
    let config = ctx.load_config()?;
    let store = Arc::new(ctx.client(&config)?.store());
    prefetch(&store)?;

    let plan = build_plan(&config, &store, target);
    if !ctx.quiet {
        ui::header("Likewise Settings");
    }
    display_status(&collect_status(&plan.resources));
    Ok(())
}

pub fn diff(ctx: &Context, target: Option<&str>) -> Result<()> {
    let config = ctx.load_config()?;
    let store = Arc::new(ctx.client(&config)?.store());
    prefetch(&store)?;

    let plan = build_plan(&config, &store, target);
    display_diff(&compute_diffs(&plan.resources));
    Ok(())
}

pub fn apply(
    ctx: &Context,
    target: Option<&str>,
    dry_run: bool,
    yes: bool,
    jobs: usize,
) -> Result<()> {
    let config = ctx.load_config()?;
    let store = Arc::new(ctx.client(&config)?.store());

    let plan = build_plan(&config, &store, target);
    if plan.is_empty() {
        ui::info("No settings to apply");
        return Ok(());
    }

    let summary = engine::execute(
        plan,
        ExecuteOptions {
            dry_run,
            jobs,
            yes,
            verbose: ctx.verbose > 0,
        },
    )?;

    if !summary.is_success() {
        for (id, error) in &summary.failures {
            log::debug!("{id}: {error}");
        }
        bail!("{} of {} settings failed", summary.failed, summary.total());
    }
    Ok(())
}
