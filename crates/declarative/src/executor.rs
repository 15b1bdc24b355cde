//! Execution engine - reconciles a batch of resources

use crate::context::{ApplyContext, ConfirmCallback, ProgressCallback};
use crate::diff::compute_diffs;
use crate::planner::ExecutionPlan;
use crate::reconcile::reconcile;
use crate::resource::Resource;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary};
use anyhow::{Context, Result};
use rayon::prelude::*;

/// Execute a plan with the given options and callbacks
///
/// # Type Parameters
/// * `P` - Progress callback type
/// * `C` - Confirm callback type
///
/// # Arguments
/// * `plan` - The execution plan to run
/// * `opts` - Execution options (dry_run, jobs, verbose, cancel)
/// * `progress` - Progress callback
/// * `confirm` - Confirmation callback, skipped for dry runs
///
/// # Returns
/// Summary of execution results. An empty plan runs no prefetch hook.
/// Only a failing prefetch hook or a failing confirmation prompt makes
/// this return `Err`; per-resource failures are recorded in the summary.
pub fn execute<P, C>(
    plan: ExecutionPlan,
    opts: ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteSummary>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let mut summary = ExecuteSummary::default();
    if plan.is_empty() {
        return Ok(summary);
    }

    for prefetcher in &plan.prefetchers {
        if let Some(warning) = prefetcher.prefetch().context("prefetch failed")? {
            log::warn!("{warning}");
            summary.warnings.push(warning);
        }
    }

    let report = compute_diffs(&plan.resources);
    log::debug!(
        "{} of {} resources differ, {} unreadable",
        report.diffs.len(),
        plan.total_resources(),
        report.errors.len()
    );
    progress.on_diff(&report);

    if !report.diffs.is_empty()
        && !opts.dry_run
        && !confirm.confirm("Apply changes?")?
    {
        summary.skipped += report.diffs.len();
        summary.no_change += plan.total_resources() - report.diffs.len() - report.errors.len();
        for (id, error) in report.errors {
            summary.add_result(&id, &ApplyResult::Failed { error });
        }
        return Ok(summary);
    }

    let ctx = ApplyContext::new(opts.dry_run, opts.verbose);
    let ctx = match opts.cancel.as_deref() {
        Some(flag) => ctx.with_cancel(flag),
        None => ctx,
    };

    progress.on_batch_start(plan.total_resources());
    for (id, result) in execute_batch(&plan.resources, opts.jobs, &ctx, progress)? {
        summary.add_result(&id, &result);
    }
    progress.on_batch_complete();

    Ok(summary)
}

/// Reconcile a batch of resources, keeping their order in the output
fn execute_batch<P: ProgressCallback>(
    resources: &[Box<dyn Resource>],
    jobs: usize,
    ctx: &ApplyContext,
    progress: &mut P,
) -> Result<Vec<(String, ApplyResult)>> {
    if jobs <= 1 || resources.len() == 1 {
        let mut results = Vec::with_capacity(resources.len());
        for resource in resources {
            let id = resource.id();
            let result = reconcile(resource.as_ref(), ctx).result;
            progress.on_resource_complete(&id, &result);
            results.push((id, result));
        }
        Ok(results)
    } else {
        execute_parallel(resources, jobs, ctx, progress)
    }
}

/// Reconcile resources in parallel using rayon
fn execute_parallel<P: ProgressCallback>(
    resources: &[Box<dyn Resource>],
    jobs: usize,
    ctx: &ApplyContext,
    progress: &mut P,
) -> Result<Vec<(String, ApplyResult)>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {}", e))?;

    // The progress callback is not thread-safe, so results are reported
    // once the pool is done.
    let results: Vec<(String, ApplyResult)> = pool.install(|| {
        resources
            .par_iter()
            .map(|resource| (resource.id(), reconcile(resource.as_ref(), ctx).result))
            .collect()
    });

    for (id, result) in &results {
        progress.on_resource_complete(id, result);
    }

    Ok(results)
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple(plan: ExecutionPlan, opts: ExecuteOptions) -> Result<ExecuteSummary> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(plan, opts, &mut NoProgress, &mut AutoConfirm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AutoConfirm, AutoDecline, NoProgress, Prefetch};
    use anyhow::bail;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Shared key/value table standing in for a settings source
    #[derive(Debug, Default)]
    struct Table {
        values: Mutex<Vec<(String, String)>>,
        writes: AtomicUsize,
        failing: Vec<String>,
    }

    impl Table {
        fn with(values: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                values: Mutex::new(
                    values
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
                ..Default::default()
            })
        }

        fn get(&self, name: &str) -> Option<String> {
            let values = self.values.lock().unwrap();
            values.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
        }
    }

    #[derive(Debug)]
    struct Entry {
        name: String,
        value: String,
        table: Arc<Table>,
    }

    fn entry(table: &Arc<Table>, name: &str, value: &str) -> Box<dyn Resource> {
        Box::new(Entry {
            name: name.to_string(),
            value: value.to_string(),
            table: Arc::clone(table),
        })
    }

    impl Resource for Entry {
        fn id(&self) -> String {
            self.name.clone()
        }

        fn description(&self) -> String {
            format!("Set {} = {}", self.name, self.value)
        }

        fn resource_type(&self) -> &'static str {
            "entry"
        }

        fn desired_value(&self) -> &str {
            &self.value
        }

        fn current_value(&self) -> Result<Option<String>> {
            Ok(self.table.get(&self.name))
        }

        fn apply_desired(&self, _ctx: &ApplyContext) -> Result<()> {
            self.table.writes.fetch_add(1, Ordering::SeqCst);
            if self.table.failing.contains(&self.name) {
                bail!("write rejected for {}", self.name);
            }
            Ok(())
        }
    }

    struct CountingPrefetch {
        calls: Arc<AtomicUsize>,
        outcome: fn() -> Result<Option<String>>,
    }

    impl Prefetch for CountingPrefetch {
        fn prefetch(&self) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn mixed_plan(table: &Arc<Table>) -> ExecutionPlan {
        let mut plan = ExecutionPlan::new();
        plan.add_resource(entry(table, "A", "1"));
        plan.add_resource(entry(table, "B", "changed"));
        plan.add_resource(entry(table, "C", "new"));
        plan
    }

    #[test]
    fn test_execute_empty_plan() {
        let summary = execute_simple(ExecutionPlan::new(), ExecuteOptions::default()).unwrap();
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn test_execute_no_changes() {
        let table = Table::with(&[("A", "1")]);
        let mut plan = ExecutionPlan::new();
        plan.add_resource(entry(&table, "A", "1"));

        let summary = execute(
            plan,
            ExecuteOptions::default(),
            &mut NoProgress,
            &mut AutoDecline,
        )
        .unwrap();

        assert_eq!(summary.no_change, 1);
        assert_eq!(summary.total_changes(), 0);
        assert_eq!(table.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_execute_with_changes() {
        let table = Table::with(&[("A", "1"), ("B", "2")]);
        let summary = execute_simple(mixed_plan(&table), ExecuteOptions::default()).unwrap();

        assert_eq!(summary.no_change, 1);
        assert_eq!(summary.modified, 1);
        assert_eq!(summary.created, 1);
        assert_eq!(table.writes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failure_does_not_stop_siblings() {
        let table = Arc::new(Table {
            failing: vec!["B".into()],
            ..Default::default()
        });
        let summary = execute_simple(mixed_plan(&table), ExecuteOptions::default()).unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.created, 2);
        assert_eq!(summary.failures[0].0, "B");
        assert_eq!(table.writes.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let table = Table::with(&[("A", "1"), ("B", "2")]);
        let opts = ExecuteOptions {
            jobs: 4,
            ..Default::default()
        };
        let summary = execute_simple(mixed_plan(&table), opts).unwrap();

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.total_changes(), 2);
        assert_eq!(table.writes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let table = Table::with(&[("A", "1"), ("B", "2")]);
        let opts = ExecuteOptions {
            dry_run: true,
            ..Default::default()
        };
        let summary = execute(mixed_plan(&table), opts, &mut NoProgress, &mut AutoDecline).unwrap();

        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.no_change, 1);
        assert_eq!(table.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_declined_confirmation_writes_nothing() {
        let table = Table::with(&[("A", "1"), ("B", "2")]);
        let summary = execute(
            mixed_plan(&table),
            ExecuteOptions::default(),
            &mut NoProgress,
            &mut AutoDecline,
        )
        .unwrap();

        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.no_change, 1);
        assert_eq!(table.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancelled_batch_writes_nothing() {
        let table = Table::with(&[]);
        let opts = ExecuteOptions {
            cancel: Some(Arc::new(AtomicBool::new(true))),
            ..Default::default()
        };
        let summary = execute_simple(mixed_plan(&table), opts).unwrap();

        assert_eq!(summary.skipped, 3);
        assert_eq!(table.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_prefetch_runs_once_and_warning_is_kept() {
        let table = Table::with(&[("A", "1")]);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut plan = mixed_plan(&table);
        plan.add_prefetch(Box::new(CountingPrefetch {
            calls: Arc::clone(&calls),
            outcome: || Ok(Some("partial dump".to_string())),
        }));

        let summary = execute(plan, ExecuteOptions::default(), &mut NoProgress, &mut AutoConfirm)
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(summary.warnings, vec!["partial dump".to_string()]);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_empty_plan_skips_prefetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut plan = ExecutionPlan::new();
        plan.add_prefetch(Box::new(CountingPrefetch {
            calls: Arc::clone(&calls),
            outcome: || Ok(None),
        }));

        let summary = execute_simple(plan, ExecuteOptions::default()).unwrap();

        assert_eq!(summary.total(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_prefetch_failure_aborts_batch() {
        let table = Table::with(&[]);
        let mut plan = mixed_plan(&table);
        plan.add_prefetch(Box::new(CountingPrefetch {
            calls: Arc::new(AtomicUsize::new(0)),
            outcome: || Err(anyhow::anyhow!("dump exited with code 1")),
        }));

        let err = execute_simple(plan, ExecuteOptions::default()).unwrap_err();

        assert!(format!("{err:#}").contains("dump exited with code 1"));
        assert_eq!(table.writes.load(Ordering::SeqCst), 0);
    }

    struct Recorder(Vec<String>);

    impl ProgressCallback for Recorder {
        fn on_diff(&mut self, report: &crate::diff::DiffReport) {
            self.0.push(format!("diff {}", report.diffs.len()));
        }

        fn on_batch_start(&mut self, count: usize) {
            self.0.push(format!("start {count}"));
        }

        fn on_resource_complete(&mut self, id: &str, result: &ApplyResult) {
            self.0.push(format!("{id} {}", result.is_change()));
        }

        fn on_batch_complete(&mut self) {
            self.0.push("done".into());
        }
    }

    #[test]
    fn test_progress_reports_in_plan_order() {
        let table = Table::with(&[("A", "1")]);
        let mut progress = Recorder(Vec::new());
        let opts = ExecuteOptions {
            jobs: 3,
            ..Default::default()
        };
        execute(mixed_plan(&table), opts, &mut progress, &mut AutoConfirm).unwrap();

        assert_eq!(
            progress.0,
            vec!["diff 2", "start 3", "A false", "B true", "C true", "done"]
        );
    }
}
