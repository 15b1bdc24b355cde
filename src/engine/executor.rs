//! Execution engine - lwsync executor with UI integration

use anyhow::Result;
use colored::Colorize;
use declarative::{
    ApplyResult, AutoConfirm, ConfirmCallback, DiffReport, ExecuteSummary, ExecutionPlan,
    ProgressCallback,
};

use super::differ::display_diff;

/// Options for execution (includes `yes` for confirmation skip)
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Number of parallel jobs
    pub jobs: usize,
    /// Skip confirmation prompts
    pub yes: bool,
    /// Verbose output
    pub verbose: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 1,
            yes: false,
            verbose: false,
        }
    }
}

/// Execute the plan with lwsync's UI integration
pub fn execute(plan: ExecutionPlan, opts: ExecuteOptions) -> Result<ExecuteSummary> {
    let engine_opts = declarative::ExecuteOptions {
        dry_run: opts.dry_run,
        jobs: opts.jobs,
        verbose: opts.verbose,
        cancel: None,
    };
    let mut progress = UiProgress {
        dry_run: opts.dry_run,
        verbose: opts.verbose,
    };

    let summary = if opts.yes {
        declarative::execute(plan, engine_opts, &mut progress, &mut AutoConfirm)?
    } else {
        declarative::execute(plan, engine_opts, &mut progress, &mut PromptConfirm)?
    };

    print_summary(&summary, opts.dry_run);
    Ok(summary)
}

/// Prints the diff and one line per reconciled setting
struct UiProgress {
    dry_run: bool,
    verbose: bool,
}

impl ProgressCallback for UiProgress {
    fn on_diff(&mut self, report: &DiffReport) {
        display_diff(report);
    }

    fn on_batch_start(&mut self, count: usize) {
        if self.dry_run {
            return;
        }
        println!();
        println!("  {} Reconciling {} settings...", "→".cyan(), count);
    }

    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult) {
        match result {
            ApplyResult::Created | ApplyResult::Modified => {
                println!("    {} {}", "✓".green(), id);
            }
            ApplyResult::Failed { error } => {
                println!("    {} {}: {}", "✗".red(), id, error.red());
            }
            ApplyResult::Skipped { reason } if self.verbose || !self.dry_run => {
                println!("    {} {} ({})", "⊘".dimmed(), id, reason);
            }
            ApplyResult::NoChange if self.verbose => {
                println!("    {} {}", "○".dimmed(), id);
            }
            _ => {}
        }
    }

    fn on_batch_complete(&mut self) {}
}

/// Confirm with user
struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        use dialoguer::Confirm;

        println!();
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;

        if !confirmed {
            println!();
            println!("  {} Aborted", "✗".red());
        }
        Ok(confirmed)
    }
}

/// Print final summary
fn print_summary(summary: &ExecuteSummary, dry_run: bool) {
    for warning in &summary.warnings {
        println!();
        println!("  {} {}", "⚠".yellow(), warning);
    }

    if dry_run {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
        return;
    }

    if summary.total_changes() == 0 && summary.is_success() {
        return;
    }

    println!();
    if summary.is_success() {
        println!("  {} Settings applied successfully!", "✓".green().bold());
    } else {
        println!("  {} Settings applied with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} settings added", summary.created);
    }
    if summary.modified > 0 {
        println!("    • {} settings changed", summary.modified);
    }
    if summary.skipped > 0 {
        println!("    • {} settings skipped", summary.skipped);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "settings".red());
    }
}
