//! Diff and status display - lwsync UI

use crate::ui;
use colored::Colorize;
use declarative::{BoxedResource, DiffReport, DiffSummary, ResourceDiff, ResourceState};

/// How a managed setting compares with the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    /// Current value equals the desired value
    InSync,
    /// Set, but to something else
    Changed { current: String },
    /// Not listed by the dump
    Absent,
    /// The current value could not be read
    Unreadable { error: String },
}

/// One row of `lwsync status`
#[derive(Debug, Clone)]
pub struct SettingStatus {
    pub name: String,
    pub desired: String,
    pub drift: Drift,
}

/// Compare every resource with its desired value
pub fn collect_status(resources: &[BoxedResource]) -> Vec<SettingStatus> {
    resources
        .iter()
        .map(|resource| {
            let desired = resource.desired_value().to_string();
            let drift = match resource.current_state() {
                Ok(state) if state.matches(&desired) => Drift::InSync,
                Ok(ResourceState::Present { value }) => Drift::Changed { current: value },
                Ok(ResourceState::Absent) => Drift::Absent,
                Err(e) => Drift::Unreadable {
                    error: format!("{e:#}"),
                },
            };
            SettingStatus {
                name: resource.id(),
                desired,
                drift,
            }
        })
        .collect()
}

/// Display the status table
pub fn display_status(rows: &[SettingStatus]) {
    if rows.is_empty() {
        ui::info("No settings declared");
        return;
    }

    let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0).max(10);

    println!();
    for row in rows {
        let (symbol, detail) = match &row.drift {
            Drift::InSync => ("✓".green(), ui::format_value(&row.desired).dimmed()),
            Drift::Changed { current } => (
                "~".yellow(),
                format!(
                    "{} → {}",
                    ui::format_value(current),
                    ui::format_value(&row.desired)
                )
                .normal(),
            ),
            Drift::Absent => (
                "+".green(),
                format!("(not set) → {}", ui::format_value(&row.desired)).normal(),
            ),
            Drift::Unreadable { error } => ("✗".red(), error.red()),
        };
        println!("  {symbol} {:<width$}  {detail}", row.name);
    }

    let in_sync = rows.iter().filter(|r| r.drift == Drift::InSync).count();
    println!();
    println!(
        "  {} of {} settings in sync",
        in_sync.to_string().bold(),
        rows.len()
    );
}

/// Display a list of diffs in a user-friendly format
pub fn display_diff(report: &DiffReport) {
    for (id, error) in &report.errors {
        ui::error(&format!("{id}: {error}"));
    }

    if report.diffs.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Settings Diff".bold()
    );
    println!("│");

    for diff in &report.diffs {
        let (symbol, state_desc) = describe(diff);
        println!(
            "│   {} {:<30} {}",
            symbol,
            diff.resource_id,
            state_desc.dimmed()
        );
    }
    println!("│");

    let summary = DiffSummary::from_diffs(&report.diffs);
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} changes ({} new, {} modified)",
        summary.total().to_string().bold(),
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

fn describe(diff: &ResourceDiff) -> (colored::ColoredString, String) {
    match &diff.current {
        ResourceState::Absent => (
            "+".green(),
            format!("(not set) → {}", ui::format_value(&diff.desired)),
        ),
        ResourceState::Present { value } => (
            "~".yellow(),
            format!(
                "{} → {}",
                ui::format_value(value),
                ui::format_value(&diff.desired)
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::LikewiseSetting;
    use lwconfig::backend::MockBackend;
    use lwconfig::{DesiredSetting, SettingsStore};
    use std::sync::Arc;

    fn resources(mock: &MockBackend, desired: &[(&str, &str)]) -> Vec<BoxedResource> {
        let store = Arc::new(SettingsStore::new(Arc::new(mock.clone())));
        desired
            .iter()
            .map(|(name, value)| {
                Box::new(LikewiseSetting::new(
                    DesiredSetting::new(*name, *value),
                    Arc::clone(&store),
                )) as BoxedResource
            })
            .collect()
    }

    #[test]
    fn test_collect_status() {
        let mock = MockBackend::with_output("a 1\nb 2\n");
        let rows = collect_status(&resources(&mock, &[("a", "1"), ("b", "3"), ("c", "4")]));

        assert_eq!(rows[0].drift, Drift::InSync);
        assert_eq!(
            rows[1].drift,
            Drift::Changed {
                current: "2".into()
            }
        );
        assert_eq!(rows[2].drift, Drift::Absent);
        assert_eq!(mock.dump_calls(), 1);
    }

    #[test]
    fn test_collect_status_unreadable() {
        let mock = MockBackend::new();
        mock.fail_dump("boom");
        let rows = collect_status(&resources(&mock, &[("a", "1")]));

        assert!(matches!(rows[0].drift, Drift::Unreadable { ref error } if error.contains("boom")));
    }

    #[test]
    fn test_describe() {
        let diff = ResourceDiff {
            resource_id: "a".into(),
            resource_type: "likewise_setting".into(),
            description: "Set a".into(),
            current: ResourceState::Present { value: "1".into() },
            desired: "2".into(),
        };
        let (_, text) = describe(&diff);
        assert_eq!(text, "\"1\" → \"2\"");
    }
}
