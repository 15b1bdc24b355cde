//! Per-resource reconciliation state machine

use crate::context::ApplyContext;
use crate::resource::Resource;
use crate::types::{ApplyResult, ProviderState};

/// Outcome of reconciling one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// State the resource ended in
    pub state: ProviderState,
    /// What happened
    pub result: ApplyResult,
}

impl Reconciliation {
    fn new(state: ProviderState, result: ApplyResult) -> Self {
        Self { state, result }
    }
}

/// Reconcile one resource: read, compare, and write on mismatch
///
/// Errors never escape; they end the resource in [`ProviderState::Failed`]
/// so sibling resources carry on.
pub fn reconcile(resource: &dyn Resource, ctx: &ApplyContext) -> Reconciliation {
    let id = resource.id();
    log::trace!("{id}: {}", ProviderState::Unsynced);

    let current = match resource.current_value() {
        Ok(current) => current,
        Err(e) => {
            log::warn!("{id}: could not read current value: {e:#}");
            return Reconciliation::new(
                ProviderState::Failed,
                ApplyResult::Failed {
                    error: format!("{e:#}"),
                },
            );
        }
    };
    log::trace!("{id}: {} ({current:?})", ProviderState::Read);

    let desired = resource.desired_value();
    if current.as_deref() == Some(desired) {
        log::trace!("{id}: {}", ProviderState::Synced);
        return Reconciliation::new(ProviderState::Synced, ApplyResult::NoChange);
    }

    if ctx.dry_run {
        return Reconciliation::new(
            ProviderState::Read,
            ApplyResult::Skipped {
                reason: "dry run".to_string(),
            },
        );
    }

    if ctx.is_cancelled() {
        return Reconciliation::new(
            ProviderState::Read,
            ApplyResult::Skipped {
                reason: "cancelled".to_string(),
            },
        );
    }

    match resource.apply_desired(ctx) {
        Ok(()) => {
            log::trace!("{id}: {}", ProviderState::Synced);
            let result = if current.is_none() {
                ApplyResult::Created
            } else {
                ApplyResult::Modified
            };
            Reconciliation::new(ProviderState::Synced, result)
        }
        Err(e) => {
            log::warn!("{id}: could not apply desired value: {e:#}");
            Reconciliation::new(
                ProviderState::Failed,
                ApplyResult::Failed {
                    error: format!("{e:#}"),
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Fake {
        current: Option<String>,
        desired: String,
        read_fails: bool,
        write_fails: bool,
        writes: AtomicUsize,
    }

    impl Resource for Fake {
        fn id(&self) -> String {
            "fake".into()
        }

        fn description(&self) -> String {
            "fake resource".into()
        }

        fn resource_type(&self) -> &'static str {
            "fake"
        }

        fn desired_value(&self) -> &str {
            &self.desired
        }

        fn current_value(&self) -> Result<Option<String>> {
            if self.read_fails {
                bail!("dump failed");
            }
            Ok(self.current.clone())
        }

        fn apply_desired(&self, _ctx: &ApplyContext) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.write_fails {
                bail!("set failed");
            }
            Ok(())
        }
    }

    fn fake(current: Option<&str>, desired: &str) -> Fake {
        Fake {
            current: current.map(str::to_string),
            desired: desired.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_matching_value_is_not_written() {
        let resource = fake(Some("v"), "v");
        let outcome = reconcile(&resource, &ApplyContext::default());
        assert_eq!(outcome.state, ProviderState::Synced);
        assert_eq!(outcome.result, ApplyResult::NoChange);
        assert_eq!(resource.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_different_value_is_written_once() {
        let resource = fake(Some("old"), "new");
        let outcome = reconcile(&resource, &ApplyContext::default());
        assert_eq!(outcome.state, ProviderState::Synced);
        assert_eq!(outcome.result, ApplyResult::Modified);
        assert_eq!(resource.writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_absent_value_is_created() {
        let resource = fake(None, "");
        let outcome = reconcile(&resource, &ApplyContext::default());
        assert_eq!(outcome.result, ApplyResult::Created);
    }

    #[test]
    fn test_write_failure_ends_failed() {
        let mut resource = fake(Some("old"), "new");
        resource.write_fails = true;
        let outcome = reconcile(&resource, &ApplyContext::default());
        assert_eq!(outcome.state, ProviderState::Failed);
        assert!(matches!(outcome.result, ApplyResult::Failed { ref error } if error == "set failed"));
    }

    #[test]
    fn test_read_failure_skips_write() {
        let mut resource = fake(Some("old"), "new");
        resource.read_fails = true;
        let outcome = reconcile(&resource, &ApplyContext::default());
        assert_eq!(outcome.state, ProviderState::Failed);
        assert_eq!(resource.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let resource = fake(Some("old"), "new");
        let outcome = reconcile(&resource, &ApplyContext::new(true, false));
        assert_eq!(outcome.state, ProviderState::Read);
        assert!(matches!(outcome.result, ApplyResult::Skipped { .. }));
        assert_eq!(resource.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancelled_batch_does_not_write() {
        let cancel = AtomicBool::new(true);
        let resource = fake(Some("old"), "new");
        let ctx = ApplyContext::default().with_cancel(&cancel);
        let outcome = reconcile(&resource, &ctx);
        assert_eq!(
            outcome.result,
            ApplyResult::Skipped {
                reason: "cancelled".into()
            }
        );
        assert_eq!(resource.writes.load(Ordering::SeqCst), 0);
    }
}
