//! Likewise setting resource - one lwconfig key held at a desired value

use anyhow::{Context, Result};
use declarative::{ApplyContext, Prefetch, Resource};
use lwconfig::{DesiredSetting, SettingsStore};
use std::sync::Arc;

/// A Likewise Open setting
///
/// Reads go through the batch's shared [`SettingsStore`], so any number of
/// settings cost one `lwconfig --dump`. Writes go straight to the backend
/// and leave the snapshot untouched.
#[derive(Debug, Clone)]
pub struct LikewiseSetting {
    setting: DesiredSetting,
    store: Arc<SettingsStore>,
}

impl LikewiseSetting {
    pub fn new(setting: DesiredSetting, store: Arc<SettingsStore>) -> Self {
        Self { setting, store }
    }
}

impl Resource for LikewiseSetting {
    fn id(&self) -> String {
        self.setting.name.clone()
    }

    fn description(&self) -> String {
        format!("Set {}", self.setting)
    }

    fn resource_type(&self) -> &'static str {
        "likewise_setting"
    }

    fn desired_value(&self) -> &str {
        &self.setting.value
    }

    fn current_value(&self) -> Result<Option<String>> {
        self.store
            .get(&self.setting.name)
            .with_context(|| format!("Could not read {}", self.setting.name))
    }

    fn apply_desired(&self, _ctx: &ApplyContext) -> Result<()> {
        log::info!("lwconfig {} {:?}", self.setting.name, self.setting.value);
        self.store
            .backend()
            .set(&self.setting.name, &self.setting.value)
            .with_context(|| format!("Could not set {}", self.setting.name))
    }
}

/// Loads the shared snapshot once, before any setting is read
#[derive(Debug)]
pub struct StorePrefetch(pub Arc<SettingsStore>);

impl Prefetch for StorePrefetch {
    fn prefetch(&self) -> Result<Option<String>> {
        let settings = self.0.snapshot().context("Could not dump current settings")?;
        log::debug!("Prefetched {} settings", settings.len());
        Ok(self.0.diagnostic().map(|d| d.to_string()))
    }
}
