//! Manifest loading: where the file lives and what it declares

use anyhow::{Context, Result, bail};
use lwconfig::{CommandConfig, DesiredSetting};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The lwsync manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// How to run lwconfig
    #[serde(default)]
    pub lwconfig: LwconfigSection,

    /// Desired settings (name = value)
    #[serde(default)]
    pub settings: BTreeMap<String, SettingValue>,
}

/// `[lwconfig]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LwconfigSection {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_dump_args")]
    pub dump_args: Vec<String>,

    /// 0 disables the timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LwconfigSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            dump_args: default_dump_args(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_program() -> String {
    "lwconfig".to_string()
}

fn default_dump_args() -> Vec<String> {
    vec!["--dump".to_string()]
}

fn default_timeout_secs() -> u64 {
    lwconfig::DEFAULT_TIMEOUT.as_secs()
}

/// A desired value as written in TOML; lwconfig only knows strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            // Whole floats keep their fraction: 1.0 stays "1.0", not "1"
            Self::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Command-line overrides for the `[lwconfig]` section
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub program: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load and validate a manifest
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))?;
        config.validate()?;
        log::debug!(
            "Loaded {} desired settings from {}",
            config.settings.len(),
            path.display()
        );
        Ok(config)
    }

    /// Load a manifest, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.lwconfig.program.trim().is_empty() {
            bail!("lwconfig.program must not be empty");
        }
        for name in self.settings.keys() {
            validate_name(name).with_context(|| format!("Invalid setting '{name}'"))?;
        }
        Ok(())
    }

    /// Desired settings with their values in string form, in name order
    pub fn desired_settings(&self) -> Vec<DesiredSetting> {
        self.settings
            .iter()
            .map(|(name, value)| DesiredSetting::new(name.as_str(), value.to_string()))
            .collect()
    }

    /// How to run lwconfig, with command-line overrides applied
    pub fn command_config(&self, overrides: &Overrides) -> CommandConfig {
        let program = overrides
            .program
            .clone()
            .unwrap_or_else(|| expand(&self.lwconfig.program));
        let secs = overrides.timeout_secs.unwrap_or(self.lwconfig.timeout_secs);

        CommandConfig {
            program,
            dump_args: self.lwconfig.dump_args.clone(),
            timeout: (secs > 0).then(|| Duration::from_secs(secs)),
        }
    }
}

/// Setting names are single dump tokens
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("name must not be empty");
    }
    if name.contains(char::is_whitespace) {
        bail!("name must not contain whitespace");
    }
    if name.starts_with('"') {
        bail!("name must not start with a quote");
    }
    Ok(())
}

/// Resolve the manifest path: explicit flag (or `$LWSYNC_CONFIG`, handled
/// by clap) first, then `~/.config/lwsync/config.toml`
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(expand(&path.to_string_lossy()).into());
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("lwsync").join("config.toml"))
}

/// Expand `~` and environment variables
fn expand(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or(std::borrow::Cow::Borrowed(path))
        .into_owned()
}
