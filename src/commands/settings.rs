//! Direct setting commands: `dump`, `get`, `set`

use anyhow::{Context as _, Result, bail};
use colored::Colorize;
use lwconfig::{DesiredSetting, Settings, parser};

use crate::Context;
use crate::ui;

/// Output format for `lwsync dump`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    /// `name = "value"` lines
    Pairs,
    /// A JSON object
    Json,
    /// lwconfig dump format, every value quoted
    Raw,
}

impl DumpFormat {
    pub fn from_flags(json: bool, raw: bool) -> Self {
        match (json, raw) {
            (true, _) => Self::Json,
            (false, true) => Self::Raw,
            (false, false) => Self::Pairs,
        }
    }
}

pub fn dump(ctx: &Context, format: DumpFormat) -> Result<()> {
    let config = ctx.load_config_or_default()?;
    let client = ctx.client(&config)?;

    let (settings, diagnostic) = client.read_settings()?.into_parts();
    if let Some(diagnostic) = diagnostic {
        // stdout may be piped into another tool
        eprintln!("{} {}", "⚠".yellow(), diagnostic);
        eprintln!(
            "  {}",
            format!("showing the {} settings read before it", settings.len()).dimmed()
        );
    }

    print!("{}", render_dump(&settings, format)?);
    Ok(())
}

/// Render a snapshot in the requested format
pub fn render_dump(settings: &Settings, format: DumpFormat) -> Result<String> {
    Ok(match format {
        DumpFormat::Pairs => settings
            .iter()
            .map(|(name, value)| format!("{name} = {value:?}\n"))
            .collect(),
        DumpFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
            json.push('\n');
            json
        }
        DumpFormat::Raw => parser::write_dump(settings),
    })
}

pub fn get(ctx: &Context, name: &str) -> Result<()> {
    let config = ctx.load_config_or_default()?;
    let store = ctx.client(&config)?.store();

    match store.get(name)? {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => {
            if let Some(diagnostic) = store.diagnostic() {
                ui::warn(&diagnostic.to_string());
            }
            bail!("{name} is not set")
        }
    }
}

pub fn set(ctx: &Context, name: &str, value: &str) -> Result<()> {
    let config = ctx.load_config_or_default()?;
    let client = ctx.client(&config)?;
    let setting = DesiredSetting::new(name, value);

    client.set(&setting)?;

    if !ctx.quiet {
        ui::success(&format!("Set {setting}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        [
            ("AssumeDefaultDomain", "true"),
            ("HomeDirTemplate", "%H/local/%D/%U"),
            ("Banner", "line one\nsay \"hi\""),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_format_from_flags() {
        assert_eq!(DumpFormat::from_flags(false, false), DumpFormat::Pairs);
        assert_eq!(DumpFormat::from_flags(true, false), DumpFormat::Json);
        assert_eq!(DumpFormat::from_flags(false, true), DumpFormat::Raw);
    }

    #[test]
    fn test_render_pairs_in_name_order() {
        let out = render_dump(&settings(), DumpFormat::Pairs).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "AssumeDefaultDomain = \"true\"");
        assert_eq!(lines[1], "Banner = \"line one\\nsay \\\"hi\\\"\"");
        assert_eq!(lines[2], "HomeDirTemplate = \"%H/local/%D/%U\"");
    }

    #[test]
    fn test_render_json() {
        let out = render_dump(&settings(), DumpFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["AssumeDefaultDomain"], "true");
        assert_eq!(value["Banner"], "line one\nsay \"hi\"");
    }

    #[test]
    fn test_render_raw_parses_back() {
        let out = render_dump(&settings(), DumpFormat::Raw).unwrap();
        let outcome = parser::parse_dump(&out, "lwconfig --dump");
        assert!(outcome.is_complete());
        assert_eq!(outcome.settings(), &settings());
    }
}
