use std::{fs, path::Path};

use anyhow::{anyhow, Context};
use relay::{RelayConfig, TeardownPolicy, DEFAULT_RELAY_CAPACITY};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "console.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub relay_capacity: usize,
    pub teardown: TeardownPolicy,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            relay_capacity: DEFAULT_RELAY_CAPACITY,
            teardown: TeardownPolicy::DeliverPending,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig::default()
            .with_capacity(self.relay_capacity)
            .with_teardown(self.teardown)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    relay_capacity: Option<usize>,
    teardown: Option<TeardownPolicy>,
    log_filter: Option<String>,
}

/// Defaults, then `console.toml` (or the explicit path), then `APP__*`
/// environment variables.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match explicit_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                apply_file(&mut settings, &raw)
                    .with_context(|| format!("invalid config file '{DEFAULT_CONFIG_FILE}'"))?;
            }
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.relay_capacity {
        settings.relay_capacity = v;
    }
    if let Some(v) = file_cfg.teardown {
        settings.teardown = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

fn apply_env<F>(settings: &mut Settings, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("APP__RELAY_CAPACITY") {
        settings.relay_capacity = v
            .trim()
            .parse()
            .with_context(|| format!("APP__RELAY_CAPACITY must be a positive integer, got '{v}'"))?;
    }
    if let Some(v) = lookup("APP__TEARDOWN") {
        settings.teardown = v.parse().map_err(|err: String| anyhow!(err))?;
    }
    if let Some(v) = lookup("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
