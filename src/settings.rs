use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::timer::DEFAULT_DURATION_SECS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Countdown length for every new task.
    pub default_duration_secs: u32,
    /// Ring the terminal bell when a countdown finishes.
    pub bell_on_finish: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_duration_secs: DEFAULT_DURATION_SECS,
            bell_on_finish: true,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.default_duration_secs == 0 {
            bail!("default_duration_secs must be greater than zero");
        }
        Ok(())
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: Settings,
}

impl SettingsStore {
    /// Load `path`, writing defaults there on first run. A file that cannot be
    /// parsed is replaced in memory by defaults and left untouched on disk.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Ignoring unreadable settings in {}: {}",
                    path.display(),
                    err
                );
                Settings::default()
            })
        } else {
            let defaults = Settings::default();
            persist(&path, &defaults)?;
            defaults
        };

        data.validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        Ok(Self { path, data })
    }

    pub fn settings(&self) -> &Settings {
        &self.data
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

fn persist(path: &std::path::Path, data: &Settings) -> Result<()> {
    let serialized = serde_json::to_string_pretty(data)?;
    fs::write(path, serialized)
        .with_context(|| format!("Failed to write settings to {}", path.display()))
}
