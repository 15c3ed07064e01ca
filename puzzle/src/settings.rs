use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::progress::DEFAULT_TRACKABLE_KEYS;

pub const DEFAULT_PROGRESS_SCAN_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_scan_interval_ms")]
    pub progress_scan_interval_ms: u64,
    /// Gimmick keys the progress monitor tracks, one char each.
    #[serde(default = "default_trackable_keys")]
    pub trackable_keys: String,
    /// World units per grid cell.
    #[serde(default = "default_cell_scale")]
    pub cell_scale: f32,
    /// Maximum undo depth; 0 keeps everything.
    #[serde(default)]
    pub history_limit: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            progress_scan_interval_ms: default_scan_interval_ms(),
            trackable_keys: default_trackable_keys(),
            cell_scale: default_cell_scale(),
            history_limit: 0,
        }
    }
}

impl EngineSettings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.progress_scan_interval_ms = self.progress_scan_interval_ms.max(1);
        if !(self.cell_scale.is_finite() && self.cell_scale > 0.0) {
            self.cell_scale = default_cell_scale();
        }
        let mut keys = String::new();
        for c in self.trackable_keys.chars().filter(|c| !c.is_whitespace()) {
            if !keys.contains(c) {
                keys.push(c);
            }
        }
        self.trackable_keys = keys;
        self
    }

    pub fn trackable_keys(&self) -> Vec<char> {
        self.trackable_keys.chars().collect()
    }

    pub fn progress_scan_interval(&self) -> Duration {
        Duration::from_millis(self.progress_scan_interval_ms.max(1))
    }
}

fn default_version() -> u32 {
    1
}

fn default_scan_interval_ms() -> u64 {
    DEFAULT_PROGRESS_SCAN_INTERVAL_MS
}

fn default_trackable_keys() -> String {
    DEFAULT_TRACKABLE_KEYS.iter().collect()
}

fn default_cell_scale() -> f32 {
    1.0
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("ROCKPASTE_SETTINGS_PATH") {
            return Self::at(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("rockpaste");
        path.push("settings.json");
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn load(&self) -> EngineSettings {
        let Ok(bytes) = fs::read(&self.path) else {
            return EngineSettings::default();
        };
        serde_json::from_slice::<EngineSettings>(&bytes)
            .map(EngineSettings::sanitized)
            .unwrap_or_else(|e| {
                log::warn!("ignoring unreadable settings {}: {e}", self.path.display());
                EngineSettings::default()
            })
    }

    pub fn save(&self, settings: &EngineSettings) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(settings)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_repairs_out_of_range_fields() {
        let settings = EngineSettings {
            version: 9,
            progress_scan_interval_ms: 0,
            trackable_keys: "S S H".to_string(),
            cell_scale: -2.0,
            history_limit: 3,
        }
        .sanitized();

        assert_eq!(settings.version, 1);
        assert_eq!(settings.progress_scan_interval_ms, 1);
        assert_eq!(settings.trackable_keys(), vec!['S', 'H']);
        assert_eq!(settings.cell_scale, 1.0);
        assert_eq!(settings.history_limit, 3);
    }

    #[test]
    fn serde_defaults_fill_missing_fields() {
        let parsed: EngineSettings =
            serde_json::from_str(r#"{"cellScale":0.5}"#).expect("settings JSON should parse");
        assert_eq!(parsed.cell_scale, 0.5);
        assert_eq!(parsed.trackable_keys(), vec!['S', 'H', 'C']);
        assert_eq!(parsed.progress_scan_interval(), Duration::from_millis(100));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let store = SettingsStore::at(std::env::temp_dir().join("rockpaste_no_such_settings.json"));
        assert_eq!(store.load(), EngineSettings::default());
    }
}
