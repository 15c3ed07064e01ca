//! Persisted player progress: two stage indices and the tutorial flag.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const KEY_CURRENT_STAGE: &str = "currentStage";
pub const KEY_MAX_STAGE: &str = "maxStage";
pub const KEY_SHOW_TUTORIAL_ON_RELOAD: &str = "showTutorialOnReload";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProgress {
    #[serde(default)]
    pub current_stage: usize,
    #[serde(default)]
    pub max_stage: usize,
    #[serde(default)]
    pub show_tutorial_on_reload: bool,
}

impl PlayerProgress {
    /// Keeps both indices inside a catalog of `stage_count` stages and
    /// `current` at or below `max`.
    pub fn clamped(mut self, stage_count: usize) -> Self {
        let last = stage_count.saturating_sub(1);
        self.max_stage = self.max_stage.min(last);
        self.current_stage = self.current_stage.min(self.max_stage);
        self
    }

    /// Only stages up to the furthest reached one can be selected.
    pub fn select_stage(&mut self, index: usize) -> bool {
        if index > self.max_stage {
            return false;
        }
        self.current_stage = index;
        true
    }

    /// Advances past `index`; `max_stage` never decreases.
    pub fn complete_stage(&mut self, index: usize, stage_count: usize) {
        let next = (index + 1).min(stage_count.saturating_sub(1));
        self.max_stage = self.max_stage.max(next);
        self.current_stage = next;
    }
}

#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("ROCKPASTE_SAVE_PATH") {
            return Self::at(explicit);
        }

        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".local");
                    p.push("share");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        Self::at(base.join("rockpaste").join("save.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> PlayerProgress {
        let Ok(bytes) = fs::read(&self.path) else {
            return PlayerProgress::default();
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            log::warn!("ignoring unreadable save {}: {e}", self.path.display());
            PlayerProgress::default()
        })
    }

    pub fn save(&self, progress: &PlayerProgress) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(progress)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        atomic_write(&self.path, json.as_bytes())
    }
}

fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(&tmp, path)?;
            let _ = fs::remove_file(&tmp);
            Ok(())
        }
    }
}
