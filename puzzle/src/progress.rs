//! Matches Rock gimmick keys against the Mass keys of the starting layout.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::cell;
use crate::coords::Vec2i;
use crate::grid::StageData;

pub const DEFAULT_TRACKABLE_KEYS: &[char] = &['S', 'H', 'C'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressItem {
    pub pattern_key: char,
    pub grid_position: Vec2i,
    pub acquired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProgressEvent {
    Acquired { key: char, slot: usize },
    StageCleared,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressMonitor {
    trackable: Vec<char>,
    items: Vec<ProgressItem>,
    seen: BTreeSet<(char, i32, i32)>,
    cleared: bool,
}

/// `.` Mass cells carrying trackable keys, column by column (x, then y).
fn mass_targets<'a>(stage: &'a StageData, trackable: &'a [char]) -> impl Iterator<Item = (char, Vec2i)> + 'a {
    let (width, height) = stage.dimensions();
    (0..width as i32).flat_map(move |x| {
        (0..height as i32).flat_map(move |y| {
            let parsed = cell::parse(stage.mass_grid.get(x, y));
            let keys = if parsed.is_mass() { parsed.keys } else { Vec::new() };
            keys.into_iter()
                .filter(move |k| trackable.contains(k))
                .map(move |k| (k, Vec2i::new(x, y)))
        })
    })
}

impl ProgressMonitor {
    pub fn new(stage: &StageData, trackable: &[char]) -> Self {
        let trackable = trackable.to_vec();
        let items = mass_targets(stage, &trackable)
            .map(|(pattern_key, grid_position)| ProgressItem {
                pattern_key,
                grid_position,
                acquired: false,
            })
            .collect();
        Self {
            trackable,
            items,
            seen: BTreeSet::new(),
            cleared: false,
        }
    }

    pub fn trackable_keys(&self) -> &[char] {
        &self.trackable
    }

    /// All items in generation order.
    pub fn items(&self) -> &[ProgressItem] {
        &self.items
    }

    /// Items of one key; the position in this list is the slot index.
    pub fn slots(&self, key: char) -> Vec<&ProgressItem> {
        self.items.iter().filter(|i| i.pattern_key == key).collect()
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn acquired_count(&self) -> usize {
        self.items.iter().filter(|i| i.acquired).count()
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub fn matched_pairs(&self) -> usize {
        self.seen.len()
    }

    fn acquire_next(&mut self, key: char) -> Option<usize> {
        let mut slot = 0;
        for item in self.items.iter_mut().filter(|i| i.pattern_key == key) {
            if !item.acquired {
                item.acquired = true;
                return Some(slot);
            }
            slot += 1;
        }
        None
    }

    /// Records new matches in the current grid. Re-scanning an unchanged grid
    /// emits nothing; `StageCleared` is emitted at most once per monitor.
    pub fn scan(&mut self, stage: &StageData) -> Vec<ProgressEvent> {
        let matches: Vec<(char, Vec2i)> = mass_targets(stage, &self.trackable)
            .filter(|(key, pos)| {
                let rock = cell::parse(stage.rock_grid.get(pos.x, pos.y));
                rock.is_rock() && rock.has_key(*key)
            })
            .collect();

        let mut events = Vec::new();
        for (key, pos) in matches {
            if !self.seen.insert((key, pos.x, pos.y)) {
                continue;
            }
            if let Some(slot) = self.acquire_next(key) {
                log::debug!("progress: '{key}' matched at ({}, {}) -> slot {slot}", pos.x, pos.y);
                events.push(ProgressEvent::Acquired { key, slot });
            }
        }

        if !self.cleared && !self.items.is_empty() && self.items.iter().all(|i| i.acquired) {
            self.cleared = true;
            events.push(ProgressEvent::StageCleared);
        }
        events
    }
}
