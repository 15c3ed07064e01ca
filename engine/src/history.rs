use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Undo/redo stacks of owned snapshots.
///
/// Snapshots are moved in and out by value, so a restored state never shares
/// storage with anything still held by the stacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History<S> {
    undo: Vec<S>,
    redo: Vec<S>,
    /// Maximum undo depth; 0 means unbounded.
    #[serde(default)]
    limit: usize,
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> History<S> {
    pub fn new() -> Self {
        Self::with_limit(0)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Pushes the pre-mutation state. Any forward history is discarded.
    pub fn record(&mut self, snapshot: S) {
        self.redo.clear();
        self.undo.push(snapshot);
        if self.limit > 0 && self.undo.len() > self.limit {
            let excess = self.undo.len() - self.limit;
            self.undo.drain(..excess);
        }
    }

    /// Swaps `current` with the newest undo snapshot; the replaced state goes
    /// onto the redo stack. Returns `false` (and leaves `current` alone) when
    /// there is nothing to undo.
    pub fn undo(&mut self, current: &mut S) -> bool {
        let Some(previous) = self.undo.pop() else {
            return false;
        };
        let replaced = std::mem::replace(current, previous);
        self.redo.push(replaced);
        true
    }

    pub fn redo(&mut self, current: &mut S) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        let replaced = std::mem::replace(current, next);
        self.undo.push(replaced);
        true
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn undo_stack(&self) -> &[S] {
        &self.undo
    }

    pub fn redo_stack(&self) -> &[S] {
        &self.redo
    }
}

impl<S: Serialize> History<S> {
    pub fn save_json_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, text)
    }
}

impl<S: DeserializeOwned> History<S> {
    pub fn load_json_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = fs::File::open(path)?;
        let reader = io::BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed parsing history json {}: {e}", path.display()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_then_redo_round_trips_state() {
        let mut history = History::new();
        let mut state = 0;

        history.record(state);
        state = 1;
        history.record(state);
        state = 2;

        assert!(history.undo(&mut state));
        assert_eq!(state, 1);
        assert!(history.undo(&mut state));
        assert_eq!(state, 0);
        assert!(!history.undo(&mut state));
        assert_eq!(state, 0);

        assert!(history.redo(&mut state));
        assert_eq!(state, 1);
        assert!(history.redo(&mut state));
        assert_eq!(state, 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn record_discards_forward_history() {
        let mut history = History::new();
        let mut state = 0;
        history.record(state);
        state = 1;

        history.undo(&mut state);
        assert!(history.can_redo());

        history.record(state);
        assert!(!history.can_redo());
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn limit_drops_oldest_snapshots() {
        let mut history = History::with_limit(2);
        history.record(1);
        history.record(2);
        history.record(3);
        assert_eq!(history.undo_stack(), &[2, 3]);
    }

    #[test]
    fn restored_vec_state_is_independent_of_stack() {
        let mut history = History::new();
        let mut grid = vec![vec!["#".to_string()]];
        history.record(grid.clone());
        grid[0][0].clear();

        history.undo(&mut grid);
        grid[0][0].push('S');

        assert_eq!(history.redo_stack()[0], vec![vec![String::new()]]);
        assert_eq!(grid, vec![vec!["#S".to_string()]]);
    }
}
