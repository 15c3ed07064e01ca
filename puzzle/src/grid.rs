use serde::{Deserialize, Serialize};

use crate::cell::{self, EMPTY_CELL};
use crate::coords::SelectionBounds;
use crate::tools::ToolSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Layer {
    Mass,
    Rock,
}

/// Row-major cell strings; `rows[y][x]`, `y = 0` is the bottom row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellGrid {
    rows: Vec<Vec<String>>,
}

impl CellGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            rows: vec![vec![String::new(); width]; height],
        }
    }

    /// Ragged input is padded on the right so every row has the same width.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let mut grid = Self { rows };
        let (w, h) = (grid.width(), grid.height());
        grid.resize_at_least(w, h);
        grid
    }

    pub fn filled(width: usize, height: usize, value: &str) -> Self {
        Self {
            rows: vec![vec![value.to_string(); width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (y as usize) < self.rows.len() && (x as usize) < self.rows[y as usize].len()
    }

    pub fn get(&self, x: i32, y: i32) -> &str {
        if !self.in_bounds(x, y) {
            return EMPTY_CELL;
        }
        &self.rows[y as usize][x as usize]
    }

    /// Writes `value`, growing the grid with empty cells if `(x, y)` lies past
    /// the current bounds. Negative coordinates are ignored.
    pub fn set(&mut self, x: i32, y: i32, value: impl Into<String>) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        let width = self.width().max(x + 1);
        let height = self.height().max(y + 1);
        self.resize_at_least(width, height);
        self.rows[y][x] = value.into();
        true
    }

    pub fn clear(&mut self, x: i32, y: i32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.rows[y as usize][x as usize].clear();
        true
    }

    /// Pads with empty cells until the grid is at least `width` x `height`.
    /// Returns whether anything was added.
    pub fn resize_at_least(&mut self, width: usize, height: usize) -> bool {
        let mut grew = false;
        while self.rows.len() < height {
            self.rows.push(Vec::new());
            grew = true;
        }
        let width = width.max(self.width());
        for row in &mut self.rows {
            if row.len() < width {
                row.resize(width, String::new());
                grew = true;
            }
        }
        grew
    }

    /// `(x, y, value)` for every cell, bottom row first, left to right.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, &str)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, value)| (x as i32, y as i32, value.as_str()))
        })
    }
}

/// A stage's full mutable state: both layers plus the remaining tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageData {
    pub name: String,
    pub mass_grid: CellGrid,
    pub rock_grid: CellGrid,
    #[serde(default)]
    pub tool_inventory: Vec<ToolSlot>,
}

impl StageData {
    pub fn new(name: impl Into<String>, mass_grid: CellGrid, rock_grid: CellGrid) -> Self {
        Self {
            name: name.into(),
            mass_grid,
            rock_grid,
            tool_inventory: Vec::new(),
        }
    }

    pub fn layer(&self, layer: Layer) -> &CellGrid {
        match layer {
            Layer::Mass => &self.mass_grid,
            Layer::Rock => &self.rock_grid,
        }
    }

    pub fn layer_mut(&mut self, layer: Layer) -> &mut CellGrid {
        match layer {
            Layer::Mass => &mut self.mass_grid,
            Layer::Rock => &mut self.rock_grid,
        }
    }

    pub fn get_cell(&self, layer: Layer, x: i32, y: i32) -> &str {
        self.layer(layer).get(x, y)
    }

    pub fn set_cell(&mut self, layer: Layer, x: i32, y: i32, value: impl Into<String>) -> bool {
        self.layer_mut(layer).set(x, y, value)
    }

    /// Grid size as `(width, height)`, taken from the Mass layer.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.mass_grid.width(), self.mass_grid.height())
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.mass_grid.in_bounds(x, y)
    }

    pub fn is_empty(&self) -> bool {
        self.mass_grid.is_empty()
    }

    /// Pads both layers to a common size. Returns whether anything changed.
    pub fn reconcile_layers(&mut self) -> bool {
        let width = self.mass_grid.width().max(self.rock_grid.width());
        let height = self.mass_grid.height().max(self.rock_grid.height());
        let mass = self.mass_grid.resize_at_least(width, height);
        let rock = self.rock_grid.resize_at_least(width, height);
        if mass || rock {
            log::warn!(
                "stage '{}': padded layers to {width}x{height} (mass padded: {mass}, rock padded: {rock})",
                self.name
            );
        }
        mass || rock
    }

    pub fn is_rock(&self, x: i32, y: i32) -> bool {
        cell::is_rock(self.rock_grid.get(x, y))
    }

    pub fn is_mass(&self, x: i32, y: i32) -> bool {
        cell::is_mass(self.mass_grid.get(x, y))
    }

    /// The shared placement predicate: in bounds, on `.` Mass, not already Rock.
    pub fn can_hold_rock(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.is_mass(x, y) && !self.is_rock(x, y)
    }

    pub fn rock_count(&self) -> usize {
        self.rock_grid
            .cells()
            .filter(|(_, _, value)| cell::is_rock(value))
            .count()
    }

    pub fn rock_count_in(&self, bounds: SelectionBounds) -> usize {
        bounds.cells().filter(|&(x, y)| self.is_rock(x, y)).count()
    }

    pub fn fingerprint(&self) -> std::io::Result<String> {
        engine::fingerprint::state_sha256_hex(self)
    }
}
