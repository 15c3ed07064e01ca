//! Read-only stage catalog. Play always happens on a clone of an entry.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::cell;
use crate::grid::{CellGrid, StageData};
use crate::tools::{ToolId, ToolSlot, ToolSpec};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("stage index {index} out of range (catalog has {len} stages)")]
    StageNotFound { index: usize, len: usize },
    #[error("stage '{name}' has an empty mass grid")]
    EmptyGrid { name: String },
    #[error("catalog parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog io failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Stage as authored. Rows run bottom to top, cells left to right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageAsset {
    pub name: String,
    pub mass_grid: Vec<Vec<String>>,
    #[serde(default)]
    pub rock_grid: Vec<Vec<String>>,
    #[serde(default)]
    pub tool_inventory: Vec<ToolSpec>,
}

impl StageAsset {
    /// Builds a runtime copy with both layers padded to a common size and
    /// tool ids assigned from 1 in inventory order.
    pub fn to_stage_data(&self) -> Result<StageData, CatalogError> {
        let mut stage = StageData::new(
            self.name.clone(),
            CellGrid::from_rows(self.mass_grid.clone()),
            CellGrid::from_rows(self.rock_grid.clone()),
        );
        if stage.mass_grid.is_empty() {
            return Err(CatalogError::EmptyGrid {
                name: self.name.clone(),
            });
        }
        stage.reconcile_layers();
        stage.tool_inventory = self
            .tool_inventory
            .iter()
            .zip(1..)
            .map(|(spec, id): (&ToolSpec, ToolId)| ToolSlot {
                id,
                spec: ToolSpec::new(spec.width, spec.height, spec.kind),
            })
            .collect();
        Ok(stage)
    }

    /// Authoring problems that the runtime would silently repair.
    pub fn lint(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mass = CellGrid::from_rows(self.mass_grid.clone());
        let rock = CellGrid::from_rows(self.rock_grid.clone());

        if mass.is_empty() {
            issues.push("mass grid is empty".to_string());
            return issues;
        }
        if self.mass_grid.iter().any(|row| row.len() != mass.width()) {
            issues.push("mass grid rows have different lengths".to_string());
        }
        if !rock.is_empty() && (rock.width(), rock.height()) != (mass.width(), mass.height()) {
            issues.push(format!(
                "rock grid is {}x{}, mass grid is {}x{}",
                rock.width(),
                rock.height(),
                mass.width(),
                mass.height()
            ));
        }
        for (x, y, value) in rock.cells() {
            if cell::is_rock(value) && !cell::is_mass(mass.get(x, y)) {
                issues.push(format!("rock at ({x}, {y}) is not above mass"));
            } else if !value.is_empty() && !cell::is_rock(value) {
                issues.push(format!(
                    "rock layer cell '{value}' at ({x}, {y}) has no '#' base and may be overwritten"
                ));
            }
        }
        for spec in &self.tool_inventory {
            if spec.width == 0 || spec.height == 0 {
                issues.push(format!("{} tool has a zero dimension", spec.kind.label()));
            }
        }
        issues
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCatalog {
    #[serde(default = "default_version")]
    pub version: u32,
    pub stages: Vec<StageAsset>,
}

fn default_version() -> u32 {
    1
}

impl StageCatalog {
    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// The stages shipped with the crate. Falls back to an empty catalog if
    /// the embedded asset fails to parse.
    pub fn builtin() -> Self {
        Self::from_json_str(include_str!("../assets/stages.json")).unwrap_or_else(|e| {
            log::warn!("builtin stage catalog is unreadable: {e}");
            Self::default()
        })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&StageAsset, CatalogError> {
        self.stages.get(index).ok_or(CatalogError::StageNotFound {
            index,
            len: self.stages.len(),
        })
    }

    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.name == name)
    }

    /// A fresh working copy of stage `index`.
    pub fn instantiate(&self, index: usize) -> Result<StageData, CatalogError> {
        self.get(index)?.to_stage_data()
    }
}
