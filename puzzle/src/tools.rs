//! The three selection tools (copy/paste selector, pickaxe, gravity) and
//! their runtime state.

use serde::{Deserialize, Serialize};

use crate::coords::{SelectionBounds, Vec2f, Vec2i, center_cell, compute_selection_bounds};
use crate::pattern::{CopiedPattern, rotated_dims};

pub type ToolId = u32;

/// Number of discrete orientations (0, 90, 180, 270 degrees clockwise).
pub const ROTATION_STATES: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolKind {
    /// Copies a rock pattern and pastes it elsewhere.
    Selector,
    /// Destroys every rock in its footprint.
    Pickaxe,
    /// Pushes every rock in its footprint toward the edge it faces.
    Gravity,
}

impl ToolKind {
    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Selector => "selector",
            ToolKind::Pickaxe => "pickaxe",
            ToolKind::Gravity => "gravity",
        }
    }
}

/// Inventory entry as authored in a stage asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    pub width: usize,
    pub height: usize,
    #[serde(rename = "type")]
    pub kind: ToolKind,
}

impl ToolSpec {
    pub fn new(width: usize, height: usize, kind: ToolKind) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSlot {
    pub id: ToolId,
    pub spec: ToolSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolState {
    Idle,
    /// A pattern was just captured and the tool hasn't moved since.
    Copied,
    /// Carrying a pattern to a new spot.
    Placing,
}

/// Rotation direction for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationDir {
    Cw,
    Ccw,
}

impl RotationDir {
    pub fn from_sign(sign: i32) -> Option<Self> {
        match sign.signum() {
            1 => Some(RotationDir::Cw),
            -1 => Some(RotationDir::Ccw),
            _ => None,
        }
    }

    fn apply(self, rotation: u8) -> u8 {
        match self {
            RotationDir::Cw => (rotation + 1) % ROTATION_STATES,
            RotationDir::Ccw => (rotation + ROTATION_STATES - 1) % ROTATION_STATES,
        }
    }
}

/// A tool picked up from the inventory.
///
/// `position` is the footprint center in fractional grid coordinates;
/// world positions are converted at the session boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub id: ToolId,
    pub spec: ToolSpec,
    pub position: Vec2f,
    pub rotation: u8,
    pub state: ToolState,
    pub pattern: Option<CopiedPattern>,
}

impl Tool {
    pub fn new(slot: ToolSlot, position: Vec2f) -> Self {
        Self {
            id: slot.id,
            spec: slot.spec,
            position,
            rotation: 0,
            state: ToolState::Idle,
            pattern: None,
        }
    }

    /// Footprint size at the current rotation.
    pub fn footprint_dims(&self) -> (usize, usize) {
        rotated_dims(self.spec.width, self.spec.height, self.rotation)
    }

    pub fn selection_bounds(&self) -> SelectionBounds {
        let (w, h) = self.footprint_dims();
        compute_selection_bounds(self.position.x, self.position.y, w, h)
    }

    pub fn center_cell(&self) -> Vec2i {
        center_cell(self.position.x, self.position.y)
    }

    pub fn rotate(&mut self, dir: RotationDir) {
        self.rotation = dir.apply(self.rotation);
        self.mark_moved();
    }

    pub fn mark_moved(&mut self) {
        if self.state == ToolState::Copied {
            self.state = ToolState::Placing;
        }
    }

    pub fn hold_pattern(&mut self, pattern: CopiedPattern) {
        self.pattern = Some(pattern);
        self.state = ToolState::Copied;
    }

    pub fn drop_pattern(&mut self) -> Option<CopiedPattern> {
        self.state = ToolState::Idle;
        self.pattern.take()
    }
}
