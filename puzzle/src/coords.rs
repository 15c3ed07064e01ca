//! World <-> grid mapping and the footprint math shared by every tool.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vec2i {
    pub x: i32,
    pub y: i32,
}

impl Vec2i {
    pub const ZERO: Vec2i = Vec2i { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2i {
    type Output = Vec2i;

    fn add(self, rhs: Vec2i) -> Self::Output {
        Vec2i::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2i {
    type Output = Vec2i;

    fn sub(self, rhs: Vec2i) -> Self::Output {
        Vec2i::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2f {
    pub x: f32,
    pub y: f32,
}

impl Vec2f {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Rounds `.5` upward on both sides of zero.
///
/// Footprint centers of even-sized tools sit on `k + 0.5`; rounding up picks
/// the upper-middle cell, which keeps offsets in `-n/2 ..= n/2 - 1`.
pub fn round_half_up(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

/// Inclusive cell rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl SelectionBounds {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> i32 {
        (self.max_x - self.min_x + 1).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.max_y - self.min_y + 1).max(0)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Bottom row first, left to right.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let (min_x, max_x) = (self.min_x, self.max_x);
        (self.min_y..=self.max_y).flat_map(move |y| (min_x..=max_x).map(move |x| (x, y)))
    }

    /// Intersection with a `width` x `height` grid, or `None` if they don't overlap.
    pub fn clipped_to(&self, width: usize, height: usize) -> Option<SelectionBounds> {
        let clipped = SelectionBounds {
            min_x: self.min_x.max(0),
            min_y: self.min_y.max(0),
            max_x: self.max_x.min(width as i32 - 1),
            max_y: self.max_y.min(height as i32 - 1),
        };
        (clipped.min_x <= clipped.max_x && clipped.min_y <= clipped.max_y).then_some(clipped)
    }
}

/// The footprint of a `tool_width` x `tool_height` tool centered at a
/// fractional grid coordinate. Every caller that needs a tool's rectangle
/// goes through here.
pub fn compute_selection_bounds(
    center_x: f32,
    center_y: f32,
    tool_width: usize,
    tool_height: usize,
) -> SelectionBounds {
    let half_w = (tool_width.max(1) as f32 - 1.0) / 2.0;
    let half_h = (tool_height.max(1) as f32 - 1.0) / 2.0;
    SelectionBounds {
        min_x: round_half_up(center_x - half_w),
        min_y: round_half_up(center_y - half_h),
        max_x: round_half_up(center_x + half_w),
        max_y: round_half_up(center_y + half_h),
    }
}

/// The cell that offsets of a footprint are measured from.
pub fn center_cell(center_x: f32, center_y: f32) -> Vec2i {
    Vec2i::new(round_half_up(center_x), round_half_up(center_y))
}

fn snap_axis(v: f32, size: usize) -> f32 {
    if size % 2 == 1 {
        v.round()
    } else {
        v.floor() + 0.5
    }
}

fn clamp_axis(v: f32, grid: usize, size: usize) -> f32 {
    let grid = grid as f32;
    let size = size.max(1) as f32;
    if size > grid {
        return (grid - 1.0) / 2.0;
    }
    let lo = -0.5 + size / 2.0;
    let hi = grid - 0.5 - size / 2.0;
    v.clamp(lo, hi)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridTransform {
    pub anchor: Vec2f,
    pub width: usize,
    pub height: usize,
}

impl GridTransform {
    pub fn new(anchor: Vec2f, width: usize, height: usize) -> Self {
        Self {
            anchor,
            width,
            height,
        }
    }

    /// Offset of cell `(0, 0)` from the anchor, in cells.
    pub fn origin_offset(&self) -> Vec2f {
        Vec2f::new(
            -(self.width as f32 - 1.0) / 2.0,
            -(self.height as f32 - 1.0) / 2.0,
        )
    }

    pub fn grid_to_world(&self, gx: f32, gy: f32, scale: f32) -> Vec2f {
        let origin = self.origin_offset();
        Vec2f::new(
            self.anchor.x + (origin.x + gx) * scale,
            self.anchor.y + (origin.y + gy) * scale,
        )
    }

    pub fn world_to_grid_float(&self, world: Vec2f, scale: f32) -> Vec2f {
        let origin = self.origin_offset();
        let scale = if scale.abs() > f32::EPSILON { scale } else { 1.0 };
        Vec2f::new(
            (world.x - self.anchor.x) / scale - origin.x,
            (world.y - self.anchor.y) / scale - origin.y,
        )
    }

    pub fn world_to_grid_index(&self, world: Vec2f, scale: f32) -> Vec2i {
        let g = self.world_to_grid_float(world, scale);
        center_cell(g.x, g.y)
    }

    /// Odd tool dimensions snap to cell centers, even ones to cell boundaries.
    pub fn snap_to_grid(&self, world: Vec2f, tool_width: usize, tool_height: usize, scale: f32) -> Vec2f {
        let g = self.world_to_grid_float(world, scale);
        self.grid_to_world(snap_axis(g.x, tool_width), snap_axis(g.y, tool_height), scale)
    }

    /// Snap then clamp, done in grid space so the result lands exactly on a
    /// cell center or boundary. Returns a fractional grid position.
    pub fn fit_footprint(&self, g: Vec2f, tool_width: usize, tool_height: usize) -> Vec2f {
        let fit = |v: f32, grid: usize, size: usize| {
            snap_axis(clamp_axis(snap_axis(v, size), grid, size), size)
        };
        Vec2f::new(
            fit(g.x, self.width, tool_width),
            fit(g.y, self.height, tool_height),
        )
    }

    /// World position to a tool position, fitted with [`Self::fit_footprint`].
    pub fn place_tool(&self, world: Vec2f, tool_width: usize, tool_height: usize, scale: f32) -> Vec2f {
        self.fit_footprint(self.world_to_grid_float(world, scale), tool_width, tool_height)
    }

    /// Keeps the whole footprint inside `[-0.5, size - 0.5]` on each axis.
    /// A tool larger than the grid on an axis is centered on that axis.
    pub fn clamp_to_grid(&self, world: Vec2f, tool_width: usize, tool_height: usize, scale: f32) -> Vec2f {
        let g = self.world_to_grid_float(world, scale);
        self.grid_to_world(
            clamp_axis(g.x, self.width, tool_width),
            clamp_axis(g.y, self.height, tool_height),
            scale,
        )
    }
}
