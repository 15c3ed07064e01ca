//! Copy, rotate and paste of rock patterns. Rotation runs on doubled integer coordinates.

use serde::{Deserialize, Serialize};

use crate::cell;
use crate::coords::{SelectionBounds, Vec2i};
use crate::grid::{Layer, StageData};
use crate::tools::ROTATION_STATES;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternCell {
    pub offset: Vec2i,
    pub value: String,
}

/// Rock cells captured relative to a pivot, stored in the tool's unrotated
/// frame of `width` x `height`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopiedPattern {
    pub cells: Vec<PatternCell>,
    pub width: usize,
    pub height: usize,
}

impl CopiedPattern {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Offsets at `rotation`, in the same order as `cells`.
    pub fn rotated_offsets(&self, rotation: u8) -> Vec<Vec2i> {
        self.cells
            .iter()
            .map(|c| rotate_offset(c.offset, self.width, self.height, rotation))
            .collect()
    }

    /// `(target cell, value)` for a paste centered on `center`.
    pub fn placements(&self, center: Vec2i, rotation: u8) -> Vec<(Vec2i, &str)> {
        self.rotated_offsets(rotation)
            .into_iter()
            .zip(&self.cells)
            .map(|(offset, c)| (center + offset, c.value.as_str()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FootprintCell {
    pub pos: Vec2i,
    pub can_place: bool,
}

pub fn rotated_dims(width: usize, height: usize, rotation: u8) -> (usize, usize) {
    if rotation % 2 == 1 {
        (height, width)
    } else {
        (width, height)
    }
}

fn parity(size: usize) -> i32 {
    (size % 2 == 0) as i32
}

/// Rotates `offset`, measured in a `width` x `height` footprint, by
/// `rotation` clockwise quarter turns.
pub fn rotate_offset(offset: Vec2i, width: usize, height: usize, rotation: u8) -> Vec2i {
    let steps = rotation % ROTATION_STATES;
    if steps == 0 {
        return offset;
    }

    // Doubled coordinates relative to the geometric center.
    let x2 = 2 * offset.x + parity(width);
    let y2 = 2 * offset.y + parity(height);
    let (rx2, ry2) = match steps {
        1 => (y2, -x2),
        2 => (-x2, -y2),
        _ => (-y2, x2),
    };

    let (dst_w, dst_h) = rotated_dims(width, height, steps);
    Vec2i::new(
        (rx2 - parity(dst_w)).div_euclid(2),
        (ry2 - parity(dst_h)).div_euclid(2),
    )
}

/// Captures every Rock cell inside `bounds`.
///
/// `width`/`height` are the tool's unrotated size and `rotation` its current
/// orientation; offsets are de-rotated into the unrotated frame so any
/// rotation chosen at paste time applies cleanly. Returns `None` when the
/// selection holds no rock.
pub fn copy_pattern(
    stage: &StageData,
    bounds: SelectionBounds,
    center: Vec2i,
    width: usize,
    height: usize,
    rotation: u8,
) -> Option<CopiedPattern> {
    let rotation = rotation % ROTATION_STATES;
    let (eff_w, eff_h) = rotated_dims(width, height, rotation);
    let undo = (ROTATION_STATES - rotation) % ROTATION_STATES;

    let cells: Vec<PatternCell> = bounds
        .cells()
        .filter_map(|(x, y)| {
            let value = stage.get_cell(Layer::Rock, x, y);
            cell::is_rock(value).then(|| PatternCell {
                offset: rotate_offset(Vec2i::new(x, y) - center, eff_w, eff_h, undo),
                value: value.to_string(),
            })
        })
        .collect();

    if cells.is_empty() {
        return None;
    }
    Some(CopiedPattern {
        cells,
        width,
        height,
    })
}

/// Validity of every target cell, in pattern order.
pub fn paste_footprint(
    stage: &StageData,
    pattern: &CopiedPattern,
    center: Vec2i,
    rotation: u8,
) -> Vec<FootprintCell> {
    pattern
        .placements(center, rotation)
        .into_iter()
        .map(|(pos, _)| FootprintCell {
            pos,
            can_place: stage.can_hold_rock(pos.x, pos.y),
        })
        .collect()
}

/// True only if every target is in bounds, on `.` Mass and free of Rock.
pub fn can_paste(stage: &StageData, pattern: &CopiedPattern, center: Vec2i, rotation: u8) -> bool {
    !pattern.is_empty()
        && pattern
            .placements(center, rotation)
            .iter()
            .all(|(pos, _)| stage.can_hold_rock(pos.x, pos.y))
}

/// Writes the captured cell strings. Callers validate with [`can_paste`]
/// first; targets past the grid edge grow the grid.
pub fn apply_paste(
    stage: &mut StageData,
    pattern: &CopiedPattern,
    center: Vec2i,
    rotation: u8,
) -> Vec<Vec2i> {
    let placements: Vec<(Vec2i, String)> = pattern
        .placements(center, rotation)
        .into_iter()
        .map(|(pos, value)| (pos, value.to_string()))
        .collect();

    let mut placed = Vec::with_capacity(placements.len());
    for (pos, value) in placements {
        if stage.set_cell(Layer::Rock, pos.x, pos.y, value) {
            placed.push(pos);
        }
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::compute_selection_bounds;
    use crate::grid::CellGrid;

    fn stage(w: usize, h: usize) -> StageData {
        StageData::new("t", CellGrid::filled(w, h, "."), CellGrid::new(w, h))
    }

    #[test]
    fn quarter_turn_formulas_on_odd_footprint() {
        let o = Vec2i::new(1, 0);
        assert_eq!(rotate_offset(o, 3, 3, 1), Vec2i::new(0, -1));
        assert_eq!(rotate_offset(o, 3, 3, 2), Vec2i::new(-1, 0));
        assert_eq!(rotate_offset(o, 3, 3, 3), Vec2i::new(0, 1));
        assert_eq!(rotate_offset(o, 3, 3, 4), o);
    }

    #[test]
    fn even_footprint_maps_onto_itself() {
        // 2x2 offsets are {-1, 0} on both axes.
        let cells = [(-1, -1), (0, -1), (-1, 0), (0, 0)];
        for &(x, y) in &cells {
            let r = rotate_offset(Vec2i::new(x, y), 2, 2, 1);
            assert!(cells.contains(&(r.x, r.y)), "({x},{y}) -> {r:?}");
        }
        assert_eq!(rotate_offset(Vec2i::new(-1, 0), 2, 2, 1), Vec2i::new(0, 0));
    }

    #[test]
    fn mixed_parity_rotation_swaps_extents() {
        // 2 wide, 1 tall: offsets x in {-1, 0}.
        assert_eq!(rotate_offset(Vec2i::new(-1, 0), 2, 1, 1), Vec2i::new(0, 0));
        assert_eq!(rotate_offset(Vec2i::new(0, 0), 2, 1, 1), Vec2i::new(0, -1));
    }

    #[test]
    fn single_cell_copy_then_paste_elsewhere() {
        let mut s = stage(3, 3);
        s.set_cell(Layer::Rock, 1, 1, "#S");

        let bounds = compute_selection_bounds(1.0, 1.0, 1, 1);
        let pattern = copy_pattern(&s, bounds, Vec2i::new(1, 1), 1, 1, 0).unwrap();
        assert_eq!(
            pattern.cells,
            vec![PatternCell {
                offset: Vec2i::ZERO,
                value: "#S".to_string()
            }]
        );

        assert!(can_paste(&s, &pattern, Vec2i::new(0, 0), 0));
        apply_paste(&mut s, &pattern, Vec2i::new(0, 0), 0);
        assert_eq!(s.get_cell(Layer::Rock, 0, 0), "#S");
        assert_eq!(s.rock_count(), 2);
        assert!(!can_paste(&s, &pattern, Vec2i::new(1, 1), 0));
    }

    #[test]
    fn copy_of_empty_selection_is_none() {
        let s = stage(2, 2);
        let bounds = compute_selection_bounds(0.5, 0.5, 2, 2);
        assert!(copy_pattern(&s, bounds, Vec2i::new(1, 1), 2, 2, 0).is_none());
    }

    #[test]
    fn copy_while_rotated_is_stored_unrotated() {
        let mut s = stage(4, 4);
        // 3 wide x 1 tall tool turned a quarter: covers x=1, y=0..=2.
        s.set_cell(Layer::Rock, 1, 2, "#");
        let bounds = compute_selection_bounds(1.0, 1.0, 1, 3);
        let pattern = copy_pattern(&s, bounds, Vec2i::new(1, 1), 3, 1, 1).unwrap();
        assert_eq!((pattern.width, pattern.height), (3, 1));
        assert_eq!(pattern.cells[0].offset, Vec2i::new(-1, 0));
        // Re-applying the same rotation lands on the original cell.
        assert_eq!(pattern.rotated_offsets(1)[0], Vec2i::new(0, 1));
    }

    #[test]
    fn paste_rejects_holes_rocks_and_edges() {
        let mut s = stage(3, 1);
        s.set_cell(Layer::Mass, 2, 0, "");
        let pattern = CopiedPattern {
            cells: vec![
                PatternCell { offset: Vec2i::new(0, 0), value: "#".into() },
                PatternCell { offset: Vec2i::new(1, 0), value: "#".into() },
            ],
            width: 2,
            height: 1,
        };
        assert!(can_paste(&s, &pattern, Vec2i::new(0, 0), 0));
        assert!(!can_paste(&s, &pattern, Vec2i::new(1, 0), 0));
        assert!(!can_paste(&s, &pattern, Vec2i::new(-1, 0), 0));

        let footprint = paste_footprint(&s, &pattern, Vec2i::new(1, 0), 0);
        assert_eq!(
            footprint.iter().map(|c| c.can_place).collect::<Vec<_>>(),
            vec![true, false]
        );
    }
}
