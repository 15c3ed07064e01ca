//! Discrete gravity: compacts the rocks of a rectangle toward one edge.
//!
//! Move lists are computed against an unmodified grid and applied in a
//! separate step, so a presentation layer can animate the exact moves that
//! the commit will perform.

use serde::{Deserialize, Serialize};

use crate::coords::{SelectionBounds, Vec2i};
use crate::grid::{Layer, StageData};

/// Push direction; discriminants match the tool rotation index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PushDirection {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl PushDirection {
    pub fn from_rotation(rotation: u8) -> Self {
        match rotation % 4 {
            0 => PushDirection::Up,
            1 => PushDirection::Right,
            2 => PushDirection::Down,
            _ => PushDirection::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RockMoveInfo {
    pub from: Vec2i,
    pub to: Vec2i,
}

/// Lines perpendicular to the push, each ordered from the pushed edge inward.
fn lines(bounds: SelectionBounds, dir: PushDirection) -> Vec<Vec<Vec2i>> {
    let SelectionBounds {
        min_x,
        min_y,
        max_x,
        max_y,
    } = bounds;
    match dir {
        PushDirection::Up => (min_x..=max_x)
            .map(|x| (min_y..=max_y).rev().map(|y| Vec2i::new(x, y)).collect())
            .collect(),
        PushDirection::Down => (min_x..=max_x)
            .map(|x| (min_y..=max_y).map(|y| Vec2i::new(x, y)).collect())
            .collect(),
        PushDirection::Right => (min_y..=max_y)
            .map(|y| (min_x..=max_x).rev().map(|x| Vec2i::new(x, y)).collect())
            .collect(),
        PushDirection::Left => (min_y..=max_y)
            .map(|y| (min_x..=max_x).map(|x| Vec2i::new(x, y)).collect())
            .collect(),
    }
}

/// Computes where every rock in `bounds` comes to rest when pushed toward
/// `dir`. Relative order along each line is preserved. Cells without `.`
/// Mass can't hold a rock and are passed over; a rock with no valid landing
/// cell between the edge and itself stays where it is.
pub fn compute_moves(stage: &StageData, bounds: SelectionBounds, dir: PushDirection) -> Vec<RockMoveInfo> {
    let (width, height) = stage.dimensions();
    let Some(bounds) = bounds.clipped_to(width, height) else {
        return Vec::new();
    };

    let mut moves = Vec::new();
    for line in lines(bounds, dir) {
        let mut cursor = 0usize;
        for (i, &pos) in line.iter().enumerate() {
            if !stage.is_rock(pos.x, pos.y) {
                continue;
            }
            let landing = (cursor..=i).find(|&t| stage.is_mass(line[t].x, line[t].y));
            match landing {
                Some(t) => {
                    if t != i {
                        moves.push(RockMoveInfo {
                            from: pos,
                            to: line[t],
                        });
                    }
                    cursor = t + 1;
                }
                None => cursor = i + 1,
            }
        }
    }
    moves
}

/// Clears every source first, then writes every destination, so chained
/// moves inside one line never overwrite each other.
pub fn apply_moves(stage: &mut StageData, moves: &[RockMoveInfo]) {
    let values: Vec<String> = moves
        .iter()
        .map(|m| stage.get_cell(Layer::Rock, m.from.x, m.from.y).to_string())
        .collect();
    for m in moves {
        stage.rock_grid.clear(m.from.x, m.from.y);
    }
    for (m, value) in moves.iter().zip(values) {
        stage.set_cell(Layer::Rock, m.to.x, m.to.y, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellGrid;

    fn column_stage(rocks: &[(i32, &str)], height: usize) -> StageData {
        let mut s = StageData::new("t", CellGrid::filled(1, height, "."), CellGrid::new(1, height));
        for &(y, v) in rocks {
            s.set_cell(Layer::Rock, 0, y, v);
        }
        s
    }

    fn full(s: &StageData) -> SelectionBounds {
        let (w, h) = s.dimensions();
        SelectionBounds::new(0, 0, w as i32 - 1, h as i32 - 1)
    }

    #[test]
    fn push_up_compacts_toward_top_preserving_order() {
        let mut s = column_stage(&[(0, "#A"), (2, "#B")], 5);
        let moves = compute_moves(&s, full(&s), PushDirection::Up);
        assert_eq!(
            moves,
            vec![
                RockMoveInfo { from: Vec2i::new(0, 2), to: Vec2i::new(0, 4) },
                RockMoveInfo { from: Vec2i::new(0, 0), to: Vec2i::new(0, 3) },
            ]
        );
        apply_moves(&mut s, &moves);
        assert_eq!(s.get_cell(Layer::Rock, 0, 4), "#B");
        assert_eq!(s.get_cell(Layer::Rock, 0, 3), "#A");
        assert_eq!(s.rock_count(), 2);
    }

    #[test]
    fn holes_are_skipped_as_landing_cells() {
        let mut s = column_stage(&[(0, "#")], 4);
        s.set_cell(Layer::Mass, 0, 3, "");
        let moves = compute_moves(&s, full(&s), PushDirection::Up);
        assert_eq!(moves, vec![RockMoveInfo { from: Vec2i::new(0, 0), to: Vec2i::new(0, 2) }]);
    }

    #[test]
    fn stranded_rock_without_landing_stays() {
        let mut s = column_stage(&[(1, "#")], 2);
        s.set_cell(Layer::Mass, 0, 1, "");
        assert!(compute_moves(&s, full(&s), PushDirection::Up).is_empty());
    }

    #[test]
    fn push_left_moves_within_rect_only() {
        let mut s = StageData::new("t", CellGrid::filled(4, 1, "."), CellGrid::new(4, 1));
        s.set_cell(Layer::Rock, 3, 0, "#");
        s.set_cell(Layer::Rock, 2, 0, "#");
        let moves = compute_moves(&s, SelectionBounds::new(1, 0, 3, 0), PushDirection::Left);
        apply_moves(&mut s, &moves);
        assert_eq!(s.get_cell(Layer::Rock, 0, 0), "");
        assert_eq!(s.get_cell(Layer::Rock, 1, 0), "#");
        assert_eq!(s.get_cell(Layer::Rock, 2, 0), "#");
        assert_eq!(s.get_cell(Layer::Rock, 3, 0), "");
    }

    #[test]
    fn second_push_is_a_fixed_point() {
        let mut s = column_stage(&[(1, "#"), (3, "#")], 6);
        let first = compute_moves(&s, full(&s), PushDirection::Down);
        assert!(!first.is_empty());
        apply_moves(&mut s, &first);
        assert!(compute_moves(&s, full(&s), PushDirection::Down).is_empty());
    }

    #[test]
    fn rotation_index_maps_to_direction() {
        assert_eq!(PushDirection::from_rotation(0), PushDirection::Up);
        assert_eq!(PushDirection::from_rotation(1), PushDirection::Right);
        assert_eq!(PushDirection::from_rotation(6), PushDirection::Down);
        assert_eq!(PushDirection::from_rotation(3), PushDirection::Left);
    }
}
