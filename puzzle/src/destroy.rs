use crate::cell;
use crate::coords::{SelectionBounds, Vec2i};
use crate::grid::StageData;

/// Rock cells inside `bounds`, bottom row first.
pub fn rocks_in(stage: &StageData, bounds: SelectionBounds) -> Vec<Vec2i> {
    bounds
        .cells()
        .filter(|&(x, y)| stage.is_rock(x, y))
        .map(|(x, y)| Vec2i::new(x, y))
        .collect()
}

/// Clears every Rock cell in `bounds` to empty and returns their positions.
/// Mass is untouched; non-Rock strings in the Rock layer are left alone.
pub fn destroy_rocks(stage: &mut StageData, bounds: SelectionBounds) -> Vec<Vec2i> {
    let removed = rocks_in(stage, bounds);
    for pos in &removed {
        debug_assert!(cell::is_rock(stage.rock_grid.get(pos.x, pos.y)));
        stage.rock_grid.clear(pos.x, pos.y);
    }
    removed
}
