use std::time::Duration;

use puzzle::catalog::StageCatalog;
use puzzle::coords::{Vec2f, Vec2i};
use puzzle::gravity::{self, PushDirection};
use puzzle::grid::{CellGrid, Layer, StageData};
use puzzle::pattern::{self, PatternCell};
use puzzle::session::{GameEvent, PuzzleSession, Rejection};
use puzzle::settings::EngineSettings;
use puzzle::tools::{ToolKind, ToolSlot, ToolSpec, ToolState};

fn stage_3x3(tools: &[ToolSpec]) -> StageData {
    let mut stage = StageData::new("scenario", CellGrid::filled(3, 3, "."), CellGrid::new(3, 3));
    stage.set_cell(Layer::Rock, 1, 1, "#S");
    stage.tool_inventory = tools
        .iter()
        .zip(1..)
        .map(|(spec, id)| ToolSlot { id, spec: *spec })
        .collect();
    stage
}

fn selector(w: usize, h: usize) -> ToolSpec {
    ToolSpec::new(w, h, ToolKind::Selector)
}

#[test]
fn copy_then_paste_duplicates_the_rock() {
    let mut session = PuzzleSession::new(stage_3x3(&[selector(1, 1)]), EngineSettings::default());

    session.copy(1).expect("rock under the tool");
    let copied = session.tool(1).and_then(|t| t.pattern.clone()).expect("pattern held");
    assert_eq!(
        copied.cells,
        vec![PatternCell {
            offset: Vec2i::ZERO,
            value: "#S".to_string()
        }]
    );

    session.move_tool_by_cells(1, -1, -1).unwrap();
    assert_eq!(session.tool(1).map(|t| t.state), Some(ToolState::Placing));
    session.commit(1).expect("(0, 0) is free mass");

    let stage = session.stage();
    assert_eq!(stage.get_cell(Layer::Rock, 0, 0), "#S");
    assert_eq!(stage.get_cell(Layer::Rock, 1, 1), "#S");
    assert_eq!(stage.rock_count(), 2);
    assert!(!pattern::can_paste(stage, &copied, Vec2i::new(1, 1), 0));
}

#[test]
fn paste_onto_occupied_cell_is_rejected_without_side_effects() {
    let mut session = PuzzleSession::new(stage_3x3(&[selector(1, 1)]), EngineSettings::default());
    session.copy(1).unwrap();
    let before = session.stage().clone();

    assert_eq!(session.commit(1), Err(Rejection::InvalidPlacement));
    assert_eq!(session.stage(), &before);
    assert!(!session.history().can_undo());
    assert_eq!(session.tool(1).map(|t| t.state), Some(ToolState::Copied));
    assert!(session.events().iter().all(|e| !matches!(e, GameEvent::GridChanged)));
}

#[test]
fn cancel_drops_pattern_without_snapshot() {
    let mut session = PuzzleSession::new(stage_3x3(&[selector(1, 1)]), EngineSettings::default());
    session.copy(1).unwrap();
    session.cancel(1).unwrap();

    let tool = session.tool(1).unwrap();
    assert_eq!(tool.state, ToolState::Idle);
    assert!(tool.pattern.is_none());
    assert!(!session.history().can_undo());
}

#[test]
fn undo_and_redo_swap_whole_stage_including_inventory() {
    let mut session = PuzzleSession::new(stage_3x3(&[selector(1, 1)]), EngineSettings::default());
    let initial = session.stage().clone();

    session.copy(1).unwrap();
    session.move_tool_by_cells(1, 1, 0).unwrap();
    session.commit(1).unwrap();
    let after = session.stage().clone();
    assert!(after.tool_inventory.is_empty());
    assert!(session.tool(1).is_none());

    session.undo().unwrap();
    assert_eq!(session.stage(), &initial);
    assert_eq!(session.tool(1).map(|t| t.state), Some(ToolState::Idle));

    session.redo().unwrap();
    assert_eq!(session.stage(), &after);
    assert_eq!(session.redo(), Err(Rejection::NothingToRedo));

    session.undo().unwrap();
    assert_eq!(session.undo(), Err(Rejection::NothingToUndo));
}

#[test]
fn new_action_after_undo_discards_redo() {
    let spec = selector(1, 1);
    let mut session = PuzzleSession::new(stage_3x3(&[spec, spec]), EngineSettings::default());
    session.copy(1).unwrap();
    session.move_tool_by_cells(1, 1, 0).unwrap();
    session.commit(1).unwrap();
    session.undo().unwrap();
    assert!(session.history().can_redo());

    session.copy(2).unwrap();
    session.move_tool_by_cells(2, 0, 1).unwrap();
    session.commit(2).unwrap();
    assert!(!session.history().can_redo());
    assert_eq!(session.history().undo_len(), 1);
}

#[test]
fn gravity_commit_reports_the_moves_it_applied() {
    let mut stage = stage_3x3(&[ToolSpec::new(3, 3, ToolKind::Gravity)]);
    stage.set_cell(Layer::Rock, 0, 0, "#");
    let expected = gravity::compute_moves(
        &stage,
        puzzle::coords::SelectionBounds::new(0, 0, 2, 2),
        PushDirection::Up,
    );

    let mut session = PuzzleSession::new(stage, EngineSettings::default());
    session.commit(1).unwrap();

    let events = session.drain_events();
    assert_eq!(events[0], GameEvent::RocksMoved { moves: expected });
    assert!(events.contains(&GameEvent::ToolConsumed { tool: 1 }));
    assert_eq!(session.stage().get_cell(Layer::Rock, 0, 2), "#");
    assert_eq!(session.stage().get_cell(Layer::Rock, 1, 2), "#S");
    assert_eq!(session.stage().rock_count(), 2);
}

#[test]
fn rotated_gravity_pushes_right() {
    let mut stage = stage_3x3(&[ToolSpec::new(1, 3, ToolKind::Gravity)]);
    stage.set_cell(Layer::Rock, 0, 1, "#");
    let mut session = PuzzleSession::new(stage, EngineSettings::default());

    session.rotate_step(1, 1).unwrap();
    session.commit(1).unwrap();
    assert_eq!(session.stage().get_cell(Layer::Rock, 2, 1), "#S");
    assert_eq!(session.stage().get_cell(Layer::Rock, 1, 1), "#");
    assert_eq!(session.stage().get_cell(Layer::Rock, 0, 1), "");
}

#[test]
fn acquired_progress_survives_undo() {
    let catalog = StageCatalog::builtin();
    let mut session = PuzzleSession::from_catalog(&catalog, 0, EngineSettings::default()).unwrap();
    assert_eq!(session.progress().total(), 1);

    session.copy(1).unwrap();
    session.move_tool_by_cells(1, -1, 1).unwrap();
    session.commit(1).unwrap();
    let events = session.drain_events();
    assert!(events.contains(&GameEvent::ProgressAcquired { key: 'S', slot: 0 }));
    assert_eq!(events.last(), Some(&GameEvent::StageCleared));

    session.undo().unwrap();
    assert_eq!(session.stage().get_cell(Layer::Rock, 0, 2), "");
    assert!(session.is_cleared());
    assert_eq!(session.progress().acquired_count(), 1);

    // Redoing rematches an already-seen pair; nothing fires twice.
    session.drain_events();
    session.redo().unwrap();
    assert_eq!(session.drain_events(), vec![GameEvent::GridChanged]);
}

#[test]
fn restart_rebuilds_stage_progress_and_tools() {
    let catalog = StageCatalog::builtin();
    let mut session = PuzzleSession::from_catalog(&catalog, 0, EngineSettings::default()).unwrap();
    session.copy(1).unwrap();
    session.move_tool_by_cells(1, -1, 1).unwrap();
    session.commit(1).unwrap();
    assert!(session.is_cleared());

    session.restart();
    assert_eq!(session.stage(), &catalog.instantiate(0).unwrap());
    assert!(!session.is_cleared());
    assert!(!session.history().can_undo());
    assert_eq!(session.tools().count(), 2);
    assert_eq!(session.selected_tool(), Some(1));
}

#[test]
fn tick_picks_up_matches_present_at_load() {
    let mut stage = StageData::new("preset", CellGrid::filled(2, 1, ".H"), CellGrid::new(2, 1));
    stage.set_cell(Layer::Rock, 1, 0, "#H");
    let settings = EngineSettings {
        progress_scan_interval_ms: 50,
        ..EngineSettings::default()
    };
    let mut session = PuzzleSession::new(stage, settings);

    assert!(!session.tick(Duration::from_millis(30)));
    assert!(session.events().is_empty());
    assert!(session.tick(Duration::from_millis(30)));
    assert_eq!(
        session.drain_events(),
        vec![GameEvent::ProgressAcquired { key: 'H', slot: 0 }]
    );
    assert_eq!(session.recalculate_progress(), 0);
}

#[test]
fn world_moves_snap_with_anchor_and_scale() {
    let settings = EngineSettings {
        cell_scale: 2.0,
        ..EngineSettings::default()
    };
    let mut session = PuzzleSession::new(stage_3x3(&[selector(2, 2)]), settings)
        .with_anchor(Vec2f::new(10.0, 10.0));

    // Cell (0, 0) is centered at anchor - (width - 1) / 2 * scale.
    session.move_tool(1, Vec2f::new(8.4, 7.7)).unwrap();
    assert_eq!(session.tool(1).map(|t| t.position), Some(Vec2f::new(0.5, 0.5)));
    assert_eq!(session.tool_world_position(1), Some(Vec2f::new(9.0, 9.0)));

    session.move_tool(1, Vec2f::new(100.0, -100.0)).unwrap();
    assert_eq!(session.tool(1).map(|t| t.position), Some(Vec2f::new(1.5, 0.5)));
}

#[test]
fn preview_marks_blocked_targets() {
    let mut session = PuzzleSession::new(stage_3x3(&[selector(1, 1)]), EngineSettings::default());
    let idle = session.cell_preview_footprint(1);
    assert_eq!(idle.len(), 1);
    assert!(idle[0].can_place);

    session.copy(1).unwrap();
    let held = session.cell_preview_footprint(1);
    assert_eq!(held[0].pos, Vec2i::new(1, 1));
    assert!(!held[0].can_place);

    session.move_tool_by_cells(1, 1, 0).unwrap();
    assert!(session.cell_preview_footprint(1)[0].can_place);
    assert!(session.cell_preview_footprint(7).is_empty());
}

#[test]
fn history_limit_bounds_undo_depth() {
    let spec = ToolSpec::new(1, 1, ToolKind::Pickaxe);
    let mut stage = StageData::new("rocks", CellGrid::filled(3, 1, "."), CellGrid::filled(3, 1, "#"));
    stage.tool_inventory = (1..=3).map(|id| ToolSlot { id, spec }).collect();
    let settings = EngineSettings {
        history_limit: 2,
        ..EngineSettings::default()
    };
    let mut session = PuzzleSession::new(stage, settings);

    for id in 1..=3 {
        session.move_tool_by_cells(id, -1, 0).unwrap();
        session.move_tool_by_cells(id, id as i32 - 1, 0).unwrap();
        session.commit(id).unwrap();
    }
    assert_eq!(session.stage().rock_count(), 0);
    assert_eq!(session.history().undo_len(), 2);
    session.undo().unwrap();
    session.undo().unwrap();
    assert_eq!(session.stage().rock_count(), 2);
    assert_eq!(session.undo(), Err(Rejection::NothingToUndo));
}

#[test]
fn unknown_tools_are_rejected_everywhere() {
    let mut session = PuzzleSession::new(stage_3x3(&[]), EngineSettings::default());
    assert_eq!(session.copy(4), Err(Rejection::UnknownTool(4)));
    assert_eq!(session.commit(4), Err(Rejection::UnknownTool(4)));
    assert_eq!(session.rotate_step(4, 1), Err(Rejection::UnknownTool(4)));
    assert!(session.debug_view(4).is_none());
}
