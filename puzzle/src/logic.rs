use std::time::Duration;

use engine::GameLogic;
use serde::{Deserialize, Serialize};

use crate::catalog::StageCatalog;
use crate::coords::Vec2f;
use crate::grid::{CellGrid, StageData};
use crate::session::{CommandResult, GameEvent, PuzzleSession, Rejection};
use crate::settings::EngineSettings;
use crate::tools::ToolId;

/// Discrete player commands. Tool commands act on the selected tool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputAction {
    Noop,
    SelectTool { id: ToolId },
    SelectNextTool,
    MoveTo { x: f32, y: f32 },
    MoveBy { dx: i32, dy: i32 },
    RotateCw,
    RotateCcw,
    CopyOrPaste,
    Commit,
    Cancel,
    Undo,
    Redo,
    RecalculateProgress,
    Tick { ms: u64 },
    Restart,
}

#[derive(Debug, Clone)]
pub struct PuzzleLogic {
    stage: StageData,
    settings: EngineSettings,
}

impl PuzzleLogic {
    pub fn new(stage: StageData, settings: EngineSettings) -> Self {
        Self { stage, settings }
    }

    /// Stage `index` of `catalog`. A missing or empty stage falls back to an
    /// empty 1x1 board so the session stays usable.
    pub fn from_catalog(catalog: &StageCatalog, index: usize, settings: EngineSettings) -> Self {
        let stage = catalog.instantiate(index).unwrap_or_else(|e| {
            log::warn!("falling back to an empty stage: {e}");
            StageData::new("empty", CellGrid::new(1, 1), CellGrid::new(1, 1))
        });
        Self::new(stage, settings)
    }

    pub fn stage(&self) -> &StageData {
        &self.stage
    }
}

fn selected(session: &PuzzleSession) -> Result<ToolId, Rejection> {
    session.selected_tool().ok_or(Rejection::NoToolSelected)
}

pub fn apply_action(session: &mut PuzzleSession, action: InputAction) -> CommandResult {
    match action {
        InputAction::Noop => Ok(()),
        InputAction::SelectTool { id } => session.select_tool(id),
        InputAction::SelectNextTool => session.select_next_tool(),
        InputAction::MoveTo { x, y } => session.move_tool(selected(session)?, Vec2f::new(x, y)),
        InputAction::MoveBy { dx, dy } => session.move_tool_by_cells(selected(session)?, dx, dy),
        InputAction::RotateCw => session.rotate_step(selected(session)?, 1),
        InputAction::RotateCcw => session.rotate_step(selected(session)?, -1),
        InputAction::CopyOrPaste => session.begin_copy_or_paste(selected(session)?),
        InputAction::Commit => session.commit(selected(session)?),
        InputAction::Cancel => session.cancel(selected(session)?),
        InputAction::Undo => session.undo(),
        InputAction::Redo => session.redo(),
        InputAction::RecalculateProgress => {
            session.recalculate_progress();
            Ok(())
        }
        InputAction::Tick { ms } => {
            session.tick(Duration::from_millis(ms));
            Ok(())
        }
        InputAction::Restart => {
            session.restart();
            Ok(())
        }
    }
}

impl GameLogic for PuzzleLogic {
    type State = PuzzleSession;
    type Input = InputAction;
    type Event = GameEvent;

    fn initial_state(&self) -> Self::State {
        PuzzleSession::new(self.stage.clone(), self.settings.clone())
    }

    fn step(&self, state: &mut Self::State, input: Self::Input) -> Vec<Self::Event> {
        if let Err(reason) = apply_action(state, input) {
            log::debug!("{input:?} rejected: {reason}");
            state.push_event(GameEvent::Rejected { reason });
        }
        state.drain_events()
    }
}
