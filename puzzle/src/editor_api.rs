use engine::agent::{AgentCommand, AgentHost, AgentResponse};
use engine::editor::{
    EditorAction, EditorGrid, EditorHistory, EditorManifest, EditorPaletteEntry, EditorSnapshot,
    EditorStat, GridOrigin,
};

use crate::catalog::StageCatalog;
use crate::cell;
use crate::logic::{InputAction, PuzzleLogic};
use crate::session::{GameEvent, PuzzleSession};
use crate::settings::EngineSettings;
use crate::tools::ToolId;

const EDITOR_TITLE: &str = "Rockpaste";

#[derive(Debug, thiserror::Error)]
pub enum EditorApiError {
    #[error("unknown actionId: {0}")]
    UnknownActionId(String),
    #[error("action {action} needs argument '{name}'")]
    MissingArgument { action: String, name: &'static str },
}

/// `(id, label, argument names)`.
const ACTION_SPECS: &[(&str, &str, &[&str])] = &[
    ("noop", "Noop", &[]),
    ("selectTool", "Select Tool", &["id"]),
    ("selectNextTool", "Next Tool", &[]),
    ("moveTo", "Move To", &["x", "y"]),
    ("moveLeft", "Left", &[]),
    ("moveRight", "Right", &[]),
    ("moveUp", "Up", &[]),
    ("moveDown", "Down", &[]),
    ("rotateCw", "Rotate CW", &[]),
    ("rotateCcw", "Rotate CCW", &[]),
    ("copyOrPaste", "Copy / Paste", &[]),
    ("commit", "Commit", &[]),
    ("cancel", "Cancel", &[]),
    ("undo", "Undo", &[]),
    ("redo", "Redo", &[]),
    ("recalculateProgress", "Rescan Progress", &[]),
    ("tick", "Tick", &["ms"]),
    ("restart", "Restart", &[]),
];

pub fn default_manifest() -> EditorManifest {
    EditorManifest {
        title: EDITOR_TITLE.to_string(),
        actions: ACTION_SPECS
            .iter()
            .map(|(id, label, args)| EditorAction {
                id: (*id).to_string(),
                label: (*label).to_string(),
                args: args.iter().map(|a| (*a).to_string()).collect(),
            })
            .collect(),
    }
}

pub fn action_from_id(id: &str, args: &[f64]) -> Result<InputAction, EditorApiError> {
    let Some((_, _, names)) = ACTION_SPECS.iter().find(|(action_id, _, _)| *action_id == id) else {
        return Err(EditorApiError::UnknownActionId(id.to_string()));
    };
    let arg = |i: usize| {
        args.get(i).copied().ok_or_else(|| EditorApiError::MissingArgument {
            action: id.to_string(),
            name: names.get(i).copied().unwrap_or("arg"),
        })
    };

    let action = match id {
        "noop" => InputAction::Noop,
        "selectTool" => InputAction::SelectTool {
            id: arg(0)?.max(0.0) as ToolId,
        },
        "selectNextTool" => InputAction::SelectNextTool,
        "moveTo" => InputAction::MoveTo {
            x: arg(0)? as f32,
            y: arg(1)? as f32,
        },
        "moveLeft" => InputAction::MoveBy { dx: -1, dy: 0 },
        "moveRight" => InputAction::MoveBy { dx: 1, dy: 0 },
        "moveUp" => InputAction::MoveBy { dx: 0, dy: 1 },
        "moveDown" => InputAction::MoveBy { dx: 0, dy: -1 },
        "rotateCw" => InputAction::RotateCw,
        "rotateCcw" => InputAction::RotateCcw,
        "copyOrPaste" => InputAction::CopyOrPaste,
        "commit" => InputAction::Commit,
        "cancel" => InputAction::Cancel,
        "undo" => InputAction::Undo,
        "redo" => InputAction::Redo,
        "recalculateProgress" => InputAction::RecalculateProgress,
        "tick" => InputAction::Tick {
            ms: arg(0)?.max(0.0) as u64,
        },
        "restart" => InputAction::Restart,
        _ => return Err(EditorApiError::UnknownActionId(id.to_string())),
    };
    Ok(action)
}

pub struct EditorSession {
    host: AgentHost<PuzzleLogic>,
}

impl EditorSession {
    pub fn new(catalog: &StageCatalog, stage_index: usize, settings: EngineSettings) -> Self {
        Self::from_logic(PuzzleLogic::from_catalog(catalog, stage_index, settings))
    }

    pub fn from_logic(logic: PuzzleLogic) -> Self {
        Self {
            host: AgentHost::new(logic),
        }
    }

    pub fn manifest(&self) -> EditorManifest {
        default_manifest()
    }

    pub fn history(&self) -> EditorHistory {
        let runner = self.host.runner();
        let history = runner.state().history();
        EditorHistory {
            step: runner.steps(),
            undo_len: history.undo_len(),
            redo_len: history.redo_len(),
            can_undo: history.can_undo(),
            can_redo: history.can_redo(),
        }
    }

    pub fn state(&mut self) -> EditorSnapshot {
        self.respond(AgentCommand::GetState)
    }

    pub fn step(&mut self, action_id: &str, args: &[f64]) -> Result<EditorSnapshot, EditorApiError> {
        let action = action_from_id(action_id, args)?;
        Ok(self.respond(AgentCommand::Step(action)))
    }

    pub fn reset(&mut self) -> EditorSnapshot {
        self.respond(AgentCommand::Reset)
    }

    /// Events emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        match self.host.handle(AgentCommand::DrainEvents) {
            AgentResponse::Events { events, .. } => events,
            AgentResponse::State { .. } => Vec::new(),
        }
    }

    fn respond(&mut self, command: AgentCommand<InputAction>) -> EditorSnapshot {
        match self.host.handle(command) {
            AgentResponse::State { step, state } => snapshot_from_state(step, &state),
            AgentResponse::Events { .. } => {
                let runner = self.host.runner();
                snapshot_from_state(runner.steps(), runner.state())
            }
        }
    }
}

pub fn snapshot_from_state(step: usize, session: &PuzzleSession) -> EditorSnapshot {
    let state = serde_json::to_value(session).unwrap_or_else(|e| {
        log::warn!("session state is not serializable: {e}");
        serde_json::Value::Null
    });

    let (width, height) = session.grid_dimensions();
    let progress = session.progress();
    let mut stats = vec![
        stat("stage", &session.stage().name),
        stat("size", format!("{width}x{height}")),
        stat("rocks", session.stage().rock_count()),
        stat(
            "progress",
            format!("{}/{}", progress.acquired_count(), progress.total()),
        ),
        stat("cleared", session.is_cleared()),
        stat("toolsLeft", session.tools().count()),
        stat("undo", session.history().undo_len()),
        stat("redo", session.history().redo_len()),
    ];

    let view = session.selected_tool().and_then(|id| session.debug_view(id));
    match view {
        Some(view) => stats.extend([
            stat("tool", format!("{} {}", view.id, view.kind.label())),
            stat("toolState", format!("{:?}", view.state)),
            stat("rotation", view.rotation),
            stat(
                "bounds",
                format!(
                    "({}, {})..({}, {})",
                    view.bounds.min_x, view.bounds.min_y, view.bounds.max_x, view.bounds.max_y
                ),
            ),
            stat("copiedCells", view.copied_cells),
        ]),
        None => stats.push(stat("tool", "-")),
    }

    EditorSnapshot {
        step,
        state,
        stats,
        grids: vec![
            layer_grid("mass", session.stage().mass_grid.rows(), mass_value),
            layer_grid("rock", session.stage().rock_grid.rows(), rock_value),
            preview_grid(session),
        ],
    }
}

fn stat(label: impl Into<String>, value: impl ToString) -> EditorStat {
    EditorStat {
        label: label.into(),
        value: value.to_string(),
    }
}

const EMPTY: u8 = 0;
const MASS: u8 = 1;
const MASS_TARGET: u8 = 2;
const ROCK: u8 = 3;
const ROCK_KEYED: u8 = 4;
const PLACEABLE: u8 = 5;
const BLOCKED: u8 = 6;

fn mass_value(value: &str) -> u8 {
    let parsed = cell::parse(value);
    match (parsed.is_mass(), parsed.keys.is_empty()) {
        (false, _) => EMPTY,
        (true, true) => MASS,
        (true, false) => MASS_TARGET,
    }
}

fn rock_value(value: &str) -> u8 {
    let parsed = cell::parse(value);
    match (parsed.is_rock(), parsed.keys.is_empty()) {
        (false, _) => EMPTY,
        (true, true) => ROCK,
        (true, false) => ROCK_KEYED,
    }
}

fn layer_grid(name: &str, rows: &[Vec<String>], value: fn(&str) -> u8) -> EditorGrid {
    EditorGrid {
        name: name.to_string(),
        origin: GridOrigin::BottomLeft,
        cells: rows
            .iter()
            .map(|row| row.iter().map(|c| value(c)).collect())
            .collect(),
        palette: Some(palette()),
    }
}

/// The selected tool's footprint over an empty board.
fn preview_grid(session: &PuzzleSession) -> EditorGrid {
    let (width, height) = session.grid_dimensions();
    let mut cells = vec![vec![EMPTY; width]; height];
    if let Some(id) = session.selected_tool() {
        for cell in session.cell_preview_footprint(id) {
            let (x, y) = (cell.pos.x, cell.pos.y);
            if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
                continue;
            }
            cells[y as usize][x as usize] = if cell.can_place { PLACEABLE } else { BLOCKED };
        }
    }
    EditorGrid {
        name: "preview".to_string(),
        origin: GridOrigin::BottomLeft,
        cells,
        palette: Some(palette()),
    }
}

fn palette() -> Vec<EditorPaletteEntry> {
    [
        (EMPTY, [16, 16, 20, 255], "empty"),
        (MASS, [96, 84, 70, 255], "mass"),
        (MASS_TARGET, [196, 160, 64, 255], "target"),
        (ROCK, [130, 130, 140, 255], "rock"),
        (ROCK_KEYED, [90, 170, 220, 255], "keyed rock"),
        (PLACEABLE, [80, 200, 120, 160], "placeable"),
        (BLOCKED, [220, 70, 70, 160], "blocked"),
    ]
    .into_iter()
    .map(|(value, rgba, label)| EditorPaletteEntry {
        value,
        rgba,
        label: Some(label.to_string()),
    })
    .collect()
}
