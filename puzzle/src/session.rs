use std::collections::BTreeMap;
use std::ops::Bound;
use std::time::Duration;

use engine::{History, IntervalTicker};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogError, StageCatalog};
use crate::coords::{GridTransform, SelectionBounds, Vec2f, Vec2i};
use crate::destroy;
use crate::gravity::{self, PushDirection, RockMoveInfo};
use crate::grid::StageData;
use crate::pattern::{self, FootprintCell};
use crate::progress::{ProgressEvent, ProgressMonitor};
use crate::settings::EngineSettings;
use crate::tools::{RotationDir, Tool, ToolId, ToolKind, ToolState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    GridChanged,
    PatternCopied { tool: ToolId, cells: usize },
    ProgressAcquired { key: char, slot: usize },
    StageCleared,
    RocksMoved { moves: Vec<RockMoveInfo> },
    RocksDestroyed { positions: Vec<Vec2i> },
    ToolConsumed { tool: ToolId },
    Rejected { reason: Rejection },
}

impl From<ProgressEvent> for GameEvent {
    fn from(event: ProgressEvent) -> Self {
        match event {
            ProgressEvent::Acquired { key, slot } => GameEvent::ProgressAcquired { key, slot },
            ProgressEvent::StageCleared => GameEvent::StageCleared,
        }
    }
}

/// Why a command left the session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
pub enum Rejection {
    #[error("no tool with id {0} in the inventory")]
    UnknownTool(ToolId),
    #[error("no tool is selected")]
    NoToolSelected,
    #[error("only selector tools can copy")]
    NotASelector,
    #[error("selection holds no rock")]
    EmptySelection,
    #[error("tool is not holding a pattern")]
    NotHolding,
    #[error("pattern does not fit at the target")]
    InvalidPlacement,
    #[error("tool would not change the grid")]
    NoEffect,
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
}

pub type CommandResult = Result<(), Rejection>;

/// Read-only view of one tool for debug overlays and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDebugView {
    pub id: ToolId,
    pub kind: ToolKind,
    pub position: Vec2f,
    pub bounds: SelectionBounds,
    pub center: Vec2i,
    pub rotation: u8,
    pub state: ToolState,
    pub copied_cells: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleSession {
    pristine: StageData,
    stage: StageData,
    history: History<StageData>,
    progress: ProgressMonitor,
    tools: BTreeMap<ToolId, Tool>,
    selected: Option<ToolId>,
    transform: GridTransform,
    settings: EngineSettings,
    ticker: IntervalTicker,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl PuzzleSession {
    pub fn new(mut stage: StageData, settings: EngineSettings) -> Self {
        stage.reconcile_layers();
        let (width, height) = stage.dimensions();
        let progress = ProgressMonitor::new(&stage, &settings.trackable_keys());
        let mut session = Self {
            pristine: stage.clone(),
            stage,
            history: History::with_limit(settings.history_limit),
            progress,
            tools: BTreeMap::new(),
            selected: None,
            transform: GridTransform::new(Vec2f::default(), width, height),
            ticker: IntervalTicker::new(settings.progress_scan_interval()),
            settings,
            events: Vec::new(),
        };
        session.sync_tools();
        log::info!(
            "stage '{}' loaded: {width}x{height}, {} tools, {} progress items",
            session.stage.name,
            session.tools.len(),
            session.progress.total()
        );
        session
    }

    pub fn from_catalog(
        catalog: &StageCatalog,
        index: usize,
        settings: EngineSettings,
    ) -> Result<Self, CatalogError> {
        Ok(Self::new(catalog.instantiate(index)?, settings))
    }

    /// Moves the grid's world anchor. Tool positions are kept in grid space
    /// and don't move.
    pub fn with_anchor(mut self, anchor: Vec2f) -> Self {
        self.transform.anchor = anchor;
        self
    }

    pub fn stage(&self) -> &StageData {
        &self.stage
    }

    pub fn history(&self) -> &History<StageData> {
        &self.history
    }

    pub fn progress(&self) -> &ProgressMonitor {
        &self.progress
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn transform(&self) -> &GridTransform {
        &self.transform
    }

    pub fn grid_dimensions(&self) -> (usize, usize) {
        self.stage.dimensions()
    }

    pub fn is_cleared(&self) -> bool {
        self.progress.is_cleared()
    }

    /// Tools still in the inventory, by id.
    pub fn tools(&self) -> impl Iterator<Item = &Tool> {
        self.tools.values()
    }

    pub fn tool(&self, id: ToolId) -> Option<&Tool> {
        self.tools.get(&id)
    }

    pub fn selected_tool(&self) -> Option<ToolId> {
        self.selected
    }

    pub fn tool_world_position(&self, id: ToolId) -> Option<Vec2f> {
        let tool = self.tools.get(&id)?;
        Some(
            self.transform
                .grid_to_world(tool.position.x, tool.position.y, self.settings.cell_scale),
        )
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn tool_ref(&self, id: ToolId) -> Result<&Tool, Rejection> {
        self.tools.get(&id).ok_or(Rejection::UnknownTool(id))
    }

    fn tool_mut(&mut self, id: ToolId) -> Result<&mut Tool, Rejection> {
        self.tools.get_mut(&id).ok_or(Rejection::UnknownTool(id))
    }

    fn home_position(&self, width: usize, height: usize) -> Vec2f {
        let center = Vec2f::new(
            (self.transform.width as f32 - 1.0) / 2.0,
            (self.transform.height as f32 - 1.0) / 2.0,
        );
        self.transform.fit_footprint(center, width, height)
    }

    /// Brings the runtime tools in line with the stage inventory. Tools that
    /// come back through undo start over at the grid center.
    fn sync_tools(&mut self) {
        let inventory = self.stage.tool_inventory.clone();
        self.tools
            .retain(|id, _| inventory.iter().any(|slot| slot.id == *id));
        for slot in inventory {
            if !self.tools.contains_key(&slot.id) {
                let position = self.home_position(slot.spec.width, slot.spec.height);
                self.tools.insert(slot.id, Tool::new(slot, position));
            }
        }
        if self.selected.is_none_or(|id| !self.tools.contains_key(&id)) {
            self.selected = self.tools.keys().next().copied();
        }
    }

    pub fn select_tool(&mut self, id: ToolId) -> CommandResult {
        self.tool_ref(id)?;
        self.selected = Some(id);
        Ok(())
    }

    /// Cycles to the next tool by id, wrapping around.
    pub fn select_next_tool(&mut self) -> CommandResult {
        let next = match self.selected {
            Some(current) => self
                .tools
                .range((Bound::Excluded(current), Bound::Unbounded))
                .next()
                .or_else(|| self.tools.iter().next())
                .map(|(id, _)| *id),
            None => self.tools.keys().next().copied(),
        };
        let id = next.ok_or(Rejection::NoToolSelected)?;
        self.selected = Some(id);
        Ok(())
    }

    /// Moves a tool to a world position, snapped and clamped to the grid.
    pub fn move_tool(&mut self, id: ToolId, world: Vec2f) -> CommandResult {
        let transform = self.transform;
        let scale = self.settings.cell_scale;
        let tool = self.tool_mut(id)?;
        let (w, h) = tool.footprint_dims();
        tool.position = transform.place_tool(world, w, h, scale);
        tool.mark_moved();
        Ok(())
    }

    pub fn move_tool_by_cells(&mut self, id: ToolId, dx: i32, dy: i32) -> CommandResult {
        let transform = self.transform;
        let tool = self.tool_mut(id)?;
        let (w, h) = tool.footprint_dims();
        let target = Vec2f::new(tool.position.x + dx as f32, tool.position.y + dy as f32);
        tool.position = transform.fit_footprint(target, w, h);
        tool.mark_moved();
        Ok(())
    }

    /// One quarter turn; `sign` > 0 is clockwise. A zero sign does nothing.
    pub fn rotate_step(&mut self, id: ToolId, sign: i32) -> CommandResult {
        let transform = self.transform;
        let tool = self.tool_mut(id)?;
        let Some(dir) = RotationDir::from_sign(sign) else {
            return Ok(());
        };
        tool.rotate(dir);
        let (w, h) = tool.footprint_dims();
        tool.position = transform.fit_footprint(tool.position, w, h);
        Ok(())
    }

    /// Copies with an idle selector; otherwise commits.
    pub fn begin_copy_or_paste(&mut self, id: ToolId) -> CommandResult {
        let tool = self.tool_ref(id)?;
        match (tool.spec.kind, tool.state) {
            (ToolKind::Selector, ToolState::Idle) => self.copy(id),
            _ => self.commit(id),
        }
    }

    /// Captures the rocks under a selector. Does not touch the grid.
    pub fn copy(&mut self, id: ToolId) -> CommandResult {
        let tool = self.tool_ref(id)?;
        if tool.spec.kind != ToolKind::Selector {
            return Err(Rejection::NotASelector);
        }
        let copied = pattern::copy_pattern(
            &self.stage,
            tool.selection_bounds(),
            tool.center_cell(),
            tool.spec.width,
            tool.spec.height,
            tool.rotation,
        )
        .ok_or(Rejection::EmptySelection)?;

        let cells = copied.len();
        self.tool_mut(id)?.hold_pattern(copied);
        log::debug!("tool {id}: copied {cells} cells");
        self.push_event(GameEvent::PatternCopied { tool: id, cells });
        Ok(())
    }

    /// Drops a held pattern. No snapshot is taken.
    pub fn cancel(&mut self, id: ToolId) -> CommandResult {
        let tool = self.tool_mut(id)?;
        tool.drop_pattern().map(|_| ()).ok_or(Rejection::NotHolding)
    }

    /// Applies the tool: paste for selectors, destroy for pickaxes, push for
    /// gravity tools. A successful commit consumes the tool.
    pub fn commit(&mut self, id: ToolId) -> CommandResult {
        let tool = self.tool_ref(id)?.clone();
        match tool.spec.kind {
            ToolKind::Selector => self.commit_paste(&tool)?,
            ToolKind::Pickaxe => self.commit_destroy(&tool)?,
            ToolKind::Gravity => self.commit_gravity(&tool)?,
        }
        self.consume_tool(id);
        self.after_mutation();
        Ok(())
    }

    fn commit_paste(&mut self, tool: &Tool) -> CommandResult {
        let copied = tool.pattern.as_ref().ok_or(Rejection::NotHolding)?;
        let center = tool.center_cell();
        if !pattern::can_paste(&self.stage, copied, center, tool.rotation) {
            return Err(Rejection::InvalidPlacement);
        }
        self.history.record(self.stage.clone());
        let placed = pattern::apply_paste(&mut self.stage, copied, center, tool.rotation);
        log::debug!(
            "tool {}: pasted {} cells at ({}, {}) rotation {}",
            tool.id,
            placed.len(),
            center.x,
            center.y,
            tool.rotation
        );
        Ok(())
    }

    fn commit_destroy(&mut self, tool: &Tool) -> CommandResult {
        let bounds = tool.selection_bounds();
        if destroy::rocks_in(&self.stage, bounds).is_empty() {
            return Err(Rejection::NoEffect);
        }
        self.history.record(self.stage.clone());
        let positions = destroy::destroy_rocks(&mut self.stage, bounds);
        log::debug!("tool {}: destroyed {} rocks", tool.id, positions.len());
        self.push_event(GameEvent::RocksDestroyed { positions });
        Ok(())
    }

    fn commit_gravity(&mut self, tool: &Tool) -> CommandResult {
        let dir = PushDirection::from_rotation(tool.rotation);
        let moves = gravity::compute_moves(&self.stage, tool.selection_bounds(), dir);
        if moves.is_empty() {
            return Err(Rejection::NoEffect);
        }
        self.history.record(self.stage.clone());
        gravity::apply_moves(&mut self.stage, &moves);
        log::debug!("tool {}: pushed {} rocks {dir:?}", tool.id, moves.len());
        self.push_event(GameEvent::RocksMoved { moves });
        Ok(())
    }

    fn consume_tool(&mut self, id: ToolId) {
        self.stage.tool_inventory.retain(|slot| slot.id != id);
        self.sync_tools();
        self.push_event(GameEvent::ToolConsumed { tool: id });
    }

    fn after_mutation(&mut self) {
        self.push_event(GameEvent::GridChanged);
        self.scan_progress();
    }

    fn scan_progress(&mut self) -> usize {
        let found = self.progress.scan(&self.stage);
        let count = found.len();
        for event in found {
            if event == ProgressEvent::StageCleared {
                log::info!("stage '{}' cleared", self.stage.name);
            }
            self.push_event(event.into());
        }
        count
    }

    pub fn undo(&mut self) -> CommandResult {
        if !self.history.undo(&mut self.stage) {
            return Err(Rejection::NothingToUndo);
        }
        self.sync_tools();
        self.after_mutation();
        Ok(())
    }

    pub fn redo(&mut self) -> CommandResult {
        if !self.history.redo(&mut self.stage) {
            return Err(Rejection::NothingToRedo);
        }
        self.sync_tools();
        self.after_mutation();
        Ok(())
    }

    /// Scans right away. Returns how many progress events were emitted.
    pub fn recalculate_progress(&mut self) -> usize {
        self.scan_progress()
    }

    /// Advances the scan timer; scans once if at least one interval elapsed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.ticker.tick(dt) == 0 {
            return false;
        }
        self.scan_progress();
        true
    }

    /// Back to the stage as it was loaded: grids, inventory, progress and
    /// history all start over.
    pub fn restart(&mut self) {
        self.stage = self.pristine.clone();
        self.history.clear();
        self.progress = ProgressMonitor::new(&self.stage, &self.settings.trackable_keys());
        self.tools.clear();
        self.selected = None;
        self.sync_tools();
        self.ticker.reset();
        log::info!("stage '{}' restarted", self.stage.name);
        self.push_event(GameEvent::GridChanged);
    }

    /// Target cells with their validity. A held pattern previews its paste;
    /// otherwise the plain footprint is returned.
    pub fn cell_preview_footprint(&self, id: ToolId) -> Vec<FootprintCell> {
        let Some(tool) = self.tools.get(&id) else {
            return Vec::new();
        };
        match &tool.pattern {
            Some(copied) => {
                pattern::paste_footprint(&self.stage, copied, tool.center_cell(), tool.rotation)
            }
            None => tool
                .selection_bounds()
                .cells()
                .map(|(x, y)| FootprintCell {
                    pos: Vec2i::new(x, y),
                    can_place: self.stage.in_bounds(x, y),
                })
                .collect(),
        }
    }

    pub fn debug_view(&self, id: ToolId) -> Option<ToolDebugView> {
        let tool = self.tools.get(&id)?;
        Some(ToolDebugView {
            id,
            kind: tool.spec.kind,
            position: tool.position,
            bounds: tool.selection_bounds(),
            center: tool.center_cell(),
            rotation: tool.rotation,
            state: tool.state,
            copied_cells: tool.pattern.as_ref().map_or(0, |p| p.len()),
        })
    }
}
