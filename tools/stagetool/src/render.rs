use puzzle::cell;
use puzzle::grid::{CellGrid, StageData};
use puzzle::progress::ProgressMonitor;

/// Text rendering of one layer, top row first. Empty cells print as `_`.
pub fn render_layer(grid: &CellGrid) -> String {
    let cell_width = grid
        .rows()
        .iter()
        .flatten()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(1)
        .max(1);

    let mut out = String::new();
    for (y, row) in grid.rows().iter().enumerate().rev() {
        out.push_str(&format!("{y:>3} |"));
        for value in row {
            let shown = if value.is_empty() { "_" } else { value.as_str() };
            out.push_str(&format!(" {shown:<cell_width$}"));
        }
        out.push('\n');
    }
    out
}

pub fn render_stage(stage: &StageData) -> String {
    let (width, height) = stage.dimensions();
    let mut out = format!("{} ({width}x{height})\n", stage.name);
    out.push_str("mass:\n");
    out.push_str(&render_layer(&stage.mass_grid));
    out.push_str("rock:\n");
    out.push_str(&render_layer(&stage.rock_grid));
    out
}

pub fn render_tools(stage: &StageData) -> String {
    let mut out = String::from("tools:\n");
    if stage.tool_inventory.is_empty() {
        out.push_str("  (none)\n");
    }
    for slot in &stage.tool_inventory {
        out.push_str(&format!(
            "  #{} {} {}x{}\n",
            slot.id,
            slot.spec.kind.label(),
            slot.spec.width,
            slot.spec.height
        ));
    }
    out
}

pub fn render_progress(progress: &ProgressMonitor) -> String {
    let mut out = format!(
        "progress: {}/{}{}\n",
        progress.acquired_count(),
        progress.total(),
        if progress.is_cleared() { " (cleared)" } else { "" }
    );
    for key in progress.trackable_keys() {
        let slots = progress.slots(*key);
        if slots.is_empty() {
            continue;
        }
        let marks: String = slots
            .iter()
            .map(|item| if item.acquired { *key } else { cell::MASS_CHAR })
            .collect();
        out.push_str(&format!("  {key}: [{marks}]\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzle::grid::Layer;

    #[test]
    fn layers_render_top_row_first() {
        let mut stage = StageData::new("t", CellGrid::filled(2, 2, "."), CellGrid::new(2, 2));
        stage.set_cell(Layer::Rock, 1, 0, "#S");
        let text = render_layer(&stage.rock_grid);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["  1 | _  _ ", "  0 | _  #S"]);
    }

    #[test]
    fn progress_marks_acquired_slots() {
        let mut stage = StageData::new("t", CellGrid::filled(2, 1, ".S"), CellGrid::new(2, 1));
        let mut progress = ProgressMonitor::new(&stage, &['S']);
        stage.set_cell(Layer::Rock, 1, 0, "#S");
        progress.scan(&stage);
        assert_eq!(render_progress(&progress), "progress: 1/2\n  S: [S.]\n");
    }
}
