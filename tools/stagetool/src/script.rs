//! Play scripts: one command per line, `#` starts a comment.
//!
//! ```text
//! select 2        # or: select next
//! move -1 0       # by whole cells
//! moveto 0.5 1.0  # world position
//! rotate cw       # or: ccw, +1, -1
//! copy            # copy with an idle selector, otherwise paste
//! commit
//! cancel
//! undo
//! redo
//! tick 100        # milliseconds
//! rescan
//! restart
//! ```

use anyhow::{Context, Result, bail};
use puzzle::logic::InputAction;

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line_no: usize,
    pub text: String,
    pub action: InputAction,
}

pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let body = raw.split('#').next().unwrap_or("").trim();
        if body.is_empty() {
            continue;
        }
        let action =
            parse_command(body).with_context(|| format!("line {line_no}: '{body}'"))?;
        lines.push(ScriptLine {
            line_no,
            text: body.to_string(),
            action,
        });
    }
    Ok(lines)
}

pub fn parse_command(body: &str) -> Result<InputAction> {
    let mut words = body.split_whitespace();
    let Some(verb) = words.next() else {
        bail!("empty command");
    };
    let args: Vec<&str> = words.collect();

    let action = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("select", ["next"]) => InputAction::SelectNextTool,
        ("select", [id]) => InputAction::SelectTool {
            id: id.parse().context("tool id")?,
        },
        ("move", [dx, dy]) => InputAction::MoveBy {
            dx: dx.parse().context("dx")?,
            dy: dy.parse().context("dy")?,
        },
        ("moveto", [x, y]) => InputAction::MoveTo {
            x: x.parse().context("x")?,
            y: y.parse().context("y")?,
        },
        ("rotate", [dir]) => match *dir {
            "cw" | "+1" | "1" => InputAction::RotateCw,
            "ccw" | "-1" => InputAction::RotateCcw,
            other => bail!("unknown rotation '{other}'"),
        },
        ("copy", []) | ("paste", []) => InputAction::CopyOrPaste,
        ("commit", []) => InputAction::Commit,
        ("cancel", []) => InputAction::Cancel,
        ("undo", []) => InputAction::Undo,
        ("redo", []) => InputAction::Redo,
        ("tick", [ms]) => InputAction::Tick {
            ms: ms.parse().context("milliseconds")?,
        },
        ("rescan", []) => InputAction::RecalculateProgress,
        ("restart", []) => InputAction::Restart,
        ("noop", []) => InputAction::Noop,
        (verb, args) => bail!("unknown command '{verb}' with {} argument(s)", args.len()),
    };
    Ok(action)
}
