//! Read-only introspection payloads shared by editors and debug tooling.
//!
//! Games fill these in explicitly; nothing here reaches into game internals.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditorAction {
    pub id: String,
    pub label: String,
    /// Names of the numeric arguments the action expects, in order.
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditorManifest {
    pub title: String,
    pub actions: Vec<EditorAction>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GridOrigin {
    /// `cells[y][x]` where `y=0` is the bottom row.
    BottomLeft,
    /// `cells[y][x]` where `y=0` is the top row.
    TopLeft,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditorPaletteEntry {
    pub value: u8,
    pub rgba: [u8; 4],
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditorGrid {
    pub name: String,
    pub origin: GridOrigin,
    pub cells: Vec<Vec<u8>>,
    pub palette: Option<Vec<EditorPaletteEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditorStat {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditorHistory {
    pub step: usize,
    pub undo_len: usize,
    pub redo_len: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub step: usize,
    pub state: serde_json::Value,
    pub stats: Vec<EditorStat>,
    pub grids: Vec<EditorGrid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepRequest {
    pub action_id: String,
    #[serde(default)]
    pub args: Vec<f64>,
}
