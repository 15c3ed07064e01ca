pub mod catalog;
pub mod cell;
pub mod coords;
pub mod destroy;
pub mod editor_api;
pub mod gravity;
pub mod grid;
pub mod logging;
pub mod logic;
pub mod pattern;
pub mod progress;
pub mod save_data;
pub mod session;
pub mod settings;
pub mod tools;
