pub mod files;
pub mod tui;
