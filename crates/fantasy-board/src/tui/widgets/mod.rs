// TUI widget modules for each board zone.

pub mod panel;
pub mod status_bar;
