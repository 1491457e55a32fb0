// Library root: re-exports all modules so integration tests and the binary
// can access the crate's public API.

pub mod app;
pub mod board;
pub mod config;
pub mod diagnostics;
pub mod fetch;
pub mod model;
pub mod panel;
pub mod protocol;
pub mod render;
pub mod tui;
