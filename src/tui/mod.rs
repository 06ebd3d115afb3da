//! TUI debugger for the Simpletron emulator.
//!
//! Provides an interactive terminal-based debugger with:
//! - Real-time register visualization
//! - Scrollable memory view with the current instruction highlighted
//! - Step/run/breakpoint controls
//! - A console pane and an inline input field for READ

mod app;
mod ui;

pub use app::{run_debugger, DebuggerApp};
