//! TUI (Terminal User Interface) for NoAI
//!
//! A header, the scrolling conversation and an input box. Runs until
//! Esc or Ctrl+C.

mod app;
mod event;
mod theme;
mod ui;

pub mod widgets;

pub use app::{TerminalSession, TuiApp};
pub use theme::Theme;

use anyhow::Result;

use crate::config::Settings;

/// Run the TUI application
pub async fn run(settings: Settings) -> Result<()> {
    let mut app = TuiApp::new(settings)?;
    let mut session = TerminalSession::enter()?;
    app.run(&mut session).await
}
