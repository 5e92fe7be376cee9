//! NoAI Library
//!
//! A minimal chat client: a conversation store seeded with a demo
//! transcript, a markdown renderer with highlighted code blocks, and a
//! terminal UI on top of both.

pub mod chat;
pub mod config;
pub mod render;
pub mod responder;
pub mod runner;

#[cfg(feature = "tui")]
pub mod tui;
