//! Configuration management.

mod settings;
mod xdg;

pub use settings::{ConfigError, Settings};
pub use xdg::XdgDirs;
