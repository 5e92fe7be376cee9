//! Application Runner Module
//!
//! Shared entry point called by the `noai` binary: resolves settings, sets up
//! file logging and starts the runtime.

use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Settings, XdgDirs};

/// Runtime options coming from the command line.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Enable debug logging
    pub debug: bool,
    /// Enable verbose (trace-level) logging
    pub verbose: bool,
    /// Settings file to use instead of the XDG one
    pub config_path: Option<PathBuf>,
    /// Overrides `response_delay_ms` from the settings file
    pub delay_ms: Option<u64>,
}

impl AppConfig {
    fn default_filter(&self) -> &'static str {
        if self.verbose {
            "trace"
        } else if self.debug {
            "debug"
        } else {
            "info,noai=debug"
        }
    }
}

/// Load settings and apply command line overrides.
///
/// An explicit `--config` path must exist; the XDG file is optional.
pub fn resolve_settings(config: &AppConfig, dirs: &XdgDirs) -> anyhow::Result<Settings> {
    let mut settings = match &config.config_path {
        Some(path) => Settings::load_from_path(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::load(dirs).context("loading settings")?,
    };
    if let Some(delay) = config.delay_ms {
        settings.response_delay_ms = delay;
    }
    Ok(settings)
}

/// Route tracing output to the log file; the terminal belongs to the UI.
#[cfg_attr(not(feature = "tui"), allow(dead_code))]
fn init_logging(config: &AppConfig, dirs: &XdgDirs) -> anyhow::Result<PathBuf> {
    dirs.ensure_dirs()
        .with_context(|| format!("creating {}", dirs.cache.display()))?;
    let path = dirs.log_file();
    let log_file =
        File::create(&path).with_context(|| format!("creating log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(log_file)),
        )
        .try_init()
        .context("installing tracing subscriber")?;
    Ok(path)
}

/// Run the TUI application.
///
/// # Errors
///
/// Returns an error if the TUI feature is not enabled, settings are invalid,
/// or the terminal cannot be driven.
#[cfg(feature = "tui")]
pub fn run_tui(config: AppConfig) -> anyhow::Result<()> {
    let dirs = XdgDirs::new();
    let log_path = init_logging(&config, &dirs)?;
    let settings = resolve_settings(&config, &dirs)?;
    tracing::info!(
        log = %log_path.display(),
        delay_ms = settings.response_delay_ms,
        theme = %settings.code_theme,
        "starting noai"
    );

    let runtime = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    runtime.block_on(crate::tui::run(settings))
}

#[cfg(not(feature = "tui"))]
pub fn run_tui(_config: AppConfig) -> anyhow::Result<()> {
    anyhow::bail!("TUI feature not enabled. Recompile with --features tui")
}
