//! Vaultterm — an embedded terminal panel for vault-based note apps.
//!
//! The plugin registers one view type with the host workspace; opening it
//! spawns the configured shell and bridges its byte streams to a terminal
//! surface inside the panel.

mod plugin;

pub use plugin::{TerminalPlugin, OPEN_TERMINAL_COMMAND};
pub use terminal_view::{TerminalView, VIEW_TYPE};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;

/// Guards the global subscriber so repeated plugin loads don't panic.
static LOGGING: OnceCell<()> = OnceCell::new();

/// Check if debug mode is enabled via environment variable.
fn is_debug_mode() -> bool {
    std::env::var("VAULTTERM_DEBUG").is_ok()
}

/// Create the plugin's config directory if missing.
pub fn init_paths() -> Result<()> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("vaultterm");
    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
    tracing::debug!("Initialized paths - config: {:?}", config_dir);
    Ok(())
}

/// Initialize the logging system.
///
/// Idempotent; embedding hosts that already set a global subscriber
/// should simply not call this.
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    LOGGING.get_or_init(|| {
        let default_filter = if is_debug_mode() {
            "vaultterm=trace,terminal=trace,terminal_view=trace,info"
        } else {
            "vaultterm=info,warn"
        };

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_line_number(true))
            .with(filter)
            .init();

        if is_debug_mode() {
            tracing::info!(
                "Vaultterm v{} loading (DEBUG MODE ENABLED)",
                env!("CARGO_PKG_VERSION")
            );
            tracing::info!("Set RUST_LOG for custom log levels, e.g. RUST_LOG=vaultterm=trace");
        } else {
            tracing::info!("Vaultterm v{} loading", env!("CARGO_PKG_VERSION"));
        }
    });
}
