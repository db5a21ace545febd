//! Plugin entry point and command orchestration.

use anyhow::Result;
use parking_lot::Mutex;
use settings::StyleSettings;
use std::sync::Arc;
use terminal_view::{TerminalView, VIEW_TYPE};
use vaultterm_workspace::{PanelId, SplitDirection, Workspace};

/// Command identifier the host binds to a palette entry or hotkey.
pub const OPEN_TERMINAL_COMMAND: &str = "open-terminal";

/// The terminal plugin: owns the live configuration and the view
/// registration.
///
/// The configuration is live only here — every view gets a clone taken at
/// factory time, so an open session never observes a settings change.
pub struct TerminalPlugin {
    settings: Arc<Mutex<StyleSettings>>,
}

impl TerminalPlugin {
    /// Load persisted configuration, creating the default config file
    /// (and migrating legacy settings) on first launch.
    pub fn load() -> Self {
        settings::ensure_config_file();
        Self::with_settings(settings::load_config())
    }

    /// Build a plugin around explicit settings (embedding and tests).
    pub fn with_settings(settings: StyleSettings) -> Self {
        Self {
            settings: Arc::new(Mutex::new(settings)),
        }
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> StyleSettings {
        self.settings.lock().clone()
    }

    /// Register the terminal view type with the host workspace.
    ///
    /// The factory clones the settings at call time, synchronously, so
    /// the snapshot is attached before the view's open hook runs.
    pub fn register(&self, workspace: &mut Workspace) {
        let settings = self.settings.clone();
        workspace.register_view(
            VIEW_TYPE,
            Box::new(move || Box::new(TerminalView::new(settings.lock().clone()))),
        );
    }

    /// The open-terminal command.
    ///
    /// Unless multiple terminals are allowed, any existing terminal panel
    /// is detached first — and detaching runs each session's teardown to
    /// completion, so the prior process is dead before the new one is
    /// spawned. The new panel is split off the active one, revealed, and
    /// (per settings) focused by its own open hook.
    pub fn open_terminal(&self, workspace: &mut Workspace) -> Result<PanelId> {
        let snapshot = self.settings.lock().clone();

        if !snapshot.allow_multiple_terminals {
            let closed = workspace.detach_panels_of_type(VIEW_TYPE);
            if closed > 0 {
                tracing::debug!("Replaced {} existing terminal panel(s)", closed);
            }
        }

        let id = workspace.open_panel(VIEW_TYPE, SplitDirection::Horizontal)?;
        workspace.reveal_panel(id);
        Ok(id)
    }

    /// Apply a configuration change.
    ///
    /// Open sessions hold immutable snapshots, so a change recreates any
    /// open terminal panels instead of mutating them in place: one
    /// replacement per open panel when multiples are allowed, a single
    /// replacement otherwise.
    pub fn apply_settings_change(&self, new_settings: StyleSettings, workspace: &mut Workspace) {
        {
            let mut current = self.settings.lock();
            if *current == new_settings {
                return;
            }
            *current = new_settings;
        }

        let open_before = workspace.detach_panels_of_type(VIEW_TYPE);
        if open_before == 0 {
            return;
        }

        let replacements = if self.settings.lock().allow_multiple_terminals {
            open_before
        } else {
            1
        };
        for _ in 0..replacements {
            if let Err(error) = workspace.open_panel(VIEW_TYPE, SplitDirection::Horizontal) {
                tracing::warn!("Failed to reopen terminal panel: {:#}", error);
                break;
            }
        }
    }
}
