//! One terminal session: a spawned process paired with a surface.

use crate::surface::TerminalSurface;
use settings::constants::timing::RESIZE_DEBOUNCE;
use settings::StyleSettings;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use terminal::ShellBridge;
use theme::HostTheme;
use util::Debouncer;
use uuid::Uuid;
use vaultterm_workspace::PanelSize;

/// The live pairing of one shell process and one terminal surface.
///
/// Created when a terminal panel opens and disposed when it closes; the
/// process and the widget never outlive each other. Resize requests pass
/// through a private debouncer so a burst of host layout events collapses
/// into a single geometry recomputation.
pub struct TerminalSession {
    id: Uuid,
    surface: TerminalSurface,
    resize_debouncer: Debouncer<PanelSize>,
    disposed: Arc<AtomicBool>,
}

impl TerminalSession {
    /// Spawn the configured shell in `working_dir` and bind it to a fresh
    /// surface.
    ///
    /// A spawn failure (unknown executable, blank command) still yields a
    /// session: the error is rendered into the grid, the channel stays
    /// closed, and the panel shows no further output. The host is never
    /// crashed over a bad `terminal-command`.
    pub fn open(
        settings: &StyleSettings,
        theme: &HostTheme,
        working_dir: Option<&Path>,
    ) -> Self {
        let surface = TerminalSurface::create(settings, theme);

        match ShellBridge::spawn(&settings.terminal_command, working_dir) {
            Ok(bridge) => {
                if let Err(error) = surface.bind(bridge) {
                    util::debug_panic!("fresh surface refused bind: {:#}", error);
                }
            }
            Err(error) => {
                tracing::error!("Failed to spawn shell: {:#}", error);
                surface.show_spawn_failure(&error);
            }
        }

        let debounced_surface = surface.clone();
        let resize_debouncer = Debouncer::new(RESIZE_DEBOUNCE, move |size: PanelSize| {
            debounced_surface.resize_to_pixels(size.width, size.height);
        });

        Self {
            id: Uuid::new_v4(),
            surface,
            resize_debouncer,
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn surface(&self) -> &TerminalSurface {
        &self.surface
    }

    /// Schedule the first geometry recomputation.
    ///
    /// Deliberately asynchronous: it rides the debouncer's quiet period,
    /// by which time the renderer has completed a layout pass and reported
    /// real cell metrics instead of creation-time estimates.
    pub fn schedule_initial_resize(&self, size: PanelSize) {
        self.resize_debouncer.trigger(size);
    }

    /// Record a host resize event; the geometry recomputation fires after
    /// the burst goes quiet, using the dimensions of the last event.
    pub fn request_resize(&self, size: PanelSize) {
        if !self.is_disposed() {
            self.resize_debouncer.trigger(size);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Tear the session down: cancel any pending resize, release the
    /// widget, terminate the process. Idempotent; by first return the
    /// process is confirmed dead.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.resize_debouncer.cancel();
        self.surface.dispose();
    }
}
