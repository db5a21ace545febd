//! Terminal surface adapter.
//!
//! Owns the emulator widget (an `alacritty_terminal` grid plus ANSI
//! processor), feeds it bytes from the process bridge, captures its
//! outgoing bytes, and recomputes its character-grid geometry from panel
//! pixel dimensions and cell metrics.

use alacritty_terminal::event::{Event, EventListener};
use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::index::{Column, Line};
use alacritty_terminal::term::{Config, Term};
use alacritty_terminal::vte::ansi::Processor;
use anyhow::{bail, Context, Result};
use parking_lot::{Mutex, RwLock};
use settings::constants::terminal::CELL_WIDTH_RATIO;
use settings::StyleSettings;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use terminal::{CellMetrics, OutputPump, ShellBridge, TermSize};
use theme::{terminal_colors, HostTheme, TerminalColors};

/// Forwards terminal-initiated output (answerback, device status reports)
/// back into the bridge channel.
///
/// Holds the bridge slot rather than the bridge itself: the slot is empty
/// until `bind` and after dispose, and write-backs in those windows are
/// dropped.
#[derive(Clone)]
pub struct Listener {
    bridge: Arc<Mutex<Option<ShellBridge>>>,
}

impl Listener {
    fn new(bridge: Arc<Mutex<Option<ShellBridge>>>) -> Self {
        Self { bridge }
    }
}

impl EventListener for Listener {
    fn send_event(&self, event: Event) {
        if let Event::PtyWrite(text) = event {
            if let Some(bridge) = self.bridge.lock().as_ref() {
                if let Err(error) = bridge.write(text.as_bytes()) {
                    tracing::warn!("Terminal write-back failed: {}", error);
                }
            }
        }
    }
}

/// One terminal widget instance and its channel wiring.
///
/// Cheap to clone — all state is shared — so lifecycle code and the
/// resize debouncer can hold handles to the same surface.
#[derive(Clone)]
pub struct TerminalSurface {
    term: Arc<Mutex<Term<Listener>>>,
    processor: Arc<Mutex<Processor>>,
    bridge: Arc<Mutex<Option<ShellBridge>>>,
    pump: Arc<Mutex<Option<OutputPump>>>,
    cell_metrics: Arc<RwLock<CellMetrics>>,
    colors: TerminalColors,
    disposed: Arc<AtomicBool>,
}

impl TerminalSurface {
    /// Instantiate the widget, configured from the settings snapshot and
    /// a color theme sampled from the host's current theme.
    ///
    /// Colors are resolved once, here; the surface does not track later
    /// theme changes. Cell metrics start as an estimate from the font
    /// settings — the renderer replaces them after its first layout pass,
    /// which is why the initial geometry recomputation is deferred rather
    /// than done here.
    pub fn create(settings: &StyleSettings, theme: &HostTheme) -> Self {
        let bridge = Arc::new(Mutex::new(None));
        let term = Term::new(
            Config::default(),
            &TermSize::default(),
            Listener::new(bridge.clone()),
        );

        let estimated = CellMetrics {
            width: settings.font_size * CELL_WIDTH_RATIO,
            height: settings.font_size * settings.line_height,
        };

        Self {
            term: Arc::new(Mutex::new(term)),
            processor: Arc::new(Mutex::new(Processor::new())),
            bridge,
            pump: Arc::new(Mutex::new(None)),
            cell_metrics: Arc::new(RwLock::new(estimated)),
            colors: terminal_colors(theme),
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Wire the bridge's readable bytes into the widget and the widget's
    /// outgoing bytes into the bridge.
    ///
    /// One-to-one and fixed: a surface binds at most once for its
    /// lifetime.
    pub fn bind(&self, bridge: ShellBridge) -> Result<()> {
        let mut slot = self.bridge.lock();
        if slot.is_some() {
            bail!("surface is already bound to a bridge");
        }

        let output_rx = bridge
            .take_output_receiver()
            .context("bridge output was already taken")?;
        let exited = bridge.exited_flag();
        *slot = Some(bridge);
        drop(slot);

        let pump = OutputPump::start(output_rx, self.term.clone(), self.processor.clone(), exited);
        *self.pump.lock() = Some(pump);
        Ok(())
    }

    /// User keystrokes from the host renderer, already encoded as bytes.
    ///
    /// Write failures (closed or crashed process) are logged and
    /// swallowed; keystrokes into a dead shell just disappear.
    pub fn input(&self, bytes: &[u8]) {
        if let Some(bridge) = self.bridge.lock().as_ref() {
            if let Err(error) = bridge.write(bytes) {
                tracing::warn!("Dropped terminal input: {}", error);
            }
        }
    }

    /// Render a spawn failure into the grid so the panel shows what went
    /// wrong. The surface stays unbound; there will be no further output.
    pub fn show_spawn_failure(&self, error: &anyhow::Error) {
        let message = format!(
            "\x1b[31m\x1b[1mError: failed to spawn shell\x1b[0m\r\n\r\n{:#}\r\n\r\n\
             Check the terminal-command setting, then close and reopen this panel.\r\n",
            error
        );
        let mut term = self.term.lock();
        let mut processor = self.processor.lock();
        processor.advance(&mut *term, message.as_bytes());
    }

    /// The renderer reports the widget's actual cell pixel size once its
    /// layout metrics exist.
    pub fn update_cell_metrics(&self, metrics: CellMetrics) {
        *self.cell_metrics.write() = metrics;
    }

    pub fn cell_metrics(&self) -> CellMetrics {
        *self.cell_metrics.read()
    }

    /// Recompute geometry for the given panel pixel size and apply it to
    /// the widget. Returns the applied size, or `None` when cell metrics
    /// are degenerate and the resize is skipped.
    ///
    /// Buffered unread output is unaffected: the bridge channel is
    /// independent of the grid lock taken here.
    pub fn resize_to_pixels(&self, width: f32, height: f32) -> Option<TermSize> {
        let size = TermSize::from_pixels(width, height, self.cell_metrics())?;
        let mut term = self.term.lock();
        if size
            != (TermSize {
                cols: term.columns() as u16,
                rows: term.screen_lines() as u16,
            })
        {
            term.resize(size);
        }
        Some(size)
    }

    /// Current character-grid size.
    pub fn grid_size(&self) -> TermSize {
        let term = self.term.lock();
        TermSize {
            cols: term.columns() as u16,
            rows: term.screen_lines() as u16,
        }
    }

    /// Text content of one grid row (trailing blanks trimmed). The host
    /// renderer reads the grid cell-by-cell; tests read it through this.
    pub fn row_text(&self, row: usize) -> String {
        let term = self.term.lock();
        let grid = term.grid();
        if row >= grid.screen_lines() {
            return String::new();
        }
        let line = &grid[Line(row as i32)];
        let text: String = (0..grid.columns()).map(|col| line[Column(col)].c).collect();
        text.trim_end().to_string()
    }

    /// Colors sampled from the host theme at creation time.
    pub fn colors(&self) -> TerminalColors {
        self.colors
    }

    /// Check and clear the repaint flag set by the output pump.
    pub fn take_render_needed(&self) -> bool {
        self.pump
            .lock()
            .as_ref()
            .is_some_and(OutputPump::take_render_needed)
    }

    /// Whether the bridged process has exited (false when never bound).
    pub fn has_exited(&self) -> bool {
        self.bridge
            .lock()
            .as_ref()
            .is_some_and(ShellBridge::has_exited)
    }

    pub fn is_bound(&self) -> bool {
        self.bridge.lock().is_some()
    }

    /// Shared exit flag of the bridged process, if bound. Stays readable
    /// after dispose, which is what lifecycle code uses to confirm the
    /// process is really gone.
    pub fn exited_flag(&self) -> Option<Arc<AtomicBool>> {
        self.bridge.lock().as_ref().map(ShellBridge::exited_flag)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Release the widget and terminate the bridged process.
    ///
    /// Idempotent and infallible; by return the process is confirmed
    /// terminated. The grid itself stays readable (the host may still
    /// paint a final frame) but the channel is gone.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        // Stop the pump first so nothing advances the grid mid-teardown.
        self.pump.lock().take();
        if let Some(bridge) = self.bridge.lock().take() {
            bridge.kill();
        }
    }
}
