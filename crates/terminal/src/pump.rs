//! Dedicated output-pump thread.
//!
//! Moves escape-sequence parsing off the host's event loop onto a real OS
//! thread: bytes from the process bridge are batched and advanced through
//! the ANSI processor into the `Term` grid under a brief lock, then a
//! render-needed flag is set for the host to poll. Heavy output (a large
//! compile, `yes`) therefore never starves the host.
//!
//! Because the channel between bridge and grid is independent of the grid
//! lock, a concurrent resize never discards buffered unread output — it
//! just waits its turn for the lock.

use alacritty_terminal::event::EventListener;
use alacritty_terminal::term::Term;
use alacritty_terminal::vte::ansi::Processor;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Minimum interval between render signals. Low on purpose: the host's
/// own repaint scheduling does the real throttling.
const RENDER_SIGNAL_INTERVAL: Duration = Duration::from_millis(4);

/// Timeout for the blocking recv when no output is pending. Keeps the
/// thread responsive to shutdown while idle.
const IDLE_RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Initial capacity for the batch buffer (64 KB covers most bursts).
const BATCH_BUFFER_CAPACITY: usize = 65536;

/// Handle to the pump thread for one terminal surface.
///
/// On drop, signals the thread to shut down; it exits within the idle
/// timeout. The thread is deliberately not joined — it briefly holds the
/// `Term` lock, which the caller may also hold while dropping.
pub struct OutputPump {
    shutdown: Arc<AtomicBool>,
    render_needed: Arc<AtomicBool>,
    exited: Arc<AtomicBool>,
}

impl OutputPump {
    /// Start pumping `output_rx` into `term`.
    ///
    /// Generic over `L: EventListener` so this crate stays independent of
    /// the listener type the view layer wires up.
    pub fn start<L>(
        output_rx: Receiver<Vec<u8>>,
        term: Arc<Mutex<Term<L>>>,
        processor: Arc<Mutex<Processor>>,
        exited: Arc<AtomicBool>,
    ) -> Self
    where
        L: EventListener + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let render_needed = Arc::new(AtomicBool::new(false));

        let shutdown_clone = shutdown.clone();
        let render_needed_clone = render_needed.clone();
        let exited_clone = exited.clone();

        thread::Builder::new()
            .name("vaultterm-output-pump".into())
            .spawn(move || {
                pump_loop(
                    output_rx,
                    term,
                    processor,
                    exited_clone,
                    render_needed_clone,
                    shutdown_clone,
                );
            })
            .expect("failed to spawn output pump thread");

        Self {
            shutdown,
            render_needed,
            exited,
        }
    }

    /// Check and clear the render-needed flag (true = repaint due).
    pub fn take_render_needed(&self) -> bool {
        self.render_needed.swap(false, Ordering::AcqRel)
    }

    /// Check if the bridged process has exited.
    pub fn has_exited(&self) -> bool {
        self.exited.load(Ordering::Acquire)
    }
}

impl Drop for OutputPump {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
    }
}

/// Main loop: block for output, batch everything pending, parse, signal.
fn pump_loop<L: EventListener>(
    output_rx: Receiver<Vec<u8>>,
    term: Arc<Mutex<Term<L>>>,
    processor: Arc<Mutex<Processor>>,
    exited: Arc<AtomicBool>,
    render_needed: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
) {
    // Start in the past so the first batch always signals.
    let mut last_signal = Instant::now() - RENDER_SIGNAL_INTERVAL;
    let mut batch = Vec::with_capacity(BATCH_BUFFER_CAPACITY);

    loop {
        if shutdown.load(Ordering::Acquire) {
            break;
        }

        match output_rx.recv_timeout(IDLE_RECV_TIMEOUT) {
            Ok(chunk) => {
                // Drain everything pending into one batch; bytes stay in
                // arrival order across the merged stdout/stderr stream.
                batch.clear();
                batch.extend_from_slice(&chunk);
                while let Ok(more) = output_rx.try_recv() {
                    batch.extend_from_slice(&more);
                }

                {
                    let mut term_guard = term.lock();
                    let mut processor_guard = processor.lock();
                    processor_guard.advance(&mut *term_guard, &batch);
                }

                let now = Instant::now();
                if now.duration_since(last_signal) >= RENDER_SIGNAL_INTERVAL {
                    render_needed.store(true, Ordering::Release);
                    last_signal = now;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                // Idle; fall through to the exit check.
            }
            Err(RecvTimeoutError::Disconnected) => {
                // Reader threads dropped the sender — process is done.
                render_needed.store(true, Ordering::Release);
                break;
            }
        }

        if exited.load(Ordering::Acquire) {
            render_needed.store(true, Ordering::Release);
            break;
        }
    }
}
