//! Quiet-period debouncing on a dedicated thread.
//!
//! A burst of triggers collapses to a single callback invocation carrying
//! the value of the last trigger, fired once the quiet period elapses with
//! no further triggers. Each new trigger cancels the pending fire.
//!
//! Used to coalesce host panel resize events: layout passes can fire many
//! times per drag gesture, and re-flowing the terminal grid on every tick
//! is wasted work.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

enum Msg<T> {
    Trigger(T),
    Cancel,
}

/// Debounces values onto a callback after a quiet period.
///
/// Dropping the debouncer cancels any pending fire and joins the worker
/// thread, so no timer outlives its owner.
pub struct Debouncer<T: Send + 'static> {
    tx: Option<Sender<Msg<T>>>,
    thread: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Start a debouncer firing `callback` after `quiet_period` of silence.
    pub fn new(quiet_period: Duration, callback: impl Fn(T) + Send + 'static) -> Self {
        let (tx, rx) = mpsc::channel::<Msg<T>>();

        let thread = thread::Builder::new()
            .name("vaultterm-debounce".into())
            .spawn(move || loop {
                // Idle until the first trigger of a burst arrives.
                let mut latest = match rx.recv() {
                    Ok(Msg::Trigger(value)) => value,
                    Ok(Msg::Cancel) => continue,
                    Err(_) => return,
                };

                // Each further trigger restarts the quiet period; the last
                // value wins. A timeout means the burst is over.
                loop {
                    match rx.recv_timeout(quiet_period) {
                        Ok(Msg::Trigger(value)) => latest = value,
                        Ok(Msg::Cancel) => break,
                        Err(RecvTimeoutError::Timeout) => {
                            callback(latest);
                            break;
                        }
                        // Owner dropped mid-burst: exit without firing.
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
            })
            .expect("failed to spawn debounce thread");

        Self {
            tx: Some(tx),
            thread: Some(thread),
        }
    }

    /// Record a trigger, (re)starting the quiet period.
    pub fn trigger(&self, value: T) {
        if let Some(tx) = &self.tx {
            if tx.send(Msg::Trigger(value)).is_err() {
                tracing::warn!("debounce thread is gone, dropping trigger");
            }
        }
    }

    /// Discard any pending fire without stopping the debouncer.
    pub fn cancel(&self) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(Msg::Cancel);
        }
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        // Disconnect first so the thread observes shutdown promptly,
        // then join to guarantee the callback never runs after drop.
        self.tx.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    const QUIET: Duration = Duration::from_millis(25);
    const SETTLE: Duration = Duration::from_millis(250);

    fn recording_debouncer() -> (Debouncer<u32>, Arc<Mutex<Vec<u32>>>) {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let fired_clone = fired.clone();
        let debouncer = Debouncer::new(QUIET, move |value| {
            fired_clone.lock().push(value);
        });
        (debouncer, fired)
    }

    #[test]
    fn burst_collapses_to_single_fire_with_last_value() {
        let (debouncer, fired) = recording_debouncer();

        for value in 1..=5 {
            debouncer.trigger(value);
        }
        std::thread::sleep(SETTLE);

        assert_eq!(*fired.lock(), vec![5]);
    }

    #[test]
    fn spaced_triggers_fire_individually() {
        let (debouncer, fired) = recording_debouncer();

        debouncer.trigger(1);
        std::thread::sleep(SETTLE);
        debouncer.trigger(2);
        std::thread::sleep(SETTLE);

        assert_eq!(*fired.lock(), vec![1, 2]);
    }

    #[test]
    fn cancel_suppresses_pending_fire() {
        let (debouncer, fired) = recording_debouncer();

        debouncer.trigger(1);
        debouncer.cancel();
        std::thread::sleep(SETTLE);

        assert!(fired.lock().is_empty());

        // Still usable after a cancel.
        debouncer.trigger(2);
        std::thread::sleep(SETTLE);
        assert_eq!(*fired.lock(), vec![2]);
    }

    #[test]
    fn drop_cancels_pending_fire() {
        let (debouncer, fired) = recording_debouncer();

        debouncer.trigger(7);
        drop(debouncer);
        std::thread::sleep(SETTLE);

        assert!(fired.lock().is_empty());
    }

    #[test]
    fn trigger_after_fire_starts_new_burst() {
        let (debouncer, fired) = recording_debouncer();

        debouncer.trigger(1);
        debouncer.trigger(2);
        std::thread::sleep(SETTLE);
        debouncer.trigger(3);
        debouncer.trigger(4);
        std::thread::sleep(SETTLE);

        assert_eq!(*fired.lock(), vec![2, 4]);
    }
}
