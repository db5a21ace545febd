//! Shell process bridge.
//!
//! Spawns the configured shell as a child process and exposes a single
//! duplex byte channel over its stdio: writes go verbatim to the child's
//! stdin, and bytes from stdout and stderr are merged, in arrival order,
//! onto one readable channel — downstream they are all just "terminal
//! output". The executable is invoked directly from the tokenized command
//! line, never through an intermediary shell.
//!
//! Dropping the bridge terminates the child; a discarded channel never
//! leaves a process behind.

use crate::cmdline::tokenize;
use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Backpressure bound on the merged output channel.
const OUTPUT_CHANNEL_CAPACITY: usize = 64;

/// Read chunk size for the stdout/stderr reader threads.
const READ_BUFFER_SIZE: usize = 8192;

/// How often the exit watcher polls `try_wait`.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A spawned shell process and its duplex byte channel.
pub struct ShellBridge {
    child: Arc<Mutex<Child>>,
    stdin: Mutex<Option<ChildStdin>>,
    output_rx: Mutex<Option<Receiver<Vec<u8>>>>,
    exited: Arc<AtomicBool>,
    killed: AtomicBool,
}

impl ShellBridge {
    /// Tokenize `shell_command` and spawn it in `working_dir`.
    ///
    /// A command that tokenizes to nothing (blank configuration) fails
    /// here the same way an unlaunchable executable does; callers surface
    /// both as a closed channel, not as a distinct validation error.
    pub fn spawn(shell_command: &str, working_dir: Option<&Path>) -> Result<Self> {
        let argv = tokenize(shell_command);
        let Some((executable, args)) = argv.split_first() else {
            bail!("shell command is empty");
        };

        let mut command = Command::new(executable);
        command
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        // Don't flash a console window for the child on Windows.
        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn shell {:?}", executable))?;

        let stdin = child
            .stdin
            .take()
            .context("child process has no stdin handle")?;
        let stdout = child
            .stdout
            .take()
            .context("child process has no stdout handle")?;
        let stderr = child
            .stderr
            .take()
            .context("child process has no stderr handle")?;

        let (output_tx, output_rx) = sync_channel(OUTPUT_CHANNEL_CAPACITY);
        spawn_reader("vaultterm-stdout-reader", stdout, output_tx.clone());
        spawn_reader("vaultterm-stderr-reader", stderr, output_tx);

        let child = Arc::new(Mutex::new(child));
        let exited = Arc::new(AtomicBool::new(false));
        spawn_exit_watcher(child.clone(), exited.clone());

        tracing::debug!("Spawned shell {:?} with args {:?}", executable, args);

        Ok(Self {
            child,
            stdin: Mutex::new(Some(stdin)),
            output_rx: Mutex::new(Some(output_rx)),
            exited,
            killed: AtomicBool::new(false),
        })
    }

    /// Forward bytes verbatim to the child's stdin, in write order.
    ///
    /// A failed write (closed or crashed process) logs, transitions the
    /// writable side to closed, and reports the error; it never panics.
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut guard = self.stdin.lock();
        let Some(stdin) = guard.as_mut() else {
            bail!("shell stdin is closed");
        };

        if let Err(error) = stdin.write_all(bytes).and_then(|()| stdin.flush()) {
            tracing::warn!("Write to shell stdin failed: {}", error);
            *guard = None;
            return Err(error.into());
        }
        Ok(())
    }

    /// Take the readable side of the channel (merged stdout + stderr).
    ///
    /// One-shot: the first caller gets the receiver, later calls get
    /// `None`. The channel disconnects when the process closes both
    /// output streams.
    pub fn take_output_receiver(&self) -> Option<Receiver<Vec<u8>>> {
        self.output_rx.lock().take()
    }

    /// Shared flag that flips once the child has exited and been reaped.
    pub fn exited_flag(&self) -> Arc<AtomicBool> {
        self.exited.clone()
    }

    pub fn has_exited(&self) -> bool {
        self.exited.load(Ordering::Acquire)
    }

    /// Terminate the child and reap it.
    ///
    /// Idempotent: the OS-level kill runs exactly once no matter how many
    /// dispose/close paths call this, and by return the process is
    /// confirmed gone (no zombie survives panel close).
    pub fn kill(&self) {
        if self.killed.swap(true, Ordering::SeqCst) {
            return;
        }

        // Close stdin first so a well-behaved shell sees EOF.
        self.stdin.lock().take();

        let mut child = self.child.lock();
        if let Err(error) = child.kill() {
            // Already-exited children report InvalidInput here; nothing to do.
            tracing::debug!("Kill shell: {}", error);
        }
        match child.wait() {
            Ok(status) => tracing::debug!("Shell exited with {}", status),
            Err(error) => tracing::warn!("Failed to reap shell: {}", error),
        }
        self.exited.store(true, Ordering::Release);
    }
}

impl Drop for ShellBridge {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Pump one child output stream into the merged channel until EOF.
fn spawn_reader(name: &str, mut stream: impl Read + Send + 'static, tx: SyncSender<Vec<u8>>) {
    thread::Builder::new()
        .name(name.into())
        .spawn(move || {
            let mut buffer = [0u8; READ_BUFFER_SIZE];
            loop {
                match stream.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(buffer[..n].to_vec()).is_err() {
                            // Receiver gone — nobody is listening anymore.
                            break;
                        }
                    }
                    Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        })
        .expect("failed to spawn output reader thread");
}

/// Poll for child exit and set the shared flag once it's reaped.
fn spawn_exit_watcher(child: Arc<Mutex<Child>>, exited: Arc<AtomicBool>) {
    thread::Builder::new()
        .name("vaultterm-exit-watcher".into())
        .spawn(move || loop {
            if exited.load(Ordering::Acquire) {
                break;
            }
            match child.lock().try_wait() {
                Ok(Some(status)) => {
                    tracing::debug!("Shell exited with {}", status);
                    exited.store(true, Ordering::Release);
                    break;
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!("Exit watcher failed: {}", error);
                    exited.store(true, Ordering::Release);
                    break;
                }
            }
            thread::sleep(EXIT_POLL_INTERVAL);
        })
        .expect("failed to spawn exit watcher thread");
}
