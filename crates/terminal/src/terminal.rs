//! Terminal session core.
//!
//! Command-line tokenization, the shell process bridge, and the output
//! pump that feeds process bytes into the emulator grid. This crate is the
//! pure logic layer — it has no host or rendering dependencies.

pub mod bridge;
pub mod cmdline;
pub mod pump;
pub mod types;

pub use bridge::ShellBridge;
pub use cmdline::tokenize;
pub use pump::OutputPump;
pub use types::{CellMetrics, TermSize};
