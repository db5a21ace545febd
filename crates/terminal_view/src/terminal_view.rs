//! Terminal panel view layer.
//!
//! Pairs a shell process bridge with an emulator surface and drives both
//! from the host panel's lifecycle hooks.

mod session;
mod surface;
mod view;

pub use session::TerminalSession;
pub use surface::{Listener, TerminalSurface};
pub use view::{TerminalView, VIEW_TYPE};
