//! Centralized configuration constants for Vaultterm.
//!
//! Compile-time constants, organized by component.

/// Terminal session configuration.
pub mod terminal {
    /// Default shell command (Windows).
    #[cfg(target_os = "windows")]
    pub const DEFAULT_COMMAND: &str = "powershell";

    /// Default shell command (POSIX-like platforms).
    #[cfg(not(target_os = "windows"))]
    pub const DEFAULT_COMMAND: &str = "bash -i";

    /// Default font list. Later entries are fallbacks for glyphs the
    /// primary font lacks.
    pub const DEFAULT_FONT_FAMILY: &str = "'Fira Code', Cambria, monospace";

    /// Default font size in points.
    pub const DEFAULT_FONT_SIZE: f32 = 12.0;
    /// Minimum allowed font size.
    pub const MIN_FONT_SIZE: f32 = 6.0;
    /// Maximum allowed font size.
    pub const MAX_FONT_SIZE: f32 = 72.0;

    /// Default line height multiplier (1.0 = single-spaced).
    pub const DEFAULT_LINE_HEIGHT: f32 = 1.4;
    /// Maximum allowed line height multiplier.
    pub const MAX_LINE_HEIGHT: f32 = 4.0;

    /// Whether a newly opened terminal panel takes keyboard focus.
    pub const DEFAULT_FOCUS_ON_OPEN: bool = true;

    /// Whether each open-terminal command creates a new panel instead of
    /// replacing the existing one.
    pub const DEFAULT_ALLOW_MULTIPLE: bool = false;

    /// Approximate advance width of a monospace cell as a fraction of the
    /// font size. Used to estimate cell metrics before the renderer
    /// reports real ones.
    pub const CELL_WIDTH_RATIO: f32 = 0.6;
}

/// Timing configuration.
pub mod timing {
    use std::time::Duration;

    /// Quiet period for collapsing bursts of panel resize events.
    /// A tunable constant, not a protocol requirement.
    pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

    /// Debounce window for config file change notifications.
    pub const CONFIG_WATCH_DEBOUNCE: Duration = Duration::from_millis(100);
}

/// Settings file validation limits.
pub mod limits {
    /// Maximum settings file size in bytes (64 KB).
    /// Settings files should be tiny; anything larger is suspicious.
    pub const MAX_FILE_SIZE: u64 = 64 * 1024;

    /// Maximum length for string fields (shell command, font family).
    pub const MAX_STRING_LENGTH: usize = 1024;
}

#[cfg(test)]
#[allow(clippy::assertions_on_constants)]
mod tests {
    use super::*;

    #[test]
    fn font_size_range_allows_zoom() {
        let zoom_range = terminal::MAX_FONT_SIZE / terminal::MIN_FONT_SIZE;
        assert!(
            zoom_range >= 2.0,
            "Font size range ({:.1}x) should allow at least 2x zoom",
            zoom_range
        );
    }

    #[test]
    fn default_font_size_within_bounds() {
        assert!(terminal::DEFAULT_FONT_SIZE >= terminal::MIN_FONT_SIZE);
        assert!(terminal::DEFAULT_FONT_SIZE <= terminal::MAX_FONT_SIZE);
    }

    #[test]
    fn default_command_is_platform_shell() {
        #[cfg(target_os = "windows")]
        assert_eq!(terminal::DEFAULT_COMMAND, "powershell");
        #[cfg(not(target_os = "windows"))]
        assert_eq!(terminal::DEFAULT_COMMAND, "bash -i");
    }

    #[test]
    fn max_string_length_allows_long_shell_commands() {
        let long_command = "/opt/homebrew/Cellar/bash/5.2.26/bin/bash --rcfile ~/.config/bash/interactive.rc -i";
        assert!(limits::MAX_STRING_LENGTH >= long_command.len());
    }
}
