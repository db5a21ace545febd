//! TOML config file support.
//!
//! Config location: `~/.config/vaultterm/config.toml`

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Style and behavior settings for terminal panels.
///
/// Loaded once at plugin start; each panel receives a read-only clone at
/// creation time and never observes later mutations. Changing a value
/// takes effect when the panel is closed and reopened.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StyleSettings {
    /// Shell command line, tokenized at spawn time (e.g. `bash -i`).
    pub terminal_command: String,
    /// Comma-separated font list for the terminal surface.
    pub font_family: String,
    /// Font size in points.
    pub font_size: f32,
    /// Move keyboard focus to the terminal panel when it opens.
    pub focus_on_open: bool,
    /// Open a new panel per command instead of replacing the existing one.
    pub allow_multiple_terminals: bool,
    /// Line height multiplier (1.0 = single-spaced).
    pub line_height: f32,
}

impl Default for StyleSettings {
    fn default() -> Self {
        use crate::constants::terminal;
        Self {
            terminal_command: terminal::DEFAULT_COMMAND.to_string(),
            font_family: terminal::DEFAULT_FONT_FAMILY.to_string(),
            font_size: terminal::DEFAULT_FONT_SIZE,
            focus_on_open: terminal::DEFAULT_FOCUS_ON_OPEN,
            allow_multiple_terminals: terminal::DEFAULT_ALLOW_MULTIPLE,
            line_height: terminal::DEFAULT_LINE_HEIGHT,
        }
    }
}

impl StyleSettings {
    /// Clamp numeric fields back into their valid ranges and drop
    /// oversized strings, logging what was rejected.
    ///
    /// A blank `terminal-command` is deliberately left alone: it fails at
    /// spawn time like any other unlaunchable command rather than being
    /// rejected here.
    fn sanitized(mut self) -> Self {
        use crate::constants::{limits, terminal};

        if !(self.font_size > 0.0) || self.font_size.is_nan() {
            tracing::warn!("Invalid font-size {}, using default", self.font_size);
            self.font_size = terminal::DEFAULT_FONT_SIZE;
        }
        self.font_size = self
            .font_size
            .clamp(terminal::MIN_FONT_SIZE, terminal::MAX_FONT_SIZE);

        if !(self.line_height > 0.0) || self.line_height.is_nan() {
            tracing::warn!("Invalid line-height {}, using default", self.line_height);
            self.line_height = terminal::DEFAULT_LINE_HEIGHT;
        }
        self.line_height = self.line_height.min(terminal::MAX_LINE_HEIGHT);

        if self.terminal_command.len() > limits::MAX_STRING_LENGTH {
            tracing::warn!("terminal-command too long, using default");
            self.terminal_command = terminal::DEFAULT_COMMAND.to_string();
        }
        if self.font_family.len() > limits::MAX_STRING_LENGTH {
            tracing::warn!("font-family too long, using default");
            self.font_family = terminal::DEFAULT_FONT_FAMILY.to_string();
        }

        self
    }
}

/// Default config file content with comments (generated on first launch).
const DEFAULT_CONFIG: &str = r#"# Vaultterm Configuration
# Close and reopen the terminal panel for changes to take effect.

# Shell command to run inside the terminal panel.
# Default: "powershell" on Windows, "bash -i" elsewhere.
terminal-command = "COMMAND_PLACEHOLDER"

# Terminal font list. Fonts must be installed on this computer; separate
# multiple fonts with commas (e.g. to add an emoji fallback).
font-family = "'Fira Code', Cambria, monospace"

# Terminal font size in points.
font-size = 12

# Move keyboard focus to the terminal panel when it opens.
focus-on-open = true

# Open a new terminal panel every time instead of replacing the existing
# one. This can get your workspace crowded fast.
allow-multiple-terminals = false

# Space given to each line. 1 means one line's worth; 2 is double-spaced.
line-height = 1.4
"#;

/// Return the config file path.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vaultterm").join("config.toml"))
}

/// Migrate from the legacy `data.json` settings store if it exists.
///
/// The old plugin persisted settings as camelCase JSON; carry the values
/// over so an upgrade doesn't silently reset the shell command.
fn migrate_from_json(config_dir: &Path) -> Option<StyleSettings> {
    let json_path = config_dir.join("data.json");
    let content = std::fs::read_to_string(&json_path).ok()?;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct LegacySettings {
        terminal_command: Option<String>,
        font_family: Option<String>,
        font_size: Option<f32>,
        focus_on_open: Option<bool>,
        allow_multiple_terminals: Option<bool>,
        line_height: Option<f32>,
    }

    let legacy: LegacySettings = serde_json::from_str(&content).ok()?;
    tracing::info!("Migrated settings from data.json");

    let defaults = StyleSettings::default();
    Some(StyleSettings {
        terminal_command: legacy.terminal_command.unwrap_or(defaults.terminal_command),
        font_family: legacy.font_family.unwrap_or(defaults.font_family),
        font_size: legacy.font_size.unwrap_or(defaults.font_size),
        focus_on_open: legacy.focus_on_open.unwrap_or(defaults.focus_on_open),
        allow_multiple_terminals: legacy
            .allow_multiple_terminals
            .unwrap_or(defaults.allow_multiple_terminals),
        line_height: legacy.line_height.unwrap_or(defaults.line_height),
    })
}

/// Ensure the config file exists, creating a default if missing.
/// Returns the path to the config file.
pub fn ensure_config_file() -> Option<PathBuf> {
    let path = config_path()?;
    ensure_config_file_at(&path)
}

fn ensure_config_file_at(path: &Path) -> Option<PathBuf> {
    if !path.exists() {
        let parent = path.parent()?;
        std::fs::create_dir_all(parent).ok()?;

        let content = DEFAULT_CONFIG.replace(
            "COMMAND_PLACEHOLDER",
            crate::constants::terminal::DEFAULT_COMMAND,
        );
        std::fs::write(path, content).ok()?;
        tracing::info!("Created default config at {:?}", path);

        // Carry over legacy settings, keeping the generated comments.
        if let Some(migrated) = migrate_from_json(parent) {
            save_settings_to(path, &migrated);
        }
    }
    Some(path.to_path_buf())
}

/// Load and parse the config file. Returns defaults on any error.
pub fn load_config() -> StyleSettings {
    let Some(path) = config_path() else {
        return StyleSettings::default();
    };
    load_config_from(&path)
}

fn load_config_from(path: &Path) -> StyleSettings {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to read config: {}", e);
            }
            return StyleSettings::default();
        }
    };

    // Size guard
    if content.len() > crate::constants::limits::MAX_FILE_SIZE as usize {
        tracing::warn!(
            "Config file too large ({} bytes), using defaults",
            content.len()
        );
        return StyleSettings::default();
    }

    match toml::from_str::<StyleSettings>(&content) {
        Ok(settings) => settings.sanitized(),
        Err(e) => {
            tracing::warn!("Failed to parse config.toml: {}", e);
            StyleSettings::default()
        }
    }
}

/// Write the given settings into the config file, preserving comments
/// and formatting.
pub fn save_settings(settings: &StyleSettings) {
    let Some(path) = config_path() else {
        return;
    };
    save_settings_to(&path, settings);
}

fn save_settings_to(path: &Path, settings: &StyleSettings) {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    let mut doc = match content.parse::<toml_edit::DocumentMut>() {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!("Config file is not valid TOML, not saving: {}", e);
            return;
        }
    };

    doc["terminal-command"] = toml_edit::value(settings.terminal_command.clone());
    doc["font-family"] = toml_edit::value(settings.font_family.clone());
    doc["font-size"] = toml_edit::value(settings.font_size as f64);
    doc["focus-on-open"] = toml_edit::value(settings.focus_on_open);
    doc["allow-multiple-terminals"] = toml_edit::value(settings.allow_multiple_terminals);
    doc["line-height"] = toml_edit::value(settings.line_height as f64);

    if let Err(e) = std::fs::write(path, doc.to_string()) {
        tracing::warn!("Failed to save settings: {}", e);
    }
}

/// Watch the config file and report settings changes.
///
/// File events are debounced and deduplicated; `on_change` runs on the
/// watcher's thread with the freshly loaded settings only when they
/// differ from the previous load. Returns the watcher handle — drop it to
/// stop watching.
pub fn watch_config(
    on_change: impl Fn(StyleSettings) + Send + 'static,
) -> Option<notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>> {
    use notify_debouncer_mini::new_debouncer;

    let path = config_path()?;
    let watch_dir = path.parent()?.to_path_buf();

    let current = std::sync::Arc::new(parking_lot::Mutex::new(load_config()));
    let path_clone = path.clone();

    let mut debouncer = new_debouncer(
        crate::constants::timing::CONFIG_WATCH_DEBOUNCE,
        move |res: Result<Vec<notify_debouncer_mini::DebouncedEvent>, _>| {
            let Ok(events) = res else { return };
            if !events.iter().any(|event| event.path == path_clone) {
                return;
            }

            let new_settings = load_config_from(&path_clone);
            let mut prev = current.lock();
            if new_settings != *prev {
                tracing::info!("Config file changed, reloading");
                *prev = new_settings.clone();
                drop(prev);
                on_change(new_settings);
            }
        },
    )
    .ok()?;

    debouncer
        .watcher()
        .watch(&watch_dir, notify::RecursiveMode::NonRecursive)
        .ok()?;

    tracing::info!("Watching config file: {:?}", path);
    Some(debouncer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn temp_config(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_config_from(&dir.path().join("config.toml"));
        assert_eq!(settings, StyleSettings::default());
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let (_dir, path) = temp_config("font-size = 18\n");
        let settings = load_config_from(&path);

        assert_eq!(settings.font_size, 18.0);
        assert_eq!(
            settings.terminal_command,
            StyleSettings::default().terminal_command
        );
        assert_eq!(settings.line_height, StyleSettings::default().line_height);
    }

    #[test]
    fn invalid_toml_yields_defaults() {
        let (_dir, path) = temp_config("this is { not toml");
        assert_eq!(load_config_from(&path), StyleSettings::default());
    }

    #[test]
    fn oversized_file_yields_defaults() {
        let big = format!("terminal-command = \"zsh\"\n# {}\n", "x".repeat(70 * 1024));
        let (_dir, path) = temp_config(&big);
        assert_eq!(load_config_from(&path), StyleSettings::default());
    }

    #[test]
    fn nonpositive_sizes_are_replaced() {
        let (_dir, path) = temp_config("font-size = -3\nline-height = 0.0\n");
        let settings = load_config_from(&path);

        assert_eq!(settings.font_size, StyleSettings::default().font_size);
        assert_eq!(settings.line_height, StyleSettings::default().line_height);
    }

    #[test]
    fn out_of_range_font_size_is_clamped() {
        let (_dir, path) = temp_config("font-size = 500\n");
        let settings = load_config_from(&path);
        assert_eq!(settings.font_size, crate::constants::terminal::MAX_FONT_SIZE);
    }

    #[test]
    fn blank_command_survives_load() {
        // A blank command is a spawn-time failure, not a config error.
        let (_dir, path) = temp_config("terminal-command = \"\"\n");
        assert_eq!(load_config_from(&path).terminal_command, "");
    }

    #[test]
    fn default_config_parses_to_defaults() {
        let content = DEFAULT_CONFIG.replace(
            "COMMAND_PLACEHOLDER",
            crate::constants::terminal::DEFAULT_COMMAND,
        );
        let (_dir, path) = temp_config(&content);
        assert_eq!(load_config_from(&path), StyleSettings::default());
    }

    #[test]
    fn save_preserves_comments_and_roundtrips() {
        let content = DEFAULT_CONFIG.replace(
            "COMMAND_PLACEHOLDER",
            crate::constants::terminal::DEFAULT_COMMAND,
        );
        let (_dir, path) = temp_config(&content);

        let changed = StyleSettings {
            terminal_command: "zsh -l".to_string(),
            font_size: 16.0,
            allow_multiple_terminals: true,
            ..StyleSettings::default()
        };
        save_settings_to(&path, &changed);

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(
            saved.contains("# Vaultterm Configuration"),
            "comments should survive a save"
        );
        assert_eq!(load_config_from(&path), changed);
    }

    #[test]
    fn ensure_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vaultterm").join("config.toml");

        let created = ensure_config_file_at(&path);
        assert_eq!(created, Some(path.clone()));
        assert!(path.exists());
        assert_eq!(load_config_from(&path), StyleSettings::default());

        // Second call is a no-op.
        assert_eq!(ensure_config_file_at(&path), Some(path));
    }

    #[test]
    fn legacy_data_json_is_migrated() {
        let dir = TempDir::new().unwrap();
        let config_dir = dir.path().join("vaultterm");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("data.json"),
            r#"{"terminalCommand": "fish", "fontSize": 14, "allowMultipleTerminals": true}"#,
        )
        .unwrap();

        let path = config_dir.join("config.toml");
        ensure_config_file_at(&path).unwrap();

        let settings = load_config_from(&path);
        assert_eq!(settings.terminal_command, "fish");
        assert_eq!(settings.font_size, 14.0);
        assert!(settings.allow_multiple_terminals);
        // Unspecified keys keep their defaults.
        assert_eq!(settings.font_family, StyleSettings::default().font_family);
    }
}
