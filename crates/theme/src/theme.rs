//! Theme system for Vaultterm.
//!
//! The host application exposes its visual theme as a table of named
//! variables whose values are CSS-style color strings. Terminal colors are
//! resolved from that table once per surface, at creation time — a theme
//! change after that point does not restyle an open terminal.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Render as `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Parse a CSS-style color string: `#rgb`, `#rrggbb`, or `rgb(r, g, b)`.
///
/// Returns `None` for anything else — the caller falls back to a default
/// rather than erroring, since theme variables are host-controlled.
pub fn parse_color(raw: &str) -> Option<Color> {
    let raw = raw.trim();

    if let Some(hex) = raw.strip_prefix('#') {
        if !hex.is_ascii() {
            return None;
        }
        return match hex.len() {
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
                let (r, g, b) = (digit(0)?, digit(1)?, digit(2)?);
                Some(Color::new(r * 17, g * 17, b * 17))
            }
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Color::new(channel(0)?, channel(2)?, channel(4)?))
            }
            _ => None,
        };
    }

    let body = raw
        .strip_prefix("rgb(")
        .or_else(|| raw.strip_prefix("rgba("))?
        .strip_suffix(')')?;
    let mut channels = body.split(',').map(|part| part.trim().parse::<u8>().ok());
    let r = channels.next()??;
    let g = channels.next()??;
    let b = channels.next()??;
    Some(Color::new(r, g, b))
}

/// The host theme: a snapshot of named variables and their color values.
#[derive(Debug, Clone, Default)]
pub struct HostTheme {
    vars: FxHashMap<String, String>,
}

impl HostTheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a named variable (e.g. `text-normal` → `#dcddde`).
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Look up a variable's raw value.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Colors for one terminal surface, sampled from the host theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalColors {
    pub foreground: Color,
    pub background: Color,
    pub selection: Color,
    pub cursor: Color,
    pub cursor_accent: Color,
    pub red: Color,
    pub green: Color,
    pub yellow: Color,
    pub blue: Color,
    pub magenta: Color,
    pub cyan: Color,
}

impl Default for TerminalColors {
    fn default() -> Self {
        terminal_colors(&HostTheme::default())
    }
}

/// Fallback colors for host themes that don't define a variable.
/// A dark scheme in the host's default palette.
static FALLBACKS: Lazy<FxHashMap<&'static str, Color>> = Lazy::new(|| {
    let mut table = FxHashMap::default();
    table.insert("text-normal", Color::new(0xdc, 0xdd, 0xde));
    table.insert("background-secondary-alt", Color::new(0x1a, 0x1a, 0x1a));
    table.insert("text-selection", Color::new(0x3f, 0x51, 0x85));
    table.insert("red", Color::new(0xfb, 0x46, 0x4c));
    table.insert("green", Color::new(0x44, 0xcf, 0x6e));
    table.insert("yellow", Color::new(0xe0, 0xde, 0x71));
    table.insert("blue", Color::new(0x54, 0x8a, 0xf7));
    table.insert("purple", Color::new(0xa8, 0x82, 0xff));
    table.insert("cyan", Color::new(0x53, 0xdf, 0xdd));
    table
});

/// Resolve one variable, falling back when missing or unparsable.
fn resolve(theme: &HostTheme, name: &str) -> Color {
    if let Some(raw) = theme.var(name) {
        if let Some(color) = parse_color(raw) {
            return color;
        }
        tracing::debug!("Theme variable {} has unparsable value {:?}", name, raw);
    }
    FALLBACKS
        .get(name)
        .copied()
        .unwrap_or(Color::new(0xdc, 0xdd, 0xde))
}

/// Sample terminal colors from the host theme.
///
/// Foreground, cursor, and cursor accent all track the host's normal text
/// color; the host's `purple` stands in for ANSI magenta.
pub fn terminal_colors(theme: &HostTheme) -> TerminalColors {
    TerminalColors {
        foreground: resolve(theme, "text-normal"),
        background: resolve(theme, "background-secondary-alt"),
        selection: resolve(theme, "text-selection"),
        cursor: resolve(theme, "text-normal"),
        cursor_accent: resolve(theme, "text-normal"),
        red: resolve(theme, "red"),
        green: resolve(theme, "green"),
        yellow: resolve(theme, "yellow"),
        blue: resolve(theme, "blue"),
        magenta: resolve(theme, "purple"),
        cyan: resolve(theme, "cyan"),
    }
}
