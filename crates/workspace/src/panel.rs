//! Panel capability interface and chrome state.

use crate::Vault;
use std::any::Any;
use theme::HostTheme;

/// Pixel dimensions of a panel's content area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSize {
    pub width: f32,
    pub height: f32,
}

impl Default for PanelSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Host-drawn decorations around a panel's content.
///
/// Views may adjust these cosmetically (the terminal hides its title and
/// lets the header click through); the host renders whatever is set.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelChrome {
    /// Title text opacity, 0.0 (hidden) to 1.0.
    pub title_opacity: f32,
    /// Draw the header with a transparent background.
    pub header_transparent: bool,
    /// Let pointer events pass through the header to the content below.
    pub header_click_through: bool,
}

impl Default for PanelChrome {
    fn default() -> Self {
        Self {
            title_opacity: 1.0,
            header_transparent: false,
            header_click_through: false,
        }
    }
}

/// Everything a view can reach while its open hook runs.
pub struct PanelContext<'a> {
    vault: &'a Vault,
    theme: &'a HostTheme,
    chrome: &'a mut PanelChrome,
    size: PanelSize,
    focus_requested: bool,
}

impl<'a> PanelContext<'a> {
    pub(crate) fn new(
        vault: &'a Vault,
        theme: &'a HostTheme,
        chrome: &'a mut PanelChrome,
        size: PanelSize,
    ) -> Self {
        Self {
            vault,
            theme,
            chrome,
            size,
            focus_requested: false,
        }
    }

    pub fn vault(&self) -> &Vault {
        self.vault
    }

    /// The host's current theme, for sampling colors at creation time.
    pub fn theme(&self) -> &HostTheme {
        self.theme
    }

    pub fn chrome_mut(&mut self) -> &mut PanelChrome {
        self.chrome
    }

    /// The panel's content size at open time.
    pub fn size(&self) -> PanelSize {
        self.size
    }

    /// Ask the workspace to move keyboard focus to this panel once the
    /// open hook returns.
    pub fn request_focus(&mut self) {
        self.focus_requested = true;
    }

    pub(crate) fn focus_requested(&self) -> bool {
        self.focus_requested
    }
}

/// The capability interface a hosted view implements.
///
/// An interface-implementation pattern, not inheritance: the workspace
/// owns panels and calls these hooks; the view owns whatever lives inside
/// the panel.
pub trait PanelView: Any {
    /// The registered view type this instance belongs to.
    fn view_type(&self) -> &'static str;

    /// Text for the panel's title area.
    fn display_text(&self) -> String;

    /// Name of the host icon shown on the panel tab.
    fn icon_name(&self) -> &'static str;

    /// The panel is live; acquire resources.
    fn on_open(&mut self, cx: &mut PanelContext);

    /// The host laid the panel out at a new pixel size.
    fn on_resize(&mut self, size: PanelSize);

    /// The panel is going away; release resources. Must tolerate being
    /// called more than once.
    fn on_close(&mut self);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
