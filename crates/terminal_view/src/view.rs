//! The terminal panel controller.

use crate::session::TerminalSession;
use settings::StyleSettings;
use std::any::Any;
use vaultterm_workspace::{PanelChrome, PanelContext, PanelSize, PanelView};

/// The fixed view type name this plugin registers with the host.
pub const VIEW_TYPE: &str = "terminal";

/// Panel view hosting one terminal session.
///
/// Constructed by the registered factory with the configuration snapshot
/// already attached, so the open hook never races settings mutation.
pub struct TerminalView {
    settings: StyleSettings,
    session: Option<TerminalSession>,
}

impl TerminalView {
    pub fn new(settings: StyleSettings) -> Self {
        Self {
            settings,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&TerminalSession> {
        self.session.as_ref()
    }

    pub fn settings(&self) -> &StyleSettings {
        &self.settings
    }
}

/// The terminal fills the whole panel; the host's title bar would cover
/// the top grid row, so hide its text and let clicks fall through while
/// keeping the action buttons usable.
fn adjust_chrome(chrome: &mut PanelChrome) {
    chrome.title_opacity = 0.0;
    chrome.header_transparent = true;
    chrome.header_click_through = true;
}

impl PanelView for TerminalView {
    fn view_type(&self) -> &'static str {
        VIEW_TYPE
    }

    fn display_text(&self) -> String {
        "Terminal".to_string()
    }

    fn icon_name(&self) -> &'static str {
        "code-glyph"
    }

    fn on_open(&mut self, cx: &mut PanelContext) {
        adjust_chrome(cx.chrome_mut());

        let working_dir = cx.vault().base_path().map(|path| path.to_path_buf());
        let session = TerminalSession::open(&self.settings, cx.theme(), working_dir.as_deref());

        session.schedule_initial_resize(cx.size());
        if self.settings.focus_on_open {
            cx.request_focus();
        }

        self.session = Some(session);
    }

    fn on_resize(&mut self, size: PanelSize) {
        if let Some(session) = &self.session {
            session.request_resize(size);
        }
    }

    fn on_close(&mut self) {
        if let Some(session) = &self.session {
            session.dispose();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use theme::HostTheme;
    use vaultterm_workspace::{SplitDirection, Vault, Workspace};

    fn register_terminal(workspace: &mut Workspace, settings: StyleSettings) {
        workspace.register_view(
            VIEW_TYPE,
            Box::new(move || Box::new(TerminalView::new(settings.clone()))),
        );
    }

    fn cat_settings(focus_on_open: bool) -> StyleSettings {
        StyleSettings {
            terminal_command: "cat".to_string(),
            focus_on_open,
            ..StyleSettings::default()
        }
    }

    #[cfg(unix)]
    #[test]
    fn opening_the_panel_starts_a_session_and_adjusts_chrome() {
        let mut workspace = Workspace::new(Vault::detached(), HostTheme::new());
        register_terminal(&mut workspace, cat_settings(true));

        let id = workspace
            .open_panel(VIEW_TYPE, SplitDirection::Horizontal)
            .unwrap();

        let panel = workspace.panel(id).unwrap();
        assert_eq!(panel.chrome.title_opacity, 0.0);
        assert!(panel.chrome.header_transparent);
        assert!(panel.chrome.header_click_through);
        assert_eq!(panel.view().display_text(), "Terminal");
        assert_eq!(panel.view().icon_name(), "code-glyph");

        let view = panel.view_as::<TerminalView>().unwrap();
        assert!(view.session().unwrap().surface().is_bound());

        workspace.close_panel(id);
    }

    #[cfg(unix)]
    #[test]
    fn focus_on_open_setting_controls_focus() {
        let mut workspace = Workspace::new(Vault::detached(), HostTheme::new());
        register_terminal(&mut workspace, cat_settings(true));
        let id = workspace
            .open_panel(VIEW_TYPE, SplitDirection::Horizontal)
            .unwrap();
        assert_eq!(workspace.focused_panel(), Some(id));
        workspace.close_panel(id);

        let mut workspace = Workspace::new(Vault::detached(), HostTheme::new());
        register_terminal(&mut workspace, cat_settings(false));
        let id = workspace
            .open_panel(VIEW_TYPE, SplitDirection::Horizontal)
            .unwrap();
        assert_eq!(workspace.focused_panel(), None);
        workspace.close_panel(id);
    }

    #[cfg(unix)]
    #[test]
    fn vault_base_path_becomes_the_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let canonical = dir.path().canonicalize().unwrap();

        let mut workspace = Workspace::new(
            Vault::new(canonical.clone()),
            HostTheme::new(),
        );
        register_terminal(
            &mut workspace,
            StyleSettings {
                terminal_command: "pwd".to_string(),
                ..StyleSettings::default()
            },
        );

        let id = workspace
            .open_panel(VIEW_TYPE, SplitDirection::Horizontal)
            .unwrap();
        let view = workspace.panel(id).unwrap().view_as::<TerminalView>().unwrap();
        let surface = view.session().unwrap().surface().clone();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !surface.row_text(0).contains(&*canonical.to_string_lossy()) {
            assert!(
                std::time::Instant::now() < deadline,
                "pwd output never arrived; row was {:?}",
                surface.row_text(0)
            );
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        workspace.close_panel(id);
    }

    #[cfg(unix)]
    #[test]
    fn closing_the_panel_disposes_the_session() {
        let mut workspace = Workspace::new(Vault::detached(), HostTheme::new());
        register_terminal(&mut workspace, cat_settings(false));

        let id = workspace
            .open_panel(VIEW_TYPE, SplitDirection::Horizontal)
            .unwrap();
        let exited = {
            let view = workspace.panel(id).unwrap().view_as::<TerminalView>().unwrap();
            let surface = view.session().unwrap().surface().clone();
            assert!(surface.is_bound());
            surface
        };

        workspace.close_panel(id);
        assert!(exited.is_disposed());
    }

    #[test]
    fn close_without_open_is_a_no_op() {
        let mut view = TerminalView::new(StyleSettings::default());
        view.on_close();
        view.on_close();
    }

    #[test]
    fn resize_before_open_is_a_no_op() {
        let mut view = TerminalView::new(StyleSettings::default());
        view.on_resize(PanelSize {
            width: 100.0,
            height: 100.0,
        });
    }
}
