//! Host workspace contract for Vaultterm.
//!
//! The host application owns panes, splitting, and focus; this crate
//! models the slice of that surface the terminal plugin consumes: a
//! vault with a base path, a panel capability interface views implement,
//! and a workspace that instantiates registered views and drives their
//! lifecycle hooks. The in-memory `Workspace` here is what the plugin and
//! the tests run against; an embedding host provides the same calls.

mod panel;
mod vault;

pub use panel::{PanelChrome, PanelContext, PanelSize, PanelView};
pub use vault::Vault;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use theme::HostTheme;
use uuid::Uuid;

pub type PanelId = Uuid;

/// How a new panel is split off from the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    Horizontal,
    Vertical,
}

/// Builds a fresh view instance for a registered view type.
///
/// The factory must attach everything the view needs before its open hook
/// runs — for terminal views, the current settings snapshot.
pub type ViewFactory = Box<dyn Fn() -> Box<dyn PanelView>>;

/// A workspace panel hosting one view instance.
pub struct Panel {
    pub id: PanelId,
    pub view_type: String,
    pub chrome: PanelChrome,
    pub size: PanelSize,
    view: Box<dyn PanelView>,
}

impl Panel {
    pub fn view(&self) -> &dyn PanelView {
        self.view.as_ref()
    }

    /// Downcast the hosted view to a concrete type.
    pub fn view_as<T: PanelView>(&self) -> Option<&T> {
        self.view.as_any().downcast_ref::<T>()
    }

    pub fn view_as_mut<T: PanelView>(&mut self) -> Option<&mut T> {
        self.view.as_any_mut().downcast_mut::<T>()
    }
}

/// In-memory workspace: view registry plus live panels in creation order.
pub struct Workspace {
    vault: Vault,
    theme: HostTheme,
    factories: FxHashMap<String, ViewFactory>,
    panels: IndexMap<PanelId, Panel, FxBuildHasher>,
    active: Option<PanelId>,
    focused: Option<PanelId>,
}

impl Workspace {
    pub fn new(vault: Vault, theme: HostTheme) -> Self {
        Self {
            vault,
            theme,
            factories: FxHashMap::default(),
            panels: IndexMap::default(),
            active: None,
            focused: None,
        }
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn theme(&self) -> &HostTheme {
        &self.theme
    }

    /// Register (or replace) the factory for a view type.
    pub fn register_view(&mut self, view_type: impl Into<String>, factory: ViewFactory) {
        let view_type = view_type.into();
        if self.factories.insert(view_type.clone(), factory).is_some() {
            tracing::warn!("View type {:?} registered twice; replacing", view_type);
        }
    }

    /// Split a new panel off the active one and open the registered view
    /// in it.
    ///
    /// The factory runs first (attaching its configuration), then the
    /// view's open hook, with the panel's chrome and initial size in
    /// scope. The new panel becomes active (revealed).
    pub fn open_panel(&mut self, view_type: &str, split: SplitDirection) -> Result<PanelId> {
        let factory = self
            .factories
            .get(view_type)
            .with_context(|| format!("no view registered for type {:?}", view_type))?;
        let mut view = factory();

        let id = Uuid::new_v4();
        let size = self.split_size(split);
        let mut chrome = PanelChrome::default();

        let mut cx = PanelContext::new(&self.vault, &self.theme, &mut chrome, size);
        view.on_open(&mut cx);
        let focus_requested = cx.focus_requested();

        self.panels.insert(
            id,
            Panel {
                id,
                view_type: view_type.to_string(),
                chrome,
                size,
                view,
            },
        );
        self.active = Some(id);
        if focus_requested {
            self.focused = Some(id);
        }

        tracing::debug!("Opened {:?} panel {}", view_type, id);
        Ok(id)
    }

    /// Halve the active panel along the split axis; full default size when
    /// nothing is open yet.
    fn split_size(&self, split: SplitDirection) -> PanelSize {
        let Some(base) = self
            .active
            .and_then(|id| self.panels.get(&id))
            .map(|panel| panel.size)
        else {
            return PanelSize::default();
        };
        match split {
            SplitDirection::Horizontal => PanelSize {
                width: base.width,
                height: base.height / 2.0,
            },
            SplitDirection::Vertical => PanelSize {
                width: base.width / 2.0,
                height: base.height,
            },
        }
    }

    /// Bring a panel to the front (make it active).
    pub fn reveal_panel(&mut self, id: PanelId) -> bool {
        if self.panels.contains_key(&id) {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    /// Move keyboard focus to a panel.
    pub fn focus_panel(&mut self, id: PanelId) -> bool {
        if self.panels.contains_key(&id) {
            self.focused = Some(id);
            true
        } else {
            false
        }
    }

    pub fn active_panel(&self) -> Option<PanelId> {
        self.active
    }

    pub fn focused_panel(&self) -> Option<PanelId> {
        self.focused
    }

    /// Deliver a host resize to a panel and its view.
    pub fn resize_panel(&mut self, id: PanelId, size: PanelSize) {
        if let Some(panel) = self.panels.get_mut(&id) {
            panel.size = size;
            panel.view.on_resize(size);
        }
    }

    /// Close one panel, running its close hook.
    pub fn close_panel(&mut self, id: PanelId) -> bool {
        let Some(mut panel) = self.panels.shift_remove(&id) else {
            return false;
        };
        panel.view.on_close();
        if self.active == Some(id) {
            self.active = self.panels.keys().last().copied();
        }
        if self.focused == Some(id) {
            self.focused = None;
        }
        true
    }

    /// Detach every panel of a view type, running each close hook before
    /// returning. Returns how many panels were closed.
    pub fn detach_panels_of_type(&mut self, view_type: &str) -> usize {
        let ids: Vec<PanelId> = self
            .panels
            .values()
            .filter(|panel| panel.view_type == view_type)
            .map(|panel| panel.id)
            .collect();
        for id in &ids {
            self.close_panel(*id);
        }
        ids.len()
    }

    pub fn panels_of_type(&self, view_type: &str) -> Vec<PanelId> {
        self.panels
            .values()
            .filter(|panel| panel.view_type == view_type)
            .map(|panel| panel.id)
            .collect()
    }

    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.panels.get(&id)
    }

    pub fn panel_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        self.panels.get_mut(&id)
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records lifecycle events so tests can assert ordering.
    struct ProbeView {
        log: Rc<RefCell<Vec<String>>>,
        take_focus: bool,
        opened_with_vault: Option<Option<std::path::PathBuf>>,
    }

    impl PanelView for ProbeView {
        fn view_type(&self) -> &'static str {
            "probe"
        }
        fn display_text(&self) -> String {
            "Probe".into()
        }
        fn icon_name(&self) -> &'static str {
            "beaker"
        }
        fn on_open(&mut self, cx: &mut PanelContext) {
            self.opened_with_vault = Some(cx.vault().base_path().map(|p| p.to_path_buf()));
            self.log.borrow_mut().push("open".into());
            if self.take_focus {
                cx.request_focus();
            }
        }
        fn on_resize(&mut self, size: PanelSize) {
            self.log.borrow_mut().push(format!("resize {}x{}", size.width, size.height));
        }
        fn on_close(&mut self) {
            self.log.borrow_mut().push("close".into());
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn probe_workspace(take_focus: bool) -> (Workspace, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let factory_log = log.clone();
        let mut workspace = Workspace::new(Vault::new("/tmp/vault"), HostTheme::new());
        workspace.register_view(
            "probe",
            Box::new(move || {
                factory_log.borrow_mut().push("factory".into());
                Box::new(ProbeView {
                    log: factory_log.clone(),
                    take_focus,
                    opened_with_vault: None,
                })
            }),
        );
        (workspace, log)
    }

    #[test]
    fn factory_runs_before_open_hook() {
        let (mut workspace, log) = probe_workspace(false);
        workspace.open_panel("probe", SplitDirection::Horizontal).unwrap();
        assert_eq!(*log.borrow(), vec!["factory", "open"]);
    }

    #[test]
    fn open_hook_sees_the_vault() {
        let (mut workspace, _log) = probe_workspace(false);
        let id = workspace.open_panel("probe", SplitDirection::Horizontal).unwrap();
        let view = workspace.panel(id).unwrap().view_as::<ProbeView>().unwrap();
        assert_eq!(
            view.opened_with_vault,
            Some(Some(std::path::PathBuf::from("/tmp/vault")))
        );
    }

    #[test]
    fn unregistered_view_type_errors() {
        let mut workspace = Workspace::new(Vault::detached(), HostTheme::new());
        assert!(workspace.open_panel("probe", SplitDirection::Horizontal).is_err());
    }

    #[test]
    fn focus_follows_the_open_hook_request() {
        let (mut workspace, _) = probe_workspace(true);
        let id = workspace.open_panel("probe", SplitDirection::Horizontal).unwrap();
        assert_eq!(workspace.focused_panel(), Some(id));

        let (mut workspace, _) = probe_workspace(false);
        let id = workspace.open_panel("probe", SplitDirection::Horizontal).unwrap();
        assert_eq!(workspace.focused_panel(), None);

        // The host can still focus the panel explicitly.
        assert!(workspace.focus_panel(id));
        assert_eq!(workspace.focused_panel(), Some(id));
    }

    #[test]
    fn horizontal_split_halves_the_active_panel_height() {
        let (mut workspace, _) = probe_workspace(false);
        let first = workspace.open_panel("probe", SplitDirection::Horizontal).unwrap();
        let first_size = workspace.panel(first).unwrap().size;

        let second = workspace.open_panel("probe", SplitDirection::Horizontal).unwrap();
        let second_size = workspace.panel(second).unwrap().size;
        assert_eq!(second_size.width, first_size.width);
        assert_eq!(second_size.height, first_size.height / 2.0);
    }

    #[test]
    fn resize_reaches_the_view() {
        let (mut workspace, log) = probe_workspace(false);
        let id = workspace.open_panel("probe", SplitDirection::Horizontal).unwrap();

        workspace.resize_panel(id, PanelSize { width: 640.0, height: 480.0 });

        assert!(log.borrow().iter().any(|entry| entry == "resize 640x480"));
        assert_eq!(
            workspace.panel(id).unwrap().size,
            PanelSize { width: 640.0, height: 480.0 }
        );
    }

    #[test]
    fn detach_closes_every_panel_of_the_type_synchronously() {
        let (mut workspace, log) = probe_workspace(false);
        workspace.open_panel("probe", SplitDirection::Horizontal).unwrap();
        workspace.open_panel("probe", SplitDirection::Horizontal).unwrap();

        let closed = workspace.detach_panels_of_type("probe");

        assert_eq!(closed, 2);
        assert_eq!(workspace.panel_count(), 0);
        assert_eq!(
            log.borrow().iter().filter(|entry| *entry == "close").count(),
            2
        );
        assert_eq!(workspace.active_panel(), None);
    }

    #[test]
    fn close_panel_is_single_shot() {
        let (mut workspace, log) = probe_workspace(false);
        let id = workspace.open_panel("probe", SplitDirection::Horizontal).unwrap();

        assert!(workspace.close_panel(id));
        assert!(!workspace.close_panel(id));
        assert_eq!(
            log.borrow().iter().filter(|entry| *entry == "close").count(),
            1
        );
    }
}
