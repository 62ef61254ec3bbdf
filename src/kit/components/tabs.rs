// Tabs component for OrbitKit

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::collection::{CollectionError, CollectionOption, Navigable, OptionId, OptionRegistry};
use crate::context::{Callback, ContextProvider};
use crate::dom::{Dom, NodeId};
use crate::events::{Key, KeyboardEvent};
use crate::focus::{focus_element, focus_in, FocusFlags, FocusResult, FocusScope};
use crate::kit::utils::Orientation;

/// Resolve a requested tab index against the registered tabs.
///
/// Below range picks the first enabled tab, above range the last enabled
/// tab. An in-range disabled tab rotates forward to the next enabled one.
/// `None` when every tab is disabled.
pub fn normalize_selected<T: Navigable>(tabs: &[T], requested: isize) -> Option<usize> {
    let first = tabs.iter().position(|t| !t.is_disabled())?;
    if requested < 0 {
        return Some(first);
    }
    let requested = requested as usize;
    if requested >= tabs.len() {
        return tabs.iter().rposition(|t| !t.is_disabled());
    }
    (requested..tabs.len())
        .chain(0..requested)
        .find(|&i| !tabs[i].is_disabled())
}

/// Actions accepted by [`TabsState::apply`]
#[derive(Debug, Clone)]
pub enum TabsAction {
    SetSelectedIndex(isize),
    RegisterTab(CollectionOption<()>),
    UnregisterTab(OptionId),
    RegisterPanel(CollectionOption<()>),
    UnregisterPanel(OptionId),
}

/// Registered tabs and panels plus the selected index
#[derive(Debug, Clone, Default)]
pub struct TabsState {
    tabs: OptionRegistry<()>,
    panels: OptionRegistry<()>,
    requested: isize,
    selected: Option<usize>,
}

impl TabsState {
    pub fn new(default_index: isize) -> Self {
        Self {
            requested: default_index,
            ..Default::default()
        }
    }

    pub fn apply<D: Dom + ?Sized>(&mut self, action: TabsAction, dom: &D) {
        log::trace!("Tabs: {:?}", action);
        // Only a selection that honours the requested index is anchored to its
        // tab; otherwise the request is re-resolved as tabs come and go.
        let anchored = self
            .selected
            .filter(|&i| usize::try_from(self.requested).ok() == Some(i))
            .and_then(|i| self.tabs.get(i))
            .map(|t| t.id.clone());
        match action {
            TabsAction::SetSelectedIndex(index) => {
                self.requested = index;
                self.normalize();
                return;
            }
            TabsAction::RegisterTab(tab) => {
                self.tabs.register(tab, dom, None);
            }
            TabsAction::UnregisterTab(id) => {
                self.tabs.unregister(&id, None);
            }
            TabsAction::RegisterPanel(panel) => {
                self.panels.register(panel, dom, None);
                return;
            }
            TabsAction::UnregisterPanel(id) => {
                self.panels.unregister(&id, None);
                return;
            }
        }
        if let Some(index) = anchored.and_then(|id| self.tabs.index_of(&id)) {
            self.requested = index as isize;
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        self.selected = normalize_selected(self.tabs.options(), self.requested);
    }

    pub fn tabs(&self) -> &[CollectionOption<()>] {
        self.tabs.options()
    }

    pub fn panels(&self) -> &[CollectionOption<()>] {
        self.panels.options()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn tab_index_of(&self, id: &OptionId) -> Option<usize> {
        self.tabs.index_of(id)
    }

    /// Panels pair with tabs by position
    pub fn is_panel_selected(&self, id: &OptionId) -> bool {
        self.selected.is_some() && self.panels.index_of(id) == self.selected
    }
}

/// Properties for the Tabs component
#[derive(Debug, Clone, Default)]
pub struct TabsProps {
    /// Initially selected index
    pub default_index: Option<isize>,
    /// Defaults to horizontal
    pub orientation: Option<Orientation>,
    /// Arrow keys only move focus; Enter/Space or click select
    pub manual: Option<bool>,
    pub on_change: Option<Callback<usize>>,
}

/// Tab list with one selected tab and its panel
#[derive(Clone)]
pub struct Tabs {
    state: Arc<Mutex<TabsState>>,
    orientation: Orientation,
    manual: bool,
    on_change: Option<Callback<usize>>,
}

impl fmt::Debug for Tabs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tabs")
            .field("state", &*self.lock())
            .field("orientation", &self.orientation)
            .field("manual", &self.manual)
            .finish()
    }
}

impl Tabs {
    pub fn create(props: TabsProps, ctx: &ContextProvider) -> Self {
        let tabs = Self {
            state: Arc::new(Mutex::new(TabsState::new(props.default_index.unwrap_or(0)))),
            orientation: props.orientation.unwrap_or(Orientation::Horizontal),
            manual: props.manual.unwrap_or(false),
            on_change: props.on_change,
        };
        ctx.provide(tabs.clone());
        tabs
    }

    fn lock(&self) -> MutexGuard<'_, TabsState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&TabsState) -> R) -> R {
        f(&self.lock())
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Apply `action`. Returns the selected index when it changed.
    pub fn dispatch<D: Dom + ?Sized>(&self, action: TabsAction, dom: &D) -> Option<usize> {
        let mut state = self.lock();
        let before = state.selected_index();
        state.apply(action, dom);
        let after = state.selected_index();
        (before != after).then_some(after).flatten()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.lock().selected_index()
    }

    /// Select the tab at `index` (normalized) and notify `on_change`
    pub fn select<D: Dom + ?Sized>(&self, dom: &D, index: isize) {
        if let Some(selected) = self.dispatch(TabsAction::SetSelectedIndex(index), dom) {
            log::debug!("tab {} selected", selected);
            if let Some(on_change) = &self.on_change {
                on_change.call(selected);
            }
        }
    }

    fn select_tab<D: Dom + ?Sized>(&self, dom: &D, id: &OptionId) {
        let Some(index) = self.lock().tab_index_of(id) else {
            return;
        };
        self.select(dom, index as isize);
    }

    pub fn is_tab_selected(&self, id: &OptionId) -> bool {
        let state = self.lock();
        state.selected_index().is_some() && state.tab_index_of(id) == state.selected_index()
    }

    pub fn is_panel_selected(&self, id: &OptionId) -> bool {
        self.lock().is_panel_selected(id)
    }

    /// Roving tab index over the tab list
    pub fn tab_index(&self, id: &OptionId) -> i32 {
        if self.is_tab_selected(id) {
            0
        } else {
            -1
        }
    }

    fn tab_node(&self, id: &OptionId) -> Option<(NodeId, bool)> {
        let state = self.lock();
        let index = state.tab_index_of(id)?;
        state.tabs().get(index).map(|t| (t.node, t.disabled))
    }

    /// Move focus within the enabled tabs, then select the focused tab unless
    /// activation is manual
    fn move_focus<D: Dom + ?Sized>(&self, dom: &mut D, from: Option<NodeId>, flags: FocusFlags) {
        let nodes: Vec<NodeId> = self.with_state(|s| {
            s.tabs()
                .iter()
                .filter(|t| !t.disabled)
                .map(|t| t.node)
                .collect()
        });
        if focus_in(dom, FocusScope::Elements(&nodes), flags, from, &[]) != FocusResult::Success {
            return;
        }
        if self.manual {
            return;
        }
        let focused = dom.active_element();
        let id = self.with_state(|s| {
            s.tabs()
                .iter()
                .find(|t| Some(t.node) == focused)
                .map(|t| t.id.clone())
        });
        if let Some(id) = id {
            self.select_tab(&*dom, &id);
        }
    }

    /// `keydown` on the tab `id`
    pub fn on_tab_key_down<D: Dom + ?Sized>(
        &self,
        dom: &mut D,
        id: &OptionId,
        event: &mut KeyboardEvent,
    ) -> bool {
        let from = self.tab_node(id).map(|(node, _)| node);
        let flags = match event.key {
            Key::Enter | Key::Space => {
                event.prevent_default();
                event.stop_propagation();
                self.select_tab(&*dom, id);
                return true;
            }
            Key::Home | Key::PageUp => FocusFlags::FIRST,
            Key::End | Key::PageDown => FocusFlags::LAST,
            ref key if *key == self.orientation.next_key() => {
                FocusFlags::NEXT | FocusFlags::WRAP_AROUND
            }
            ref key if *key == self.orientation.previous_key() => {
                FocusFlags::PREVIOUS | FocusFlags::WRAP_AROUND
            }
            _ => return false,
        };
        event.prevent_default();
        event.stop_propagation();
        self.move_focus(dom, from, flags);
        true
    }

    /// `click` on the tab `id`
    pub fn on_tab_click<D: Dom + ?Sized>(&self, dom: &mut D, id: &OptionId) {
        let Some((node, disabled)) = self.tab_node(id) else {
            return;
        };
        if disabled {
            return;
        }
        focus_element(dom, node);
        self.select_tab(&*dom, id);
    }

    /// `focus` on the tab `id`; selects it under automatic activation
    pub fn on_tab_focus<D: Dom + ?Sized>(&self, dom: &D, id: &OptionId) {
        if self.manual || self.tab_node(id).map_or(true, |(_, disabled)| disabled) {
            return;
        }
        self.select_tab(dom, id);
    }
}

/// Properties shared by Tab and Tab.Panel
#[derive(Debug, Clone)]
pub struct TabProps {
    pub id: OptionId,
    pub node: NodeId,
    pub disabled: Option<bool>,
}

/// One tab of a [`Tabs`] list
#[derive(Debug)]
pub struct Tab {
    tabs: Tabs,
    id: OptionId,
}

impl Tab {
    pub fn create<D: Dom + ?Sized>(
        props: TabProps,
        ctx: &ContextProvider,
        dom: &D,
    ) -> Result<Self, CollectionError> {
        let tabs = ctx.require::<Tabs>("Tab", "Tabs")?;
        let id = props.id.clone();
        let option =
            CollectionOption::new(props.id, props.node, ()).disabled(props.disabled.unwrap_or(false));
        tabs.dispatch(TabsAction::RegisterTab(option), dom);
        Ok(Self { tabs, id })
    }

    pub fn id(&self) -> &OptionId {
        &self.id
    }

    /// `aria-selected`
    pub fn is_selected(&self) -> bool {
        self.tabs.is_tab_selected(&self.id)
    }

    pub fn tab_index(&self) -> i32 {
        self.tabs.tab_index(&self.id)
    }

    pub fn on_key_down<D: Dom + ?Sized>(&self, dom: &mut D, event: &mut KeyboardEvent) -> bool {
        self.tabs.on_tab_key_down(dom, &self.id, event)
    }

    pub fn on_click<D: Dom + ?Sized>(&self, dom: &mut D) {
        self.tabs.on_tab_click(dom, &self.id);
    }

    pub fn on_focus<D: Dom + ?Sized>(&self, dom: &D) {
        self.tabs.on_tab_focus(dom, &self.id);
    }

    pub fn unmount<D: Dom + ?Sized>(self, dom: &D) {
        self.tabs.dispatch(TabsAction::UnregisterTab(self.id), dom);
    }
}

/// Content shown while its tab is selected
#[derive(Debug)]
pub struct TabPanel {
    tabs: Tabs,
    id: OptionId,
}

impl TabPanel {
    pub fn create<D: Dom + ?Sized>(
        props: TabProps,
        ctx: &ContextProvider,
        dom: &D,
    ) -> Result<Self, CollectionError> {
        let tabs = ctx.require::<Tabs>("Tab.Panel", "Tabs")?;
        let id = props.id.clone();
        let option = CollectionOption::new(props.id, props.node, ());
        tabs.dispatch(TabsAction::RegisterPanel(option), dom);
        Ok(Self { tabs, id })
    }

    pub fn id(&self) -> &OptionId {
        &self.id
    }

    pub fn is_selected(&self) -> bool {
        self.tabs.is_panel_selected(&self.id)
    }

    pub fn unmount<D: Dom + ?Sized>(self, dom: &D) {
        self.tabs.dispatch(TabsAction::UnregisterPanel(self.id), dom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    struct Item {
        disabled: bool,
        id: OptionId,
    }

    impl Navigable for Item {
        fn id(&self) -> &OptionId {
            &self.id
        }

        fn is_disabled(&self) -> bool {
            self.disabled
        }
    }

    fn items(mask: &[bool]) -> Vec<Item> {
        mask.iter()
            .enumerate()
            .map(|(i, &disabled)| Item {
                disabled,
                id: OptionId::new(i.to_string()),
            })
            .collect()
    }

    #[test]
    fn test_normalize_selected() {
        let tabs = items(&[true, false, true, false, true]);
        assert_eq!(normalize_selected(&tabs, -3), Some(1));
        assert_eq!(normalize_selected(&tabs, 9), Some(3));
        assert_eq!(normalize_selected(&tabs, 2), Some(3));
        assert_eq!(normalize_selected(&tabs, 4), Some(1));
        assert_eq!(normalize_selected(&tabs, 1), Some(1));
        assert_eq!(normalize_selected(&items(&[true, true]), 0), None);
        assert_eq!(normalize_selected(&items(&[]), 0), None);
    }

    fn setup(disabled: &[bool], props: TabsProps) -> (MemoryDom, Tabs, Vec<Tab>, Vec<TabPanel>) {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let list = dom.append_element(body, "div");
        let ctx = ContextProvider::new();
        let tabs = Tabs::create(props, &ctx);
        let mut tab_leaves = Vec::new();
        let mut panels = Vec::new();
        for (i, &is_disabled) in disabled.iter().enumerate() {
            let node = dom.append_element(list, "button");
            if is_disabled {
                dom.set_attribute(node, "disabled", "");
            }
            let props = TabProps {
                id: OptionId::new(format!("tab-{i}")),
                node,
                disabled: Some(is_disabled),
            };
            tab_leaves.push(Tab::create(props, &ctx, &dom).unwrap());
        }
        for i in 0..disabled.len() {
            let node = dom.append_element(body, "div");
            let props = TabProps {
                id: OptionId::new(format!("panel-{i}")),
                node,
                disabled: None,
            };
            panels.push(TabPanel::create(props, &ctx, &dom).unwrap());
        }
        (dom, tabs, tab_leaves, panels)
    }

    #[test]
    fn test_default_index_skips_disabled_tab() {
        let props = TabsProps {
            default_index: Some(0),
            ..Default::default()
        };
        let (_, tabs, tab_leaves, panels) = setup(&[true, false, false], props);
        assert_eq!(tabs.selected_index(), Some(1));
        assert!(tab_leaves[1].is_selected());
        assert_eq!(tab_leaves[1].tab_index(), 0);
        assert!(panels[1].is_selected());
        assert!(!panels[0].is_selected());
    }

    #[test]
    fn test_arrow_keys_wrap_and_select_automatically() {
        let (mut dom, tabs, tab_leaves, _) = setup(&[false, true, false], TabsProps::default());
        let mut right = KeyboardEvent::new(Key::ArrowRight);
        assert!(tab_leaves[0].on_key_down(&mut dom, &mut right));
        assert_eq!(tabs.selected_index(), Some(2));

        let mut right = KeyboardEvent::new(Key::ArrowRight);
        tab_leaves[2].on_key_down(&mut dom, &mut right);
        assert_eq!(tabs.selected_index(), Some(0));

        let mut down = KeyboardEvent::new(Key::ArrowDown);
        assert!(!tab_leaves[0].on_key_down(&mut dom, &mut down));
    }

    #[test]
    fn test_manual_activation_needs_enter() {
        let props = TabsProps {
            manual: Some(true),
            orientation: Some(Orientation::Vertical),
            ..Default::default()
        };
        let (mut dom, tabs, tab_leaves, _) = setup(&[false, false], props);
        let mut end = KeyboardEvent::new(Key::End);
        tab_leaves[0].on_key_down(&mut dom, &mut end);
        assert_eq!(tabs.selected_index(), Some(0));

        let mut enter = KeyboardEvent::new(Key::Enter);
        tab_leaves[1].on_key_down(&mut dom, &mut enter);
        assert_eq!(tabs.selected_index(), Some(1));
    }

    #[test]
    fn test_selection_follows_tab_when_earlier_tab_unmounts() {
        let props = TabsProps {
            default_index: Some(2),
            ..Default::default()
        };
        let (dom, tabs, mut tab_leaves, _) = setup(&[false, false, false], props);
        assert_eq!(tabs.selected_index(), Some(2));
        tab_leaves.remove(0).unmount(&dom);
        assert_eq!(tabs.selected_index(), Some(1));
        assert!(tab_leaves[1].is_selected());
    }

    #[test]
    fn test_tab_outside_tabs_fails_fast() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let node = dom.append_element(body, "button");
        let props = TabProps {
            id: OptionId::from("t"),
            node,
            disabled: None,
        };
        assert_eq!(
            Tab::create(props, &ContextProvider::new(), &dom).unwrap_err(),
            CollectionError::MissingParent {
                component: "Tab",
                parent: "Tabs"
            }
        );
    }
}
