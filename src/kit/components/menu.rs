// Menu (dropdown of actions) component for OrbitKit

use std::fmt;

use crate::collection::{
    Action, ActivationTrigger, Collection, CollectionBuilder, CollectionError, CollectionOption,
    Navigation, OptionId, OptionRegistration,
};
use crate::config::Services;
use crate::context::{Callback, ContextProvider};
use crate::dom::{Dom, NodeId};
use crate::events::{Key, KeyboardEvent};
use crate::focus::{focus_element, focus_from, FocusFlags};
use crate::kit::utils::{navigation_for, typeahead_char, Orientation};
use crate::outside::{OutsideInteraction, OutsideInteractionDetector};

/// What a menu item does when activated
#[derive(Debug, Clone, Default)]
pub struct MenuEntry {
    pub on_activate: Option<Callback<()>>,
}

/// Properties for the Menu component
#[derive(Debug, Clone, Default)]
pub struct MenuProps {
    pub button: Option<NodeId>,
    /// Element holding the items; receives focus while open
    pub items: Option<NodeId>,
    pub disabled: Option<bool>,
}

/// Button that opens a list of actions
#[derive(Clone)]
pub struct Menu {
    collection: Collection<MenuEntry>,
    button: Option<NodeId>,
    items: Option<NodeId>,
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Menu")
            .field("collection", &self.collection)
            .field("button", &self.button)
            .field("items", &self.items)
            .finish()
    }
}

impl Menu {
    pub fn create(
        props: MenuProps,
        services: &Services,
        ctx: &ContextProvider,
    ) -> Result<Self, CollectionError> {
        let state = CollectionBuilder::new("Menu")
            .disabled(props.disabled.unwrap_or(false))
            .build()?;
        let menu = Self {
            collection: Collection::new(state, services),
            button: props.button,
            items: props.items,
        };
        ctx.provide(menu.clone());
        Ok(menu)
    }

    pub fn collection(&self) -> &Collection<MenuEntry> {
        &self.collection
    }

    pub fn is_open(&self) -> bool {
        self.collection.is_open()
    }

    pub fn active_descendant(&self) -> Option<OptionId> {
        if self.is_open() {
            self.collection.active_id()
        } else {
            None
        }
    }

    fn focus_button<D: Dom + ?Sized>(&self, dom: &mut D) {
        if let Some(button) = self.button {
            focus_element(dom, button);
        }
    }

    fn open_at<D: Dom + ?Sized>(&self, dom: &mut D, navigation: Navigation) {
        self.collection.open(&*dom);
        self.collection
            .go_to(navigation, ActivationTrigger::Other, &*dom);
        if let Some(items) = self.items {
            focus_element(dom, items);
        }
    }

    pub fn close<D: Dom + ?Sized>(&self, dom: &mut D) {
        self.collection.close(&*dom);
        self.focus_button(dom);
    }

    /// Close, run the item's action, and return focus to the button
    fn activate<D: Dom + ?Sized>(&self, dom: &mut D, id: &OptionId) {
        let entry = self.collection.with_state(|s| {
            s.options()
                .iter()
                .find(|o| &o.id == id && !o.disabled)
                .map(|o| o.value.clone())
        });
        let Some(entry) = entry else {
            return;
        };
        self.collection
            .dispatch(Action::SelectOption(id.clone()), &*dom);
        self.focus_button(dom);
        log::debug!("menu item {} activated", id);
        if let Some(on_activate) = entry.on_activate {
            on_activate.call(());
        }
    }

    pub fn on_button_key_down<D: Dom + ?Sized>(
        &self,
        dom: &mut D,
        event: &mut KeyboardEvent,
    ) -> bool {
        if self.collection.is_disabled() {
            return false;
        }
        let navigation = match event.key {
            Key::Space | Key::Enter | Key::ArrowDown => Navigation::First,
            Key::ArrowUp => Navigation::Last,
            _ => return false,
        };
        event.prevent_default();
        event.stop_propagation();
        self.open_at(dom, navigation);
        true
    }

    /// `click` on the button. Opening by pointer leaves nothing active.
    pub fn on_button_click<D: Dom + ?Sized>(&self, dom: &mut D) {
        if self.collection.is_disabled() {
            return;
        }
        if self.is_open() {
            self.close(dom);
        } else {
            self.collection.open(&*dom);
            if let Some(items) = self.items {
                focus_element(dom, items);
            }
        }
    }

    /// `keydown` on the items element
    pub fn on_items_key_down<D: Dom + ?Sized>(
        &self,
        dom: &mut D,
        event: &mut KeyboardEvent,
    ) -> bool {
        let searching = !self.collection.search_query().is_empty();
        let key = event.key.clone();
        match key {
            Key::Space if searching => {
                event.prevent_default();
                event.stop_propagation();
                self.collection.search(" ", &*dom);
            }
            Key::Enter | Key::Space => {
                event.prevent_default();
                event.stop_propagation();
                match self.collection.active_id() {
                    Some(id) => self.activate(dom, &id),
                    None => self.close(dom),
                }
            }
            Key::Escape => {
                event.prevent_default();
                event.stop_propagation();
                self.close(dom);
            }
            Key::Tab => {
                event.prevent_default();
                event.stop_propagation();
                self.collection.close(&*dom);
                if let Some(button) = self.button {
                    let direction = if event.shift {
                        FocusFlags::PREVIOUS
                    } else {
                        FocusFlags::NEXT
                    };
                    focus_from(dom, button, direction);
                }
            }
            ref other => {
                if let Some(navigation) = navigation_for(other, Orientation::Vertical) {
                    event.prevent_default();
                    event.stop_propagation();
                    self.collection
                        .go_to(navigation, ActivationTrigger::Other, &*dom);
                } else if let Some(c) = typeahead_char(event, searching) {
                    event.prevent_default();
                    self.collection.search(&c.to_string(), &*dom);
                } else {
                    return false;
                }
            }
        }
        true
    }

    pub fn on_item_pointer_move<D: Dom + ?Sized>(&self, dom: &D, id: &OptionId) {
        if self.collection.option_disabled(id) != Some(false)
            || self.collection.active_id().as_ref() == Some(id)
        {
            return;
        }
        self.collection
            .go_to(Navigation::Specific(id.clone()), ActivationTrigger::Pointer, dom);
    }

    pub fn on_item_pointer_leave<D: Dom + ?Sized>(&self, dom: &D, id: &OptionId) {
        if self.collection.option_disabled(id) != Some(false)
            || self.collection.active_id().as_ref() != Some(id)
        {
            return;
        }
        self.collection
            .go_to(Navigation::Nothing, ActivationTrigger::Pointer, dom);
    }

    /// Item clicked. Returns `false` for disabled items.
    pub fn on_item_click<D: Dom + ?Sized>(&self, dom: &mut D, id: &OptionId) -> bool {
        if self.collection.option_disabled(id) != Some(false) {
            return false;
        }
        self.activate(dom, id);
        true
    }

    /// Detector closing the menu on interaction outside its button and items
    pub fn outside_detector(&self, services: &Services) -> OutsideInteractionDetector {
        let collection = self.collection.clone();
        let on_outside = Callback::new(move |_: OutsideInteraction| collection.dismiss());
        let mut detector = OutsideInteractionDetector::new(services, on_outside);
        detector.set_containers(self.button.into_iter().chain(self.items));
        detector
    }

    pub fn teardown(&self) -> usize {
        self.collection.teardown()
    }
}

/// Properties for the Menu.Item component
#[derive(Debug, Clone)]
pub struct MenuItemProps {
    pub id: OptionId,
    pub node: NodeId,
    pub disabled: Option<bool>,
    pub on_activate: Option<Callback<()>>,
}

/// One action of a [`Menu`]
#[derive(Debug)]
pub struct MenuItem {
    menu: Menu,
    registration: OptionRegistration<MenuEntry>,
}

impl MenuItem {
    pub fn create<D: Dom + ?Sized>(
        props: MenuItemProps,
        ctx: &ContextProvider,
        dom: &D,
    ) -> Result<Self, CollectionError> {
        let menu = ctx.require::<Menu>("Menu.Item", "Menu")?;
        let entry = MenuEntry {
            on_activate: props.on_activate,
        };
        let option = CollectionOption::new(props.id, props.node, entry)
            .disabled(props.disabled.unwrap_or(false));
        let registration = menu.collection.register_option(option, dom);
        Ok(Self { menu, registration })
    }

    pub fn id(&self) -> &OptionId {
        self.registration.id()
    }

    pub fn is_active(&self) -> bool {
        self.menu.collection.active_id().as_ref() == Some(self.id())
    }

    pub fn on_pointer_move<D: Dom + ?Sized>(&self, dom: &D) {
        self.menu.on_item_pointer_move(dom, self.id());
    }

    pub fn on_pointer_leave<D: Dom + ?Sized>(&self, dom: &D) {
        self.menu.on_item_pointer_leave(dom, self.id());
    }

    pub fn on_click<D: Dom + ?Sized>(&self, dom: &mut D) -> bool {
        self.menu.on_item_click(dom, self.id())
    }

    pub fn unmount<D: Dom + ?Sized>(self, dom: &D) {
        self.registration.unregister(dom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixture {
        dom: MemoryDom,
        button: NodeId,
        after: NodeId,
        menu: Menu,
        items: Vec<MenuItem>,
        activations: Arc<AtomicUsize>,
    }

    fn fixture(labels: &[(&str, bool)]) -> Fixture {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let button = dom.append_element(body, "button");
        let panel = dom.append_element(body, "div");
        dom.set_attribute(panel, "tabindex", "-1");
        let after = dom.append_element(body, "button");
        let ctx = ContextProvider::new();
        let menu = Menu::create(
            MenuProps {
                button: Some(button),
                items: Some(panel),
                disabled: None,
            },
            &Services::default(),
            &ctx,
        )
        .unwrap();
        let activations = Arc::new(AtomicUsize::new(0));
        let items = labels
            .iter()
            .map(|(label, disabled)| {
                let node = dom.append_element(panel, "div");
                dom.append_text(node, label);
                let counter = activations.clone();
                let props = MenuItemProps {
                    id: OptionId::from(*label),
                    node,
                    disabled: Some(*disabled),
                    on_activate: Some(Callback::new(move |_: ()| {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })),
                };
                MenuItem::create(props, &ctx, &dom).unwrap()
            })
            .collect();
        Fixture {
            dom,
            button,
            after,
            menu,
            items,
            activations,
        }
    }

    #[test]
    fn test_item_outside_menu_fails_fast() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let node = dom.append_element(body, "div");
        let props = MenuItemProps {
            id: OptionId::from("x"),
            node,
            disabled: None,
            on_activate: None,
        };
        let err = MenuItem::create(props, &ContextProvider::new(), &dom).unwrap_err();
        assert_eq!(
            err.to_string(),
            "<Menu.Item /> is missing a parent <Menu /> component."
        );
    }

    #[test]
    fn test_enter_activates_and_returns_focus() {
        let mut f = fixture(&[("Edit", false), ("Delete", false)]);
        f.menu
            .on_button_key_down(&mut f.dom, &mut KeyboardEvent::new(Key::Enter));
        assert!(f.items[0].is_active());
        f.menu
            .on_items_key_down(&mut f.dom, &mut KeyboardEvent::new(Key::ArrowDown));
        f.menu
            .on_items_key_down(&mut f.dom, &mut KeyboardEvent::new(Key::Enter));

        assert_eq!(f.activations.load(Ordering::SeqCst), 1);
        assert!(!f.menu.is_open());
        assert_eq!(f.dom.active_element(), Some(f.button));
    }

    #[test]
    fn test_tab_closes_and_moves_past_button() {
        let mut f = fixture(&[("Edit", false)]);
        f.menu
            .on_button_key_down(&mut f.dom, &mut KeyboardEvent::new(Key::ArrowUp));
        let mut tab = KeyboardEvent::new(Key::Tab);
        assert!(f.menu.on_items_key_down(&mut f.dom, &mut tab));
        assert!(tab.is_default_prevented());
        assert!(!f.menu.is_open());
        assert_eq!(f.dom.active_element(), Some(f.after));
    }

    #[test]
    fn test_disabled_item_is_skipped_and_not_clickable() {
        let mut f = fixture(&[("Edit", false), ("Archive", true), ("Delete", false)]);
        f.menu.on_button_click(&mut f.dom);
        assert_eq!(f.menu.active_descendant(), None);

        f.items[0].on_pointer_move(&f.dom);
        f.menu
            .on_items_key_down(&mut f.dom, &mut KeyboardEvent::new(Key::ArrowDown));
        assert!(f.items[2].is_active());

        assert!(!f.items[1].on_click(&mut f.dom));
        assert_eq!(f.activations.load(Ordering::SeqCst), 0);
        assert!(f.menu.is_open());
    }

    #[test]
    fn test_typeahead_jumps_to_matching_item() {
        let mut f = fixture(&[("Copy", false), ("Delete", false), ("Duplicate", false)]);
        f.menu
            .on_button_key_down(&mut f.dom, &mut KeyboardEvent::new(Key::Enter));
        let mut d = KeyboardEvent::new(Key::Character('d'));
        assert!(f.menu.on_items_key_down(&mut f.dom, &mut d));
        assert!(f.items[1].is_active());
        let mut u = KeyboardEvent::new(Key::Character('u'));
        f.menu.on_items_key_down(&mut f.dom, &mut u);
        assert!(f.items[2].is_active());
    }
}
