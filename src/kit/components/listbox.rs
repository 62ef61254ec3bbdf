// Listbox (select) component for OrbitKit

use std::fmt;

use crate::collection::{
    Action, ActivationTrigger, Collection, CollectionBuilder, CollectionError, CollectionOption,
    Comparator, Navigation, OptionId, OptionRegistration, SelectionMode,
};
use crate::config::Services;
use crate::context::{Callback, ContextProvider};
use crate::dom::{Dom, NodeId};
use crate::events::{Key, KeyboardEvent};
use crate::focus::focus_element;
use crate::kit::utils::{commit, navigation_for, typeahead_char, Orientation};
use crate::outside::{OutsideInteraction, OutsideInteractionDetector};

/// Properties for the Listbox component
pub struct ListboxProps<V> {
    /// Element that toggles the listbox
    pub button: Option<NodeId>,
    /// Element holding the options; receives focus while open
    pub options: Option<NodeId>,
    /// Initially selected values
    pub value: Option<Vec<V>>,
    /// Whether several values can be selected
    pub multiple: Option<bool>,
    /// Value equality; required
    pub comparator: Option<Comparator<V>>,
    pub disabled: Option<bool>,
    pub orientation: Option<Orientation>,
    /// Called with the new value after every commit
    pub on_change: Option<Callback<Vec<V>>>,
}

impl<V> Default for ListboxProps<V> {
    fn default() -> Self {
        Self {
            button: None,
            options: None,
            value: None,
            multiple: None,
            comparator: None,
            disabled: None,
            orientation: None,
            on_change: None,
        }
    }
}

/// Select-style listbox: a button that opens a list of options
///
/// # Examples
///
/// ```rust,ignore
/// let listbox = Listbox::create(
///     ListboxProps {
///         button: Some(button),
///         options: Some(panel),
///         comparator: Some(Comparator::by_value()),
///         ..Default::default()
///     },
///     &services,
///     &ctx,
/// )?;
/// ```
pub struct Listbox<V> {
    collection: Collection<V>,
    button: Option<NodeId>,
    options: Option<NodeId>,
    orientation: Orientation,
    multiple: bool,
    on_change: Option<Callback<Vec<V>>>,
}

impl<V> Clone for Listbox<V> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            button: self.button,
            options: self.options,
            orientation: self.orientation,
            multiple: self.multiple,
            on_change: self.on_change.clone(),
        }
    }
}

impl<V> fmt::Debug for Listbox<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listbox")
            .field("collection", &self.collection)
            .field("button", &self.button)
            .field("options", &self.options)
            .field("orientation", &self.orientation)
            .field("multiple", &self.multiple)
            .finish()
    }
}

impl<V: Clone + Send + 'static> Listbox<V> {
    /// Create the listbox and provide it to options created under `ctx`
    pub fn create(
        props: ListboxProps<V>,
        services: &Services,
        ctx: &ContextProvider,
    ) -> Result<Self, CollectionError> {
        let multiple = props.multiple.unwrap_or(false);
        let mut builder = CollectionBuilder::new("Listbox")
            .selection(if multiple {
                SelectionMode::Multiple
            } else {
                SelectionMode::Single
            })
            .value(props.value.unwrap_or_default())
            .disabled(props.disabled.unwrap_or(false));
        if let Some(comparator) = props.comparator {
            builder = builder.comparator(comparator);
        }
        let listbox = Self {
            collection: Collection::new(builder.build()?, services),
            button: props.button,
            options: props.options,
            orientation: props.orientation.unwrap_or_default(),
            multiple,
            on_change: props.on_change,
        };
        ctx.provide(listbox.clone());
        Ok(listbox)
    }

    pub fn collection(&self) -> &Collection<V> {
        &self.collection
    }

    pub fn is_open(&self) -> bool {
        self.collection.is_open()
    }

    fn is_disabled(&self) -> bool {
        self.collection.is_disabled()
    }

    fn option_disabled(&self, id: &OptionId) -> Option<bool> {
        self.collection.option_disabled(id)
    }

    /// `aria-activedescendant` of the options element
    pub fn active_descendant(&self) -> Option<OptionId> {
        if self.is_open() {
            self.collection.active_id()
        } else {
            None
        }
    }

    pub fn value(&self) -> Vec<V> {
        self.collection.value()
    }

    pub fn is_selected(&self, value: &V) -> bool {
        self.collection.is_selected(value)
    }

    fn focus_button<D: Dom + ?Sized>(&self, dom: &mut D) {
        if let Some(button) = self.button {
            focus_element(dom, button);
        }
    }

    fn commit<D: Dom + ?Sized>(&self, action: Action<V>, dom: &mut D) {
        commit(&self.collection, action, &*dom, self.on_change.as_ref());
        if !self.multiple && !self.is_open() {
            self.focus_button(dom);
        }
    }

    /// Open, and activate `fallback` when no selected option became active
    fn open_at<D: Dom + ?Sized>(&self, dom: &mut D, fallback: Navigation) {
        self.collection.open(&*dom);
        if self.collection.active_index().is_none() {
            self.collection
                .go_to(fallback, ActivationTrigger::Other, &*dom);
        }
        if let Some(options) = self.options {
            focus_element(dom, options);
        }
    }

    pub fn close<D: Dom + ?Sized>(&self, dom: &mut D) {
        self.collection.close(&*dom);
        self.focus_button(dom);
    }

    /// `keydown` on the button. Returns whether the key was handled.
    pub fn on_button_key_down<D: Dom + ?Sized>(
        &self,
        dom: &mut D,
        event: &mut KeyboardEvent,
    ) -> bool {
        if self.is_disabled() {
            return false;
        }
        let fallback = match event.key {
            Key::Space | Key::Enter | Key::ArrowDown => Navigation::First,
            Key::ArrowUp => Navigation::Last,
            _ => return false,
        };
        event.prevent_default();
        self.open_at(dom, fallback);
        true
    }

    /// `click` on the button toggles the listbox
    pub fn on_button_click<D: Dom + ?Sized>(&self, dom: &mut D) {
        if self.is_disabled() {
            return;
        }
        if self.is_open() {
            self.close(dom);
        } else {
            self.collection.open(&*dom);
            if let Some(options) = self.options {
                focus_element(dom, options);
            }
        }
    }

    /// `keydown` on the options element. Returns whether the key was handled.
    pub fn on_options_key_down<D: Dom + ?Sized>(
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
                if self.collection.active_index().is_some() {
                    self.commit(Action::SelectActive, dom);
                } else if !self.multiple {
                    self.close(dom);
                }
            }
            Key::Escape => {
                event.prevent_default();
                event.stop_propagation();
                self.close(dom);
            }
            Key::Tab => {
                self.collection.close(&*dom);
                return false;
            }
            ref other => {
                if let Some(navigation) = navigation_for(other, self.orientation) {
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

    /// Pointer moved over an option
    pub fn on_option_pointer_move<D: Dom + ?Sized>(&self, dom: &D, id: &OptionId) {
        if self.option_disabled(id) != Some(false) || self.collection.active_id().as_ref() == Some(id)
        {
            return;
        }
        self.collection
            .go_to(Navigation::Specific(id.clone()), ActivationTrigger::Pointer, dom);
    }

    /// Pointer left an option
    pub fn on_option_pointer_leave<D: Dom + ?Sized>(&self, dom: &D, id: &OptionId) {
        if self.option_disabled(id) != Some(false) || self.collection.active_id().as_ref() != Some(id)
        {
            return;
        }
        self.collection
            .go_to(Navigation::Nothing, ActivationTrigger::Pointer, dom);
    }

    /// Option clicked. Returns `false` for disabled options.
    pub fn on_option_click<D: Dom + ?Sized>(&self, dom: &mut D, id: &OptionId) -> bool {
        if self.option_disabled(id) != Some(false) {
            return false;
        }
        self.commit(Action::SelectOption(id.clone()), dom);
        true
    }

    /// Detector closing this listbox on interaction outside its button and
    /// options. The host enables it while the listbox is open.
    pub fn outside_detector(&self, services: &Services) -> OutsideInteractionDetector {
        let collection = self.collection.clone();
        let on_outside = Callback::new(move |_: OutsideInteraction| collection.dismiss());
        let mut detector = OutsideInteractionDetector::new(services, on_outside);
        detector.set_containers(self.button.into_iter().chain(self.options));
        detector
    }

    /// Cancel pending work; returns the number of leaked options
    pub fn teardown(&self) -> usize {
        self.collection.teardown()
    }
}

/// Properties for the Listbox.Option component
pub struct ListboxOptionProps<V> {
    pub id: OptionId,
    pub node: NodeId,
    pub value: V,
    pub disabled: Option<bool>,
    /// Sort key for virtualized lists
    pub order: Option<i64>,
}

/// One option of a [`Listbox`]
pub struct ListboxOption<V> {
    listbox: Listbox<V>,
    registration: OptionRegistration<V>,
    value: V,
}

impl<V> fmt::Debug for ListboxOption<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListboxOption")
            .field("registration", &self.registration)
            .finish()
    }
}

impl<V: Clone + Send + 'static> ListboxOption<V> {
    /// Register under the listbox provided in `ctx`
    pub fn create<D: Dom + ?Sized>(
        props: ListboxOptionProps<V>,
        ctx: &ContextProvider,
        dom: &D,
    ) -> Result<Self, CollectionError> {
        let listbox = ctx.require::<Listbox<V>>("Listbox.Option", "Listbox")?;
        let mut option = CollectionOption::new(props.id, props.node, props.value.clone())
            .disabled(props.disabled.unwrap_or(false));
        if let Some(order) = props.order {
            option = option.with_order(order);
        }
        let registration = listbox.collection.register_option(option, dom);
        Ok(Self {
            listbox,
            registration,
            value: props.value,
        })
    }

    pub fn id(&self) -> &OptionId {
        self.registration.id()
    }

    /// Whether this option is the active descendant
    pub fn is_active(&self) -> bool {
        self.listbox.collection.active_id().as_ref() == Some(self.id())
    }

    /// `aria-selected`
    pub fn is_selected(&self) -> bool {
        self.listbox.is_selected(&self.value)
    }

    pub fn on_pointer_move<D: Dom + ?Sized>(&self, dom: &D) {
        self.listbox.on_option_pointer_move(dom, self.id());
    }

    pub fn on_pointer_leave<D: Dom + ?Sized>(&self, dom: &D) {
        self.listbox.on_option_pointer_leave(dom, self.id());
    }

    pub fn on_click<D: Dom + ?Sized>(&self, dom: &mut D) -> bool {
        self.listbox.on_option_click(dom, self.id())
    }

    /// Unregister from the listbox
    pub fn unmount<D: Dom + ?Sized>(self, dom: &D) {
        self.registration.unregister(dom);
    }
}
