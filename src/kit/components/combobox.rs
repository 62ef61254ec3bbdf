// Combobox (autocomplete input) component for OrbitKit

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use crate::collection::{
    Action, ActivationTrigger, Collection, CollectionBuilder, CollectionError, CollectionOption,
    Comparator, Navigation, OptionId, OptionRegistration, SelectionMode,
};
use crate::config::Services;
use crate::context::{Callback, ContextProvider};
use crate::dom::{Dom, NodeId};
use crate::events::{Key, KeyboardEvent};
use crate::focus::focus_element;
use crate::kit::utils::commit;
use crate::outside::{OutsideInteraction, OutsideInteractionDetector};

/// Properties for the Combobox component
pub struct ComboboxProps<V> {
    /// Text input driving the combobox; keeps focus while open
    pub input: Option<NodeId>,
    /// Optional toggle button
    pub button: Option<NodeId>,
    pub options: Option<NodeId>,
    pub value: Option<Vec<V>>,
    pub multiple: Option<bool>,
    /// Value equality; required
    pub comparator: Option<Comparator<V>>,
    pub disabled: Option<bool>,
    /// Open as soon as the input gains focus
    pub immediate: Option<bool>,
    /// Options are virtualized: order comes from `order` keys, not the DOM
    pub virtualized: Option<bool>,
    pub on_change: Option<Callback<Vec<V>>>,
    /// Called with the input text on every change
    pub on_query_change: Option<Callback<String>>,
}

impl<V> Default for ComboboxProps<V> {
    fn default() -> Self {
        Self {
            input: None,
            button: None,
            options: None,
            value: None,
            multiple: None,
            comparator: None,
            disabled: None,
            immediate: None,
            virtualized: None,
            on_change: None,
            on_query_change: None,
        }
    }
}

/// Input with a filtered list of options
pub struct Combobox<V> {
    collection: Collection<V>,
    input: Option<NodeId>,
    button: Option<NodeId>,
    options: Option<NodeId>,
    multiple: bool,
    immediate: bool,
    virtualized: bool,
    next_order: Arc<AtomicI64>,
    query: Arc<RwLock<String>>,
    on_change: Option<Callback<Vec<V>>>,
    on_query_change: Option<Callback<String>>,
}

impl<V> Clone for Combobox<V> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            input: self.input,
            button: self.button,
            options: self.options,
            multiple: self.multiple,
            immediate: self.immediate,
            virtualized: self.virtualized,
            next_order: self.next_order.clone(),
            query: self.query.clone(),
            on_change: self.on_change.clone(),
            on_query_change: self.on_query_change.clone(),
        }
    }
}

impl<V> fmt::Debug for Combobox<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combobox")
            .field("collection", &self.collection)
            .field("input", &self.input)
            .field("button", &self.button)
            .field("options", &self.options)
            .field("multiple", &self.multiple)
            .field("immediate", &self.immediate)
            .field("virtualized", &self.virtualized)
            .finish()
    }
}

impl<V: Clone + Send + 'static> Combobox<V> {
    /// Create the combobox and provide it to options created under `ctx`
    pub fn create(
        props: ComboboxProps<V>,
        services: &Services,
        ctx: &ContextProvider,
    ) -> Result<Self, CollectionError> {
        let multiple = props.multiple.unwrap_or(false);
        let mut builder = CollectionBuilder::new("Combobox")
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
        let combobox = Self {
            collection: Collection::new(builder.build()?, services),
            input: props.input,
            button: props.button,
            options: props.options,
            multiple,
            immediate: props.immediate.unwrap_or(false),
            virtualized: props.virtualized.unwrap_or(false),
            next_order: Arc::new(AtomicI64::new(0)),
            query: Arc::new(RwLock::new(String::new())),
            on_change: props.on_change,
            on_query_change: props.on_query_change,
        };
        ctx.provide(combobox.clone());
        Ok(combobox)
    }

    pub fn collection(&self) -> &Collection<V> {
        &self.collection
    }

    pub fn is_open(&self) -> bool {
        self.collection.is_open()
    }

    pub fn value(&self) -> Vec<V> {
        self.collection.value()
    }

    pub fn is_selected(&self, value: &V) -> bool {
        self.collection.is_selected(value)
    }

    /// Current input text
    pub fn query(&self) -> String {
        match self.query.read() {
            Ok(query) => query.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// `aria-activedescendant` of the input
    pub fn active_descendant(&self) -> Option<OptionId> {
        if self.is_open() {
            self.collection.active_id()
        } else {
            None
        }
    }

    fn focus_input<D: Dom + ?Sized>(&self, dom: &mut D) {
        if let Some(input) = self.input {
            focus_element(dom, input);
        }
    }

    fn commit<D: Dom + ?Sized>(&self, action: Action<V>, dom: &mut D) {
        commit(&self.collection, action, &*dom, self.on_change.as_ref());
        if !self.multiple && !self.is_open() {
            self.focus_input(dom);
        }
    }

    fn open_at<D: Dom + ?Sized>(&self, dom: &D, fallback: Navigation) {
        self.collection.open(dom);
        if self.collection.active_index().is_none() {
            self.collection
                .go_to(fallback, ActivationTrigger::Other, dom);
        }
    }

    /// `keydown` on the input. Returns whether the key was handled.
    pub fn on_input_key_down<D: Dom + ?Sized>(
        &self,
        dom: &mut D,
        event: &mut KeyboardEvent,
    ) -> bool {
        if event.is_composing || self.collection.is_disabled() {
            return false;
        }
        let open = self.is_open();
        match event.key {
            Key::Enter => {
                if !open {
                    return false;
                }
                event.prevent_default();
                if self.collection.active_index().is_none() {
                    self.collection.close(&*dom);
                } else {
                    self.commit(Action::SelectActive, dom);
                }
            }
            Key::ArrowDown | Key::ArrowUp => {
                event.prevent_default();
                event.stop_propagation();
                let down = event.key == Key::ArrowDown;
                if open {
                    let navigation = if down {
                        Navigation::Next
                    } else {
                        Navigation::Previous
                    };
                    self.collection
                        .go_to(navigation, ActivationTrigger::Other, &*dom);
                } else {
                    let fallback = if down {
                        Navigation::First
                    } else {
                        Navigation::Last
                    };
                    self.open_at(&*dom, fallback);
                }
            }
            Key::Home | Key::PageUp | Key::End | Key::PageDown => {
                if event.shift || !open {
                    return false;
                }
                event.prevent_default();
                event.stop_propagation();
                let navigation = if matches!(event.key, Key::Home | Key::PageUp) {
                    Navigation::First
                } else {
                    Navigation::Last
                };
                self.collection
                    .go_to(navigation, ActivationTrigger::Other, &*dom);
            }
            Key::Escape => {
                if !open {
                    return false;
                }
                event.prevent_default();
                event.stop_propagation();
                self.collection.close(&*dom);
            }
            Key::Tab => {
                if open && self.collection.active_index().is_some() {
                    commit(
                        &self.collection,
                        Action::SelectActive,
                        &*dom,
                        self.on_change.as_ref(),
                    );
                }
                self.collection.close(&*dom);
                return false;
            }
            _ => return false,
        }
        true
    }

    /// The input's text changed
    pub fn on_input_change<D: Dom + ?Sized>(&self, dom: &D, text: &str) {
        match self.query.write() {
            Ok(mut query) => *query = text.to_string(),
            Err(poisoned) => *poisoned.into_inner() = text.to_string(),
        }
        if let Some(on_query_change) = &self.on_query_change {
            on_query_change.call(text.to_string());
        }
        if self.collection.is_disabled() {
            return;
        }
        self.collection.open(dom);
        self.collection
            .go_to(Navigation::Nothing, ActivationTrigger::Other, dom);
        self.collection
            .dispatch(Action::SetDefaultToFirstOption(true), dom);
    }

    /// The input gained focus
    pub fn on_input_focus<D: Dom + ?Sized>(&self, dom: &D) {
        if self.immediate && !self.is_open() && !self.collection.is_disabled() {
            self.open_at(dom, Navigation::Nothing);
        }
    }

    /// `click` on the button toggles the combobox and keeps focus in the input
    pub fn on_button_click<D: Dom + ?Sized>(&self, dom: &mut D) {
        if self.collection.is_disabled() {
            return;
        }
        if self.is_open() {
            self.collection.close(&*dom);
        } else {
            self.collection.open(&*dom);
        }
        self.focus_input(dom);
    }

    /// `keydown` on the button
    pub fn on_button_key_down<D: Dom + ?Sized>(
        &self,
        dom: &mut D,
        event: &mut KeyboardEvent,
    ) -> bool {
        if self.collection.is_disabled() {
            return false;
        }
        let fallback = match event.key {
            Key::ArrowDown => Navigation::First,
            Key::ArrowUp => Navigation::Last,
            Key::Escape if self.is_open() => {
                event.prevent_default();
                event.stop_propagation();
                self.collection.close(&*dom);
                self.focus_input(dom);
                return true;
            }
            _ => return false,
        };
        event.prevent_default();
        event.stop_propagation();
        if !self.is_open() {
            self.open_at(&*dom, fallback);
        }
        self.focus_input(dom);
        true
    }

    pub fn on_option_pointer_move<D: Dom + ?Sized>(&self, dom: &D, id: &OptionId) {
        if self.collection.option_disabled(id) != Some(false)
            || self.collection.active_id().as_ref() == Some(id)
        {
            return;
        }
        self.collection
            .go_to(Navigation::Specific(id.clone()), ActivationTrigger::Pointer, dom);
    }

    pub fn on_option_pointer_leave<D: Dom + ?Sized>(&self, dom: &D, id: &OptionId) {
        if self.collection.option_disabled(id) != Some(false)
            || self.collection.active_id().as_ref() != Some(id)
        {
            return;
        }
        self.collection
            .go_to(Navigation::Nothing, ActivationTrigger::Pointer, dom);
    }

    /// Option clicked. Returns `false` for disabled options.
    pub fn on_option_click<D: Dom + ?Sized>(&self, dom: &mut D, id: &OptionId) -> bool {
        if self.collection.option_disabled(id) != Some(false) {
            return false;
        }
        self.commit(Action::SelectOption(id.clone()), dom);
        true
    }

    /// Detector closing the combobox on interaction outside its input,
    /// button and options
    pub fn outside_detector(&self, services: &Services) -> OutsideInteractionDetector {
        let collection = self.collection.clone();
        let on_outside = Callback::new(move |_: OutsideInteraction| collection.dismiss());
        let mut detector = OutsideInteractionDetector::new(services, on_outside);
        detector.set_containers(
            self.input
                .into_iter()
                .chain(self.button)
                .chain(self.options),
        );
        detector
    }

    pub fn teardown(&self) -> usize {
        self.collection.teardown()
    }
}

/// Properties for the Combobox.Option component
pub struct ComboboxOptionProps<V> {
    pub id: OptionId,
    pub node: NodeId,
    pub value: V,
    pub disabled: Option<bool>,
    /// Position in a virtualized list; assigned in creation order when absent
    pub order: Option<i64>,
}

/// One option of a [`Combobox`]
pub struct ComboboxOption<V> {
    combobox: Combobox<V>,
    registration: OptionRegistration<V>,
    value: V,
}

impl<V> fmt::Debug for ComboboxOption<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComboboxOption")
            .field("registration", &self.registration)
            .finish()
    }
}

impl<V: Clone + Send + 'static> ComboboxOption<V> {
    pub fn create<D: Dom + ?Sized>(
        props: ComboboxOptionProps<V>,
        ctx: &ContextProvider,
        dom: &D,
    ) -> Result<Self, CollectionError> {
        let combobox = ctx.require::<Combobox<V>>("Combobox.Option", "Combobox")?;
        let mut option = CollectionOption::new(props.id, props.node, props.value.clone())
            .disabled(props.disabled.unwrap_or(false));
        if combobox.virtualized {
            let order = props
                .order
                .unwrap_or_else(|| combobox.next_order.fetch_add(1, Ordering::Relaxed));
            option = option.with_order(order);
        }
        let registration = combobox.collection.register_option(option, dom);
        Ok(Self {
            combobox,
            registration,
            value: props.value,
        })
    }

    pub fn id(&self) -> &OptionId {
        self.registration.id()
    }

    pub fn is_active(&self) -> bool {
        self.combobox.collection.active_id().as_ref() == Some(self.id())
    }

    pub fn is_selected(&self) -> bool {
        self.combobox.is_selected(&self.value)
    }

    pub fn on_pointer_move<D: Dom + ?Sized>(&self, dom: &D) {
        self.combobox.on_option_pointer_move(dom, self.id());
    }

    pub fn on_pointer_leave<D: Dom + ?Sized>(&self, dom: &D) {
        self.combobox.on_option_pointer_leave(dom, self.id());
    }

    pub fn on_click<D: Dom + ?Sized>(&self, dom: &mut D) -> bool {
        self.combobox.on_option_click(dom, self.id())
    }

    pub fn unmount<D: Dom + ?Sized>(self, dom: &D) {
        self.registration.unregister(dom);
    }
}
