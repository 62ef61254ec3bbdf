// RadioGroup component for OrbitKit

use std::fmt;

use crate::collection::{
    Action, ActivationTrigger, Collection, CollectionBuilder, CollectionError, CollectionOption,
    Comparator, Navigation, OptionId, OptionRegistration, SelectionMode,
};
use crate::config::Services;
use crate::context::{Callback, ContextProvider};
use crate::dom::{Dom, NodeId};
use crate::events::{Key, KeyboardEvent};
use crate::focus::{focus_element, focus_in, FocusFlags, FocusResult, FocusScope};

/// Properties for the RadioGroup component
pub struct RadioGroupProps<V> {
    pub value: Option<V>,
    /// Value equality; required
    pub comparator: Option<Comparator<V>>,
    pub disabled: Option<bool>,
    pub on_change: Option<Callback<V>>,
}

impl<V> Default for RadioGroupProps<V> {
    fn default() -> Self {
        Self {
            value: None,
            comparator: None,
            disabled: None,
            on_change: None,
        }
    }
}

/// Group of radios with a single checked value and a roving tab index.
///
/// The underlying collection is always open; the active option tracks the
/// radio that last received focus through the group.
pub struct RadioGroup<V> {
    collection: Collection<V>,
    on_change: Option<Callback<V>>,
}

impl<V> Clone for RadioGroup<V> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            on_change: self.on_change.clone(),
        }
    }
}

impl<V> fmt::Debug for RadioGroup<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadioGroup")
            .field("collection", &self.collection)
            .finish()
    }
}

impl<V: Clone + Send + 'static> RadioGroup<V> {
    pub fn create(
        props: RadioGroupProps<V>,
        services: &Services,
        ctx: &ContextProvider,
    ) -> Result<Self, CollectionError> {
        let mut builder = CollectionBuilder::new("RadioGroup")
            .selection(SelectionMode::Single)
            .value(props.value.into_iter().collect())
            .disabled(props.disabled.unwrap_or(false))
            .open(true);
        if let Some(comparator) = props.comparator {
            builder = builder.comparator(comparator);
        }
        let group = Self {
            collection: Collection::new(builder.build()?, services),
            on_change: props.on_change,
        };
        ctx.provide(group.clone());
        Ok(group)
    }

    pub fn collection(&self) -> &Collection<V> {
        &self.collection
    }

    /// The checked value
    pub fn value(&self) -> Option<V> {
        self.collection.value().into_iter().next()
    }

    pub fn is_checked(&self, id: &OptionId) -> bool {
        self.collection.with_state(|s| {
            s.options()
                .iter()
                .find(|o| &o.id == id)
                .is_some_and(|o| s.is_selected(&o.value))
        })
    }

    /// Roving tab index: the checked radio, or the first enabled radio when
    /// nothing enabled is checked, gets 0; every other radio gets -1
    pub fn tab_index(&self, id: &OptionId) -> i32 {
        let focusable = self.collection.with_state(|s| {
            if s.is_disabled() {
                return None;
            }
            let enabled = || s.options().iter().filter(|o| !o.disabled);
            enabled()
                .find(|o| s.is_selected(&o.value))
                .or_else(|| enabled().next())
                .map(|o| o.id.clone())
        });
        if focusable.as_ref() == Some(id) {
            0
        } else {
            -1
        }
    }

    fn enabled_nodes(&self) -> Vec<NodeId> {
        self.collection.with_state(|s| {
            s.options()
                .iter()
                .filter(|o| !o.disabled)
                .map(|o| o.node)
                .collect()
        })
    }

    /// Check the radio `id`. Returns whether it was selectable.
    pub fn select<D: Dom + ?Sized>(&self, dom: &D, id: &OptionId) -> bool {
        if self.collection.is_disabled() {
            return false;
        }
        let value = self.collection.with_state(|s| {
            s.options()
                .iter()
                .find(|o| &o.id == id && !o.disabled)
                .map(|o| o.value.clone())
        });
        let Some(value) = value else {
            return false;
        };
        self.collection
            .go_to(Navigation::Specific(id.clone()), ActivationTrigger::Other, dom);
        if self.collection.is_selected(&value) {
            return true;
        }
        self.collection
            .dispatch(Action::SetValue(vec![value.clone()]), dom);
        if let Some(on_change) = &self.on_change {
            on_change.call(value);
        }
        true
    }

    /// `click` on a radio: check and focus it
    pub fn on_radio_click<D: Dom + ?Sized>(&self, dom: &mut D, id: &OptionId) -> bool {
        if !self.select(&*dom, id) {
            return false;
        }
        if let Some(node) = self.collection.active_node() {
            focus_element(dom, node);
        }
        true
    }

    /// `keydown` on the radio `id`
    pub fn on_radio_key_down<D: Dom + ?Sized>(
        &self,
        dom: &mut D,
        id: &OptionId,
        event: &mut KeyboardEvent,
    ) -> bool {
        if self.collection.is_disabled() {
            return false;
        }
        let direction = match event.key {
            Key::ArrowLeft | Key::ArrowUp => FocusFlags::PREVIOUS,
            Key::ArrowRight | Key::ArrowDown => FocusFlags::NEXT,
            Key::Space => {
                event.prevent_default();
                event.stop_propagation();
                return self.select(&*dom, id);
            }
            _ => return false,
        };
        event.prevent_default();
        event.stop_propagation();

        let nodes = self.enabled_nodes();
        let current = self
            .collection
            .with_state(|s| s.options().iter().find(|o| &o.id == id).map(|o| o.node));
        let result = focus_in(
            dom,
            FocusScope::Elements(&nodes),
            direction | FocusFlags::WRAP_AROUND,
            current,
            &[],
        );
        if result != FocusResult::Success {
            return true;
        }
        let focused = dom.active_element();
        let target = self.collection.with_state(|s| {
            s.options()
                .iter()
                .find(|o| Some(o.node) == focused)
                .map(|o| o.id.clone())
        });
        if let Some(target) = target {
            self.select(&*dom, &target);
        }
        true
    }

    pub fn teardown(&self) -> usize {
        self.collection.teardown()
    }
}

/// Properties for the RadioGroup.Option component
pub struct RadioProps<V> {
    pub id: OptionId,
    pub node: NodeId,
    pub value: V,
    pub disabled: Option<bool>,
}

/// One radio of a [`RadioGroup`]
pub struct Radio<V> {
    group: RadioGroup<V>,
    registration: OptionRegistration<V>,
}

impl<V> fmt::Debug for Radio<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Radio")
            .field("registration", &self.registration)
            .finish()
    }
}

impl<V: Clone + Send + 'static> Radio<V> {
    pub fn create<D: Dom + ?Sized>(
        props: RadioProps<V>,
        ctx: &ContextProvider,
        dom: &D,
    ) -> Result<Self, CollectionError> {
        let group = ctx.require::<RadioGroup<V>>("RadioGroup.Option", "RadioGroup")?;
        let option = CollectionOption::new(props.id, props.node, props.value)
            .disabled(props.disabled.unwrap_or(false));
        let registration = group.collection.register_option(option, dom);
        Ok(Self {
            group,
            registration,
        })
    }

    pub fn id(&self) -> &OptionId {
        self.registration.id()
    }

    /// `aria-checked`
    pub fn is_checked(&self) -> bool {
        self.group.is_checked(self.id())
    }

    pub fn tab_index(&self) -> i32 {
        self.group.tab_index(self.id())
    }

    pub fn on_click<D: Dom + ?Sized>(&self, dom: &mut D) -> bool {
        self.group.on_radio_click(dom, self.id())
    }

    pub fn on_key_down<D: Dom + ?Sized>(&self, dom: &mut D, event: &mut KeyboardEvent) -> bool {
        self.group.on_radio_key_down(dom, self.id(), event)
    }

    pub fn unmount<D: Dom + ?Sized>(self, dom: &D) {
        self.registration.unregister(dom);
    }
}
