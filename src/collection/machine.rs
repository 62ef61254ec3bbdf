//! Collection state machine
//!
//! A collection is either open or closed. While open, actions move the active
//! option, feed typeahead, and commit selections. [`transition`] is the pure
//! reducer; [`CollectionState::apply`] is the same reducer in place.

use serde::{Deserialize, Serialize};

use crate::dom::{query, Dom};

use super::resolver::{resolve, Navigation};
use super::{
    CollectionError, CollectionOption, Comparator, OptionId, OptionRegistry, TypeaheadMatcher,
};

/// Whether the collection's popup is shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenState {
    Open,
    #[default]
    Closed,
}

/// Last cause of an active-index change. Pointer-driven activation must not
/// scroll the option into view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationTrigger {
    Pointer,
    #[default]
    Other,
}

/// How committing an option affects the collection's value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    /// No value is kept (menus). Committing closes the collection.
    #[default]
    None,
    /// One value. Committing replaces it and closes the collection.
    Single,
    /// A set of values. Committing toggles membership and keeps it open.
    Multiple,
}

/// Actions accepted by [`transition`]
#[derive(Debug, Clone)]
pub enum Action<V> {
    Open,
    Close,
    GoTo {
        navigation: Navigation,
        trigger: ActivationTrigger,
    },
    /// Typeahead input (one key, or a pasted run of characters)
    Search(String),
    ClearSearch,
    RegisterOption(CollectionOption<V>),
    UnregisterOption(OptionId),
    /// Re-sort after the host moved option nodes
    Reorder,
    SetActivationTrigger(ActivationTrigger),
    /// Commit the active option
    SelectActive,
    /// Commit a specific option
    SelectOption(OptionId),
    /// Replace the value (controlled collections)
    SetValue(Vec<V>),
    SetDisabled(bool),
    SetDefaultToFirstOption(bool),
}

impl<V> Action<V> {
    /// Keyboard or programmatic navigation
    pub fn go_to(navigation: Navigation) -> Self {
        Action::GoTo {
            navigation,
            trigger: ActivationTrigger::Other,
        }
    }

    /// Pointer-driven navigation
    pub fn pointer_go_to(navigation: Navigation) -> Self {
        Action::GoTo {
            navigation,
            trigger: ActivationTrigger::Pointer,
        }
    }

    pub fn search(input: impl Into<String>) -> Self {
        Action::Search(input.into())
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Action::Open => "Open",
            Action::Close => "Close",
            Action::GoTo { .. } => "GoTo",
            Action::Search(_) => "Search",
            Action::ClearSearch => "ClearSearch",
            Action::RegisterOption(_) => "RegisterOption",
            Action::UnregisterOption(_) => "UnregisterOption",
            Action::Reorder => "Reorder",
            Action::SetActivationTrigger(_) => "SetActivationTrigger",
            Action::SelectActive => "SelectActive",
            Action::SelectOption(_) => "SelectOption",
            Action::SetValue(_) => "SetValue",
            Action::SetDisabled(_) => "SetDisabled",
            Action::SetDefaultToFirstOption(_) => "SetDefaultToFirstOption",
        }
    }
}

/// State of one mounted collection
#[derive(Debug, Clone)]
pub struct CollectionState<V> {
    kind: &'static str,
    registry: OptionRegistry<V>,
    active_index: Option<usize>,
    open_state: OpenState,
    activation_trigger: ActivationTrigger,
    typeahead: TypeaheadMatcher,
    selection_mode: SelectionMode,
    comparator: Option<Comparator<V>>,
    value: Vec<V>,
    value_revision: u64,
    disabled: bool,
    default_to_first_option: bool,
}

/// Builder for [`CollectionState`]
#[derive(Debug)]
pub struct CollectionBuilder<V> {
    kind: &'static str,
    selection_mode: SelectionMode,
    comparator: Option<Comparator<V>>,
    value: Vec<V>,
    disabled: bool,
    open: bool,
}

impl<V> CollectionBuilder<V> {
    /// `kind` names the widget in logs and errors, e.g. `"Listbox"`
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            selection_mode: SelectionMode::None,
            comparator: None,
            value: Vec::new(),
            disabled: false,
            open: false,
        }
    }

    pub fn selection(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    pub fn comparator(mut self, comparator: Comparator<V>) -> Self {
        self.comparator = Some(comparator);
        self
    }

    pub fn value(mut self, value: Vec<V>) -> Self {
        self.value = value;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Start open; used by collections without a popup (radio groups, tabs)
    pub fn open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    /// Selecting collections must carry a comparator
    pub fn build(self) -> Result<CollectionState<V>, CollectionError> {
        if self.selection_mode != SelectionMode::None && self.comparator.is_none() {
            return Err(CollectionError::MissingComparator {
                collection: self.kind,
            });
        }
        let mut value = self.value;
        if self.selection_mode == SelectionMode::Single {
            value.truncate(1);
        }
        Ok(CollectionState {
            kind: self.kind,
            registry: OptionRegistry::new(),
            active_index: None,
            open_state: if self.open {
                OpenState::Open
            } else {
                OpenState::Closed
            },
            activation_trigger: ActivationTrigger::Other,
            typeahead: TypeaheadMatcher::new(),
            selection_mode: self.selection_mode,
            comparator: self.comparator,
            value,
            value_revision: 0,
            disabled: self.disabled,
            default_to_first_option: false,
        })
    }
}

/// Pure reducer: the state after `action`
pub fn transition<V: Clone, D: Dom + ?Sized>(
    mut state: CollectionState<V>,
    action: Action<V>,
    dom: &D,
) -> CollectionState<V> {
    state.apply(action, dom);
    state
}

impl<V: Clone> CollectionState<V> {
    /// Apply `action` in place
    pub fn apply<D: Dom + ?Sized>(&mut self, action: Action<V>, dom: &D) {
        log::trace!("{}: {}", self.kind, action.name());
        match action {
            // Bookkeeping runs in every state.
            Action::RegisterOption(option) => self.register(option, dom),
            Action::UnregisterOption(id) => {
                self.active_index = self.registry.unregister(&id, self.active_index);
                self.apply_default_to_first();
            }
            Action::Reorder => {
                self.active_index = self.registry.reorder(dom, self.active_index);
                self.apply_default_to_first();
            }
            Action::SetValue(value) => self.set_value(value),
            Action::SetDisabled(disabled) => self.disabled = disabled,
            Action::SetDefaultToFirstOption(flag) => {
                self.default_to_first_option = flag;
                self.apply_default_to_first();
            }
            Action::Close => self.close(),

            _ if self.disabled => {}
            Action::Open => self.open(),
            _ if self.open_state == OpenState::Closed => {}

            Action::GoTo {
                navigation,
                trigger,
            } => self.go_to(&navigation, trigger, dom),
            Action::Search(input) => self.search(&input, dom),
            Action::ClearSearch => self.typeahead.clear(),
            Action::SetActivationTrigger(trigger) => self.activation_trigger = trigger,
            Action::SelectActive => {
                if let Some(index) = self.active_index {
                    self.commit(index);
                }
            }
            Action::SelectOption(id) => {
                if let Some(index) = self.registry.index_of(&id) {
                    self.commit(index);
                }
            }
        }
    }

    fn register<D: Dom + ?Sized>(&mut self, option: CollectionOption<V>, dom: &D) {
        let selected = self.is_selected(&option.value);
        let id = option.id.clone();
        self.active_index = self.registry.register(option, dom, self.active_index);

        if self.open_state == OpenState::Open && self.active_index.is_none() && selected {
            self.active_index = self.registry.index_of(&id);
        }
        self.apply_default_to_first();
    }

    fn apply_default_to_first(&mut self) {
        if self.default_to_first_option
            && self.open_state == OpenState::Open
            && self.active_index.is_none()
        {
            self.active_index = resolve(&Navigation::First, self.registry.options(), None);
        }
    }

    fn open(&mut self) {
        if self.open_state == OpenState::Open {
            return;
        }
        log::debug!("{} opened", self.kind);
        self.open_state = OpenState::Open;
        let selected = self
            .registry
            .options()
            .iter()
            .position(|o| self.is_selected(&o.value));
        if selected.is_some() {
            self.active_index = selected;
        }
        self.apply_default_to_first();
    }

    pub(crate) fn close(&mut self) {
        if self.open_state == OpenState::Open {
            log::debug!("{} closed", self.kind);
        }
        self.open_state = OpenState::Closed;
        self.active_index = None;
        self.typeahead.clear();
        self.activation_trigger = ActivationTrigger::Other;
        self.default_to_first_option = false;
    }

    fn go_to<D: Dom + ?Sized>(
        &mut self,
        navigation: &Navigation,
        trigger: ActivationTrigger,
        dom: &D,
    ) {
        self.typeahead.clear();
        self.activation_trigger = trigger;
        self.default_to_first_option = false;

        if let Some(index) = self.adjacent_target(navigation, dom) {
            self.active_index = Some(index);
            return;
        }

        let active = self.registry.reorder(dom, self.active_index);
        self.active_index = resolve(navigation, self.registry.options(), active);
    }

    /// Next/Previous onto the physically adjacent option, skipping the
    /// re-sort. Only taken when the full scan would land on the same option.
    fn adjacent_target<D: Dom + ?Sized>(&self, navigation: &Navigation, dom: &D) -> Option<usize> {
        let current = self.active_index?;
        let options = self.registry.options();
        let node = options.get(current)?.node;
        let (neighbor, sibling) = match navigation {
            Navigation::Next => (current + 1, query::next_element_sibling(dom, node)),
            Navigation::Previous => (
                current.checked_sub(1)?,
                query::previous_element_sibling(dom, node),
            ),
            _ => return None,
        };
        let candidate = options.get(neighbor)?;
        (!candidate.disabled && sibling == Some(candidate.node)).then_some(neighbor)
    }

    fn search<D: Dom + ?Sized>(&mut self, input: &str, dom: &D) {
        let matched = self.typeahead.on_input(
            input,
            self.registry.options_mut(),
            self.active_index,
            dom,
        );
        if let Some(index) = matched {
            if Some(index) != self.active_index {
                self.active_index = Some(index);
                self.activation_trigger = ActivationTrigger::Other;
            }
        }
    }

    fn commit(&mut self, index: usize) {
        let Some(option) = self.registry.get(index) else {
            return;
        };
        if option.disabled {
            return;
        }
        let value = option.value.clone();
        match self.selection_mode {
            SelectionMode::None => self.close(),
            SelectionMode::Single => {
                self.value = vec![value];
                self.value_revision += 1;
                self.close();
            }
            SelectionMode::Multiple => {
                let existing = self.value.iter().position(|v| self.values_match(v, &value));
                match existing {
                    Some(position) => {
                        self.value.remove(position);
                    }
                    None => self.value.push(value),
                }
                self.value_revision += 1;
            }
        }
    }

    fn set_value(&mut self, mut value: Vec<V>) {
        if self.selection_mode == SelectionMode::Single {
            value.truncate(1);
        }
        self.value = value;
        self.value_revision += 1;
    }
}

impl<V> CollectionState<V> {
    fn values_match(&self, a: &V, b: &V) -> bool {
        self.comparator.as_ref().is_some_and(|c| c.matches(a, b))
    }

    /// Typeahead reset; needs no document access
    pub(crate) fn clear_search(&mut self) {
        self.typeahead.clear();
    }

    /// Whether `value` is part of the current value
    pub fn is_selected(&self, value: &V) -> bool {
        self.value.iter().any(|v| self.values_match(v, value))
    }

    /// Widget name used in logs and errors
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn options(&self) -> &[CollectionOption<V>] {
        self.registry.options()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn active_option(&self) -> Option<&CollectionOption<V>> {
        self.active_index.and_then(|i| self.registry.get(i))
    }

    pub fn open_state(&self) -> OpenState {
        self.open_state
    }

    pub fn is_open(&self) -> bool {
        self.open_state == OpenState::Open
    }

    pub fn activation_trigger(&self) -> ActivationTrigger {
        self.activation_trigger
    }

    pub fn search_query(&self) -> &str {
        self.typeahead.query()
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    pub fn value(&self) -> &[V] {
        &self.value
    }

    /// Bumped on every value change
    pub fn value_revision(&self) -> u64 {
        self.value_revision
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn default_to_first_option(&self) -> bool {
        self.default_to_first_option
    }
}
