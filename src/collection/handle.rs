//! Shared collection handle
//!
//! Widgets hold a [`Collection`] and feed it actions. The handle owns the
//! side effects the pure reducer cannot: change notifications, the typeahead
//! reset timer and scroll-into-view requests.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::Services;
use crate::dom::{Dom, NodeId};
use crate::events::{Dispatcher, Subscription};
use crate::scheduler::Disposables;

use super::machine::{Action, ActivationTrigger, CollectionState, OpenState};
use super::resolver::Navigation;
use super::{CollectionOption, OptionId};

/// Notifications published after an action changed the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    Opened,
    Closed,
    ActiveChanged {
        index: Option<usize>,
        id: Option<OptionId>,
        trigger: ActivationTrigger,
    },
    ValueChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    open_state: OpenState,
    active_index: Option<usize>,
    active_id: Option<OptionId>,
    active_node: Option<NodeId>,
    trigger: ActivationTrigger,
    value_revision: u64,
}

impl Snapshot {
    fn of<V>(state: &CollectionState<V>) -> Self {
        let active = state.active_option();
        Self {
            open_state: state.open_state(),
            active_index: state.active_index(),
            active_id: active.map(|o| o.id.clone()),
            active_node: active.map(|o| o.node),
            trigger: state.activation_trigger(),
            value_revision: state.value_revision(),
        }
    }
}

/// A mounted collection shared between its widget parts
pub struct Collection<V> {
    state: Arc<Mutex<CollectionState<V>>>,
    events: Dispatcher<CollectionEvent>,
    frames: Disposables,
    search_timer: Disposables,
    typeahead_timeout: Duration,
    scroll_request: Arc<Mutex<Option<NodeId>>>,
}

impl<V> Clone for Collection<V> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            events: self.events.clone(),
            frames: self.frames.clone(),
            search_timer: self.search_timer.clone(),
            typeahead_timeout: self.typeahead_timeout,
            scroll_request: self.scroll_request.clone(),
        }
    }
}

impl<V> fmt::Debug for Collection<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("Collection")
            .field("kind", &state.kind())
            .field("options", &state.options().len())
            .field("open_state", &state.open_state())
            .field("active_index", &state.active_index())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl<V> Collection<V> {
    /// Read the current state
    pub fn with_state<R>(&self, f: impl FnOnce(&CollectionState<V>) -> R) -> R {
        f(&lock(&self.state))
    }

    pub fn active_index(&self) -> Option<usize> {
        lock(&self.state).active_index()
    }

    pub fn active_id(&self) -> Option<OptionId> {
        lock(&self.state).active_option().map(|o| o.id.clone())
    }

    /// Element backing the active option
    pub fn active_node(&self) -> Option<NodeId> {
        lock(&self.state).active_option().map(|o| o.node)
    }

    pub fn is_open(&self) -> bool {
        lock(&self.state).is_open()
    }

    pub fn search_query(&self) -> String {
        lock(&self.state).search_query().to_string()
    }

    /// Ids in display order
    pub fn option_ids(&self) -> Vec<OptionId> {
        lock(&self.state)
            .options()
            .iter()
            .map(|o| o.id.clone())
            .collect()
    }

    /// Disabled flag of a registered option, `None` when unknown
    pub fn option_disabled(&self, id: &OptionId) -> Option<bool> {
        lock(&self.state)
            .options()
            .iter()
            .find(|o| &o.id == id)
            .map(|o| o.disabled)
    }

    pub fn is_disabled(&self) -> bool {
        lock(&self.state).is_disabled()
    }

    pub fn value_revision(&self) -> u64 {
        lock(&self.state).value_revision()
    }

    /// Subscribe to [`CollectionEvent`]s
    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&CollectionEvent) + Send + Sync + 'static,
    {
        self.events.on(f)
    }

    /// Element the host should scroll into view, published on the animation
    /// frame after a non-pointer activation. Taking it clears it.
    pub fn take_scroll_request(&self) -> Option<NodeId> {
        lock(&self.scroll_request).take()
    }

    /// Cancel pending timers and frames. Returns the number of options that
    /// were never unregistered; a non-zero count is logged as a leak.
    pub fn teardown(&self) -> usize {
        self.frames.dispose();
        self.search_timer.dispose();
        let state = lock(&self.state);
        let leaked = state.options().len();
        if leaked > 0 {
            log::warn!(
                "{} torn down with {} option(s) still registered",
                state.kind(),
                leaked
            );
        }
        leaked
    }
}

impl<V: Clone + Send + 'static> Collection<V> {
    /// Wrap `state`, scheduling deferred work on the services' scheduler
    pub fn new(state: CollectionState<V>, services: &Services) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            events: Dispatcher::new(),
            frames: Disposables::new(&services.scheduler),
            search_timer: Disposables::new(&services.scheduler),
            typeahead_timeout: services.config.typeahead_timeout(),
            scroll_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Apply `action` and publish what changed
    pub fn dispatch<D: Dom + ?Sized>(&self, action: Action<V>, dom: &D) {
        let (before, after) = {
            let mut state = lock(&self.state);
            let before = Snapshot::of(&state);
            state.apply(action, dom);
            (before, Snapshot::of(&state))
        };
        self.publish(&before, &after);
    }

    /// Close without document access; used by outside-interaction callbacks
    pub fn dismiss(&self) {
        let (before, after) = {
            let mut state = lock(&self.state);
            let before = Snapshot::of(&state);
            state.close();
            (before, Snapshot::of(&state))
        };
        self.publish(&before, &after);
    }

    fn publish(&self, before: &Snapshot, after: &Snapshot) {
        if before.open_state != after.open_state {
            self.events.dispatch(&match after.open_state {
                OpenState::Open => CollectionEvent::Opened,
                OpenState::Closed => CollectionEvent::Closed,
            });
        }
        if (before.active_index, &before.active_id) != (after.active_index, &after.active_id) {
            self.events.dispatch(&CollectionEvent::ActiveChanged {
                index: after.active_index,
                id: after.active_id.clone(),
                trigger: after.trigger,
            });
            if let Some(node) = after.active_node {
                if after.trigger != ActivationTrigger::Pointer {
                    self.request_scroll(node);
                }
            }
        }
        if before.value_revision != after.value_revision {
            self.events.dispatch(&CollectionEvent::ValueChanged);
        }
    }

    fn request_scroll(&self, node: NodeId) {
        let slot = self.scroll_request.clone();
        self.frames.request_animation_frame(move || {
            *lock(&slot) = Some(node);
        });
    }

    pub fn open<D: Dom + ?Sized>(&self, dom: &D) {
        self.dispatch(Action::Open, dom);
    }

    pub fn close<D: Dom + ?Sized>(&self, dom: &D) {
        self.dispatch(Action::Close, dom);
    }

    /// Move the active option
    pub fn go_to<D: Dom + ?Sized>(
        &self,
        navigation: Navigation,
        trigger: ActivationTrigger,
        dom: &D,
    ) {
        self.dispatch(
            Action::GoTo {
                navigation,
                trigger,
            },
            dom,
        );
    }

    /// Feed typeahead input and restart the buffer's reset timer
    pub fn search<D: Dom + ?Sized>(&self, input: &str, dom: &D) {
        self.dispatch(Action::search(input), dom);

        self.search_timer.dispose();
        let state = self.state.clone();
        self.search_timer.set_timeout(self.typeahead_timeout, move || {
            lock(&state).clear_search();
        });
    }

    /// Register an option. Keep the returned registration and unregister it
    /// when the option unmounts.
    pub fn register_option<D: Dom + ?Sized>(
        &self,
        option: CollectionOption<V>,
        dom: &D,
    ) -> OptionRegistration<V> {
        let id = option.id.clone();
        self.dispatch(Action::RegisterOption(option), dom);
        OptionRegistration {
            collection: self.clone(),
            id,
        }
    }

    /// Commit the active option
    pub fn select_active<D: Dom + ?Sized>(&self, dom: &D) {
        self.dispatch(Action::SelectActive, dom);
    }

    pub fn value(&self) -> Vec<V> {
        lock(&self.state).value().to_vec()
    }

    pub fn is_selected(&self, value: &V) -> bool {
        lock(&self.state).is_selected(value)
    }
}

/// Live registration of one option
#[must_use = "an option registration must be unregistered when the option unmounts"]
pub struct OptionRegistration<V> {
    collection: Collection<V>,
    id: OptionId,
}

impl<V> fmt::Debug for OptionRegistration<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OptionRegistration").field(&self.id).finish()
    }
}

impl<V: Clone + Send + 'static> OptionRegistration<V> {
    pub fn id(&self) -> &OptionId {
        &self.id
    }

    /// Remove the option from its collection
    pub fn unregister<D: Dom + ?Sized>(self, dom: &D) {
        self.collection
            .dispatch(Action::UnregisterOption(self.id), dom);
    }
}
