//! Focus trap controller
//!
//! While engaged, keeps Tab cycling and focus inside a container, seeds the
//! initial focus on engage and hands focus back on disengage.

use crate::config::Services;
use crate::dom::{query, Dom, NodeId};
use crate::events::{FocusEvent, Key, KeyboardEvent};

use super::direction::{TabDirection, TabDirectionTracker};
use super::focusable::{focus_element, focus_in, FocusFlags, FocusResult, FocusScope};
use super::history::ActiveElementHistory;

bitflags::bitflags! {
    /// Behaviours a trap enables
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TrapFeatures: u8 {
        /// Move focus inside on engage
        const INITIAL_FOCUS = 0b0000_0001;
        /// Tab and Shift+Tab wrap inside the container
        const TAB_LOCK      = 0b0000_0010;
        /// Focus landing outside is pulled back
        const FOCUS_LOCK    = 0b0000_0100;
        /// Give focus back on disengage
        const RESTORE_FOCUS = 0b0000_1000;
        /// Prefer `[data-autofocus]` elements for initial focus
        const AUTO_FOCUS    = 0b0001_0000;
    }
}

impl Default for TrapFeatures {
    fn default() -> Self {
        Self::INITIAL_FOCUS | Self::TAB_LOCK | Self::FOCUS_LOCK | Self::RESTORE_FOCUS
    }
}

/// Construction options for [`FocusTrapController`]
#[derive(Debug, Clone, Default)]
pub struct FocusTrapProps {
    /// Element to focus on engage instead of the first focusable one
    pub initial_focus: Option<NodeId>,
    /// Focused when the container has nothing focusable
    pub initial_focus_fallback: Option<NodeId>,
    /// Extra elements treated as inside the trap (portalled popovers)
    pub containers: Vec<NodeId>,
    pub features: Option<TrapFeatures>,
    /// Invisible focus guards placed right before and after the container
    pub sentinels: Option<(NodeId, NodeId)>,
}

/// Focus trap over one container
#[derive(Debug)]
pub struct FocusTrapController {
    container: NodeId,
    props: FocusTrapProps,
    features: TrapFeatures,
    history: ActiveElementHistory,
    tab_direction: TabDirectionTracker,
    /// Held focus right before engage
    restore_target: Option<NodeId>,
    /// Last element focused inside while engaged
    last_focused: Option<NodeId>,
    engaged: bool,
}

impl FocusTrapController {
    pub fn new(container: NodeId, props: FocusTrapProps, services: &Services) -> Self {
        Self {
            container,
            features: props.features.unwrap_or_default(),
            props,
            history: services.history.clone(),
            tab_direction: services.tab_direction.clone(),
            restore_target: None,
            last_focused: None,
            engaged: false,
        }
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn features(&self) -> TrapFeatures {
        self.features
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Whether `node` lies in the container or one of the extra containers
    pub fn contains<D: Dom + ?Sized>(&self, dom: &D, node: NodeId) -> bool {
        std::iter::once(&self.container)
            .chain(self.props.containers.iter())
            .any(|&c| query::contains(dom, c, node))
    }

    fn is_sentinel(&self, node: NodeId) -> bool {
        self.props
            .sentinels
            .is_some_and(|(before, after)| node == before || node == after)
    }

    /// Activate the trap and place the initial focus
    pub fn engage<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        if self.engaged {
            return;
        }
        log::debug!("focus trap on {} engaged", self.container);
        self.engaged = true;
        self.restore_target = dom.active_element();

        if self
            .features
            .intersects(TrapFeatures::INITIAL_FOCUS | TrapFeatures::AUTO_FOCUS)
        {
            self.place_initial_focus(dom);
        }
        self.last_focused = dom
            .active_element()
            .filter(|&n| self.contains(&*dom, n));
    }

    fn place_initial_focus<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        let active = dom.active_element();
        match self.props.initial_focus {
            Some(target) if active == Some(target) => return,
            None if active.is_some_and(|a| query::contains(&*dom, self.container, a)) => return,
            _ => {}
        }

        if let Some(target) = self.props.initial_focus {
            focus_element(dom, target);
            return;
        }

        let scope = FocusScope::Container(self.container);
        if self.features.contains(TrapFeatures::AUTO_FOCUS)
            && focus_in(dom, scope, FocusFlags::FIRST | FocusFlags::AUTO_FOCUS, None, &[])
                != FocusResult::Error
        {
            return;
        }
        if focus_in(dom, scope, FocusFlags::FIRST, None, &[]) != FocusResult::Error {
            return;
        }
        self.focus_fallback_or_warn(dom);
    }

    fn focus_fallback_or_warn<D: Dom + ?Sized>(&self, dom: &mut D) -> FocusResult {
        if let Some(fallback) = self.props.initial_focus_fallback {
            if focus_element(dom, fallback) && dom.active_element() == Some(fallback) {
                return FocusResult::Success;
            }
        }
        log::warn!(
            "There are no focusable elements inside the focus trap on {}",
            self.container
        );
        FocusResult::Error
    }

    /// Deactivate the trap and restore focus. The element focused before
    /// engage wins while still connected; otherwise the newest connected
    /// history entry outside the trap is used.
    pub fn disengage<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        if !self.engaged {
            return;
        }
        log::debug!("focus trap on {} disengaged", self.container);
        self.engaged = false;
        self.last_focused = None;
        let previous = self.restore_target.take();

        if !self.features.contains(TrapFeatures::RESTORE_FOCUS) {
            return;
        }
        let target = previous
            .filter(|&n| dom.is_connected(n))
            .or_else(|| {
                self.history
                    .find(&*dom, |n| !self.contains(&*dom, n))
            });
        match target {
            Some(target) => {
                focus_element(dom, target);
            }
            None => log::warn!("no element to restore focus to"),
        }
    }

    /// `keydown` listener. Returns whether the event was consumed.
    pub fn on_key_down<D: Dom + ?Sized>(&mut self, dom: &mut D, event: &mut KeyboardEvent) -> bool {
        self.tab_direction.on_key_down(event);
        if !self.engaged || event.key != Key::Tab || !self.features.contains(TrapFeatures::TAB_LOCK)
        {
            return false;
        }
        event.prevent_default();
        self.cycle(dom);
        true
    }

    /// Move focus one step in the current Tab direction, wrapping inside
    /// the container
    pub fn cycle<D: Dom + ?Sized>(&mut self, dom: &mut D) -> FocusResult {
        let backwards = self.tab_direction.direction() == TabDirection::Backwards;
        let inside = dom
            .active_element()
            .is_some_and(|a| query::contains(&*dom, self.container, a));
        let flags = match (inside, backwards) {
            (true, false) => FocusFlags::NEXT | FocusFlags::WRAP_AROUND,
            (true, true) => FocusFlags::PREVIOUS | FocusFlags::WRAP_AROUND,
            (false, false) => FocusFlags::FIRST,
            (false, true) => FocusFlags::LAST,
        };
        let result = focus_in(dom, FocusScope::Container(self.container), flags, None, &[]);
        self.settle(dom, result)
    }

    /// A sentinel received focus: Tab ran off one end of the container.
    /// Focus re-enters at the first element when moving forwards and at the
    /// last one when moving backwards.
    pub fn on_sentinel_focus<D: Dom + ?Sized>(
        &mut self,
        dom: &mut D,
        related_target: Option<NodeId>,
    ) -> FocusResult {
        if !self.engaged || !self.features.contains(TrapFeatures::TAB_LOCK) {
            return FocusResult::Error;
        }
        let flags = match self.tab_direction.direction() {
            TabDirection::Forwards => FocusFlags::FIRST,
            TabDirection::Backwards => FocusFlags::LAST,
        };
        let skip: Vec<NodeId> = related_target
            .into_iter()
            .chain(self.props.initial_focus_fallback)
            .collect();
        let result = focus_in(dom, FocusScope::Container(self.container), flags, None, &skip);
        self.settle(dom, result)
    }

    fn settle<D: Dom + ?Sized>(&mut self, dom: &mut D, result: FocusResult) -> FocusResult {
        let result = match result {
            FocusResult::Error => self.focus_fallback_or_warn(dom),
            other => other,
        };
        if result == FocusResult::Success {
            self.last_focused = dom.active_element();
        }
        result
    }

    /// Window `focus` listener (capture phase). Returns whether focus was
    /// redirected.
    pub fn on_focus<D: Dom + ?Sized>(&mut self, dom: &mut D, event: &FocusEvent) -> bool {
        if !self.engaged {
            return false;
        }
        if self.is_sentinel(event.target) {
            return self.on_sentinel_focus(dom, event.related_target) == FocusResult::Success;
        }
        if !self.features.contains(TrapFeatures::FOCUS_LOCK) {
            return false;
        }
        if self.contains(&*dom, event.target) {
            self.last_focused = Some(event.target);
            return false;
        }
        match self.last_focused.filter(|&n| dom.is_connected(n)) {
            Some(previous) => {
                log::trace!("focus left trap on {}; pulling it back", self.container);
                focus_element(dom, previous)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    struct Fixture {
        dom: MemoryDom,
        outside: NodeId,
        dialog: NodeId,
        buttons: Vec<NodeId>,
    }

    fn fixture(count: usize) -> Fixture {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let outside = dom.append_element(body, "button");
        let dialog = dom.append_element(body, "div");
        let buttons = (0..count)
            .map(|_| dom.append_element(dialog, "button"))
            .collect();
        dom.focus(outside, Default::default());
        Fixture {
            dom,
            outside,
            dialog,
            buttons,
        }
    }

    #[test]
    fn test_engage_focuses_first_and_disengage_restores() {
        let mut f = fixture(2);
        let services = Services::default();
        let mut trap = FocusTrapController::new(f.dialog, FocusTrapProps::default(), &services);

        trap.engage(&mut f.dom);
        assert_eq!(f.dom.active_element(), Some(f.buttons[0]));

        trap.disengage(&mut f.dom);
        assert_eq!(f.dom.active_element(), Some(f.outside));
    }

    #[test]
    fn test_explicit_initial_focus_wins() {
        let mut f = fixture(3);
        let services = Services::default();
        let props = FocusTrapProps {
            initial_focus: Some(f.buttons[2]),
            ..Default::default()
        };
        let mut trap = FocusTrapController::new(f.dialog, props, &services);
        trap.engage(&mut f.dom);
        assert_eq!(f.dom.active_element(), Some(f.buttons[2]));
    }

    #[test]
    fn test_focus_already_inside_is_kept() {
        let mut f = fixture(3);
        f.dom.focus(f.buttons[1], Default::default());
        let services = Services::default();
        let mut trap = FocusTrapController::new(f.dialog, FocusTrapProps::default(), &services);
        trap.engage(&mut f.dom);
        assert_eq!(f.dom.active_element(), Some(f.buttons[1]));
    }

    #[test]
    fn test_tab_wraps_both_ways() {
        let mut f = fixture(3);
        let services = Services::default();
        let mut trap = FocusTrapController::new(f.dialog, FocusTrapProps::default(), &services);
        trap.engage(&mut f.dom);

        let mut shift_tab = KeyboardEvent::new(Key::Tab).with_shift();
        assert!(trap.on_key_down(&mut f.dom, &mut shift_tab));
        assert!(shift_tab.is_default_prevented());
        assert_eq!(f.dom.active_element(), Some(f.buttons[2]));

        let mut tab = KeyboardEvent::new(Key::Tab);
        trap.on_key_down(&mut f.dom, &mut tab);
        assert_eq!(f.dom.active_element(), Some(f.buttons[0]));
    }

    #[test]
    fn test_empty_trap_uses_fallback() {
        let mut f = fixture(0);
        let fallback = f.dom.append_element(f.dialog, "div");
        f.dom.set_attribute(fallback, "tabindex", "-1");
        let services = Services::default();
        let props = FocusTrapProps {
            initial_focus_fallback: Some(fallback),
            ..Default::default()
        };
        let mut trap = FocusTrapController::new(f.dialog, props, &services);
        trap.engage(&mut f.dom);
        assert_eq!(f.dom.active_element(), Some(fallback));
    }

    #[test]
    fn test_empty_trap_without_fallback_only_warns() {
        let mut f = fixture(0);
        let services = Services::default();
        let mut trap = FocusTrapController::new(f.dialog, FocusTrapProps::default(), &services);
        trap.engage(&mut f.dom);
        assert!(trap.is_engaged());
        assert_eq!(f.dom.active_element(), Some(f.outside));
        assert_eq!(trap.cycle(&mut f.dom), FocusResult::Error);
    }

    #[test]
    fn test_sentinel_redirects_by_direction() {
        let mut f = fixture(2);
        let body = f.dom.body();
        let before = f.dom.create_element("span");
        f.dom.insert_before(body, before, Some(f.dialog));
        f.dom.set_attribute(before, "tabindex", "0");
        let after = f.dom.append_element(body, "span");
        f.dom.set_attribute(after, "tabindex", "0");

        let services = Services::default();
        let props = FocusTrapProps {
            sentinels: Some((before, after)),
            ..Default::default()
        };
        let mut trap = FocusTrapController::new(f.dialog, props, &services);
        trap.engage(&mut f.dom);

        services
            .tab_direction
            .on_key_down(&KeyboardEvent::new(Key::Tab).with_shift());
        f.dom.focus(before, Default::default());
        assert!(trap.on_focus(&mut f.dom, &FocusEvent::new(before, Some(f.buttons[0]))));
        assert_eq!(f.dom.active_element(), Some(f.buttons[1]));

        services
            .tab_direction
            .on_key_down(&KeyboardEvent::new(Key::Tab));
        f.dom.focus(after, Default::default());
        assert!(trap.on_focus(&mut f.dom, &FocusEvent::new(after, Some(f.buttons[1]))));
        assert_eq!(f.dom.active_element(), Some(f.buttons[0]));
    }

    #[test]
    fn test_focus_lock_pulls_focus_back() {
        let mut f = fixture(2);
        let services = Services::default();
        let mut trap = FocusTrapController::new(f.dialog, FocusTrapProps::default(), &services);
        trap.engage(&mut f.dom);
        f.dom.focus(f.buttons[1], Default::default());
        trap.on_focus(&mut f.dom, &FocusEvent::new(f.buttons[1], Some(f.buttons[0])));

        f.dom.focus(f.outside, Default::default());
        assert!(trap.on_focus(&mut f.dom, &FocusEvent::new(f.outside, Some(f.buttons[1]))));
        assert_eq!(f.dom.active_element(), Some(f.buttons[1]));
    }

    #[test]
    fn test_restore_falls_back_to_history() {
        let mut f = fixture(1);
        let body = f.dom.body();
        let other = f.dom.append_element(body, "button");
        let services = Services::default();
        services.history.record(&f.dom, other);
        services.history.record(&f.dom, f.outside);

        let mut trap = FocusTrapController::new(f.dialog, FocusTrapProps::default(), &services);
        trap.engage(&mut f.dom);
        services.history.record(&f.dom, f.buttons[0]);
        f.dom.remove(f.outside);

        trap.disengage(&mut f.dom);
        assert_eq!(f.dom.active_element(), Some(other));
    }
}
