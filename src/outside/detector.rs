//! Outside interaction detection
//!
//! The detector listens to document-level pointer, touch and window events
//! and fires its callback when a gesture ends outside every owned container.
//! Only the top layer of its purpose listens at all.

use std::fmt;

use crate::config::Services;
use crate::context::Callback;
use crate::dom::{query, Dom, NodeId};
use crate::events::{PointerEvent, TouchEvent};
use crate::focus::{is_focusable, FocusableMode};

use super::top_layer::{LayerGuard, TopLayerRegistry};

/// Purpose key under which detectors stack
pub const OUTSIDE_CLICK: &str = "outside-click";

/// What ended the outside gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Click,
    Tap,
    /// Focus moved into an iframe
    WindowBlur,
}

/// Passed to the outside callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutsideInteraction {
    pub kind: InteractionKind,
    pub target: NodeId,
    /// Whether the detector cancelled the event's default action
    pub default_prevented: bool,
}

/// How the detector evaluated one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not listening, or nothing to evaluate
    Ignored,
    Inside,
    Outside,
}

/// Closes popovers on interaction outside their containers
pub struct OutsideInteractionDetector {
    containers: Vec<NodeId>,
    callback: Callback<OutsideInteraction>,
    layers: TopLayerRegistry,
    layer: Option<LayerGuard>,
    initial_target: Option<NodeId>,
    touch_start: (f64, f64),
    tap_handled: bool,
    move_threshold: f64,
    ignore_clicks: bool,
}

impl fmt::Debug for OutsideInteractionDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutsideInteractionDetector")
            .field("containers", &self.containers)
            .field("enabled", &self.is_enabled())
            .field("initial_target", &self.initial_target)
            .finish()
    }
}

impl OutsideInteractionDetector {
    /// Create a disabled detector
    pub fn new(services: &Services, callback: Callback<OutsideInteraction>) -> Self {
        Self {
            containers: Vec::new(),
            callback,
            layers: services.layers.clone(),
            layer: None,
            initial_target: None,
            touch_start: (0.0, 0.0),
            tap_handled: false,
            move_threshold: services.config.touch_move_threshold_px,
            ignore_clicks: services.config.ignore_clicks_on_touch_devices,
        }
    }

    /// Replace the owned containers
    pub fn set_containers(&mut self, containers: impl IntoIterator<Item = NodeId>) {
        self.containers = containers.into_iter().collect();
    }

    pub fn containers(&self) -> &[NodeId] {
        &self.containers
    }

    /// Enabling pushes a new top layer; disabling pops it. Either transition
    /// forgets any gesture in progress.
    pub fn set_enabled(&mut self, enabled: bool) {
        match (enabled, self.layer.is_some()) {
            (true, false) => self.layer = Some(self.layers.push(OUTSIDE_CLICK)),
            (false, true) => self.layer = None,
            _ => return,
        }
        self.initial_target = None;
        self.tap_handled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.layer.is_some()
    }

    /// Enabled and not shadowed by a later detector
    pub fn is_listening(&self) -> bool {
        self.layer.as_ref().is_some_and(|l| l.is_top())
    }

    /// `pointerdown` listener (capture phase)
    pub fn on_pointer_down(&mut self, event: &PointerEvent) {
        if self.is_listening() {
            self.initial_target = Some(event.origin());
        }
    }

    /// `mousedown` listener (capture phase)
    pub fn on_mouse_down(&mut self, event: &PointerEvent) {
        self.on_pointer_down(event);
    }

    /// `click` listener (capture phase). Evaluates the target captured at
    /// pointer-down, not the click's own target.
    pub fn on_click<D: Dom + ?Sized>(&mut self, dom: &D, event: &mut PointerEvent) -> Verdict {
        // The compatibility click of a tap is consumed even when this
        // detector no longer listens.
        let after_tap = std::mem::take(&mut self.tap_handled);
        if !self.is_listening() || self.ignore_clicks || after_tap {
            self.initial_target = None;
            return Verdict::Ignored;
        }
        let Some(target) = self.initial_target.take() else {
            return Verdict::Ignored;
        };
        let composed = event.composed.then(|| event.composed_path.clone());
        let mut prevented = event.is_default_prevented();
        let verdict = self.evaluate(
            dom,
            InteractionKind::Click,
            target,
            composed.as_deref(),
            &mut prevented,
        );
        if prevented && !event.is_default_prevented() {
            event.prevent_default();
        }
        verdict
    }

    /// `touchstart` listener (capture phase)
    pub fn on_touch_start(&mut self, event: &TouchEvent) {
        if self.is_listening() {
            self.touch_start = (event.client_x, event.client_y);
            self.tap_handled = false;
        }
    }

    /// `touchend` listener (capture phase). Gestures that moved at least the
    /// configured threshold on either axis are scrolls, not taps.
    pub fn on_touch_end<D: Dom + ?Sized>(&mut self, dom: &D, event: &mut TouchEvent) -> Verdict {
        if !self.is_listening() {
            return Verdict::Ignored;
        }
        let (x, y) = self.touch_start;
        if (event.client_x - x).abs() >= self.move_threshold
            || (event.client_y - y).abs() >= self.move_threshold
        {
            log::trace!("touch moved past threshold; not a tap");
            return Verdict::Ignored;
        }
        self.tap_handled = true;
        let mut prevented = event.is_default_prevented();
        let verdict = self.evaluate(dom, InteractionKind::Tap, event.target, None, &mut prevented);
        if prevented && !event.is_default_prevented() {
            event.prevent_default();
        }
        verdict
    }

    /// Window `blur` listener. Focus moving into an iframe is an outside
    /// interaction with that iframe.
    pub fn on_window_blur<D: Dom + ?Sized>(&mut self, dom: &D) -> Verdict {
        if !self.is_listening() {
            return Verdict::Ignored;
        }
        let Some(frame) = dom
            .active_element()
            .filter(|&n| dom.tag_name(n) == Some("iframe"))
        else {
            return Verdict::Ignored;
        };
        let mut prevented = false;
        self.evaluate(dom, InteractionKind::WindowBlur, frame, None, &mut prevented)
    }

    fn evaluate<D: Dom + ?Sized>(
        &self,
        dom: &D,
        kind: InteractionKind,
        target: NodeId,
        composed_path: Option<&[NodeId]>,
        prevented: &mut bool,
    ) -> Verdict {
        if *prevented || !dom.is_connected(target) {
            return Verdict::Ignored;
        }
        let inside = self.containers.iter().any(|&container| {
            query::contains(dom, container, target)
                || composed_path.is_some_and(|path| path.contains(&container))
        });
        if inside {
            return Verdict::Inside;
        }

        if !is_focusable(dom, target, FocusableMode::Loose)
            && dom.attribute(target, "tabindex") != Some("-1")
        {
            *prevented = true;
        }
        log::debug!("outside {:?} on {}", kind, target);
        self.callback.call(OutsideInteraction {
            kind,
            target,
            default_prevented: *prevented,
        });
        Verdict::Outside
    }
}
