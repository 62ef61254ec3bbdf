//! Propagation state shared by every host event

/// Controls how an event propagates and whether its default action runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventPropagation {
    /// Whether the event should continue propagating
    pub stopped: bool,

    /// Whether the default action should be prevented
    pub default_prevented: bool,
}

impl EventPropagation {
    /// Stop event propagation
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    /// Prevent the default action
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Check if propagation is stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped
    }

    /// Check if default is prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}
