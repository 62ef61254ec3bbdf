//! Direction of the Tab key sequence in flight

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::events::{Key, KeyboardEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabDirection {
    Forwards,
    Backwards,
}

/// Remembers whether Shift was held on the latest Tab keydown.
///
/// Only one Tab sequence can be in flight, so a single tracker is shared by
/// every trap.
#[derive(Debug, Clone, Default)]
pub struct TabDirectionTracker {
    backwards: Arc<AtomicBool>,
}

impl TabDirectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Window `keydown` listener (capture phase)
    pub fn on_key_down(&self, event: &KeyboardEvent) {
        if event.key == Key::Tab {
            self.backwards.store(event.shift, Ordering::Relaxed);
        }
    }

    pub fn direction(&self) -> TabDirection {
        if self.backwards.load(Ordering::Relaxed) {
            TabDirection::Backwards
        } else {
            TabDirection::Forwards
        }
    }
}
