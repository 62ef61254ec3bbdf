// Keyboard helpers shared by the kit widgets

use serde::{Deserialize, Serialize};

use crate::collection::{Action, Collection, Navigation};
use crate::context::Callback;
use crate::dom::Dom;
use crate::events::{Key, KeyboardEvent};

/// Axis along which arrow keys move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

impl Orientation {
    /// Arrow key moving forwards on this axis
    pub fn next_key(self) -> Key {
        match self {
            Orientation::Horizontal => Key::ArrowRight,
            Orientation::Vertical => Key::ArrowDown,
        }
    }

    /// Arrow key moving backwards on this axis
    pub fn previous_key(self) -> Key {
        match self {
            Orientation::Horizontal => Key::ArrowLeft,
            Orientation::Vertical => Key::ArrowUp,
        }
    }

    /// `aria-orientation` value
    pub fn as_aria(self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

/// Navigation for list keys: arrows along `orientation`, Home/PageUp and
/// End/PageDown
pub fn navigation_for(key: &Key, orientation: Orientation) -> Option<Navigation> {
    match key {
        Key::Home | Key::PageUp => Some(Navigation::First),
        Key::End | Key::PageDown => Some(Navigation::Last),
        k if *k == orientation.next_key() => Some(Navigation::Next),
        k if *k == orientation.previous_key() => Some(Navigation::Previous),
        _ => None,
    }
}

/// Character a keydown contributes to typeahead. Space only counts while a
/// query is already in progress; modified keys never count.
pub fn typeahead_char(event: &KeyboardEvent, searching: bool) -> Option<char> {
    if event.ctrl || event.meta || event.alt || event.is_composing {
        return None;
    }
    match event.key {
        Key::Space if !searching => None,
        ref key => key.printable(),
    }
}

/// Dispatch a commit and report a value change to `on_change`. Returns
/// whether the value changed.
pub(crate) fn commit<V, D>(
    collection: &Collection<V>,
    action: Action<V>,
    dom: &D,
    on_change: Option<&Callback<Vec<V>>>,
) -> bool
where
    V: Clone + Send + 'static,
    D: Dom + ?Sized,
{
    let before = collection.value_revision();
    collection.dispatch(action, dom);
    let changed = collection.value_revision() != before;
    if changed {
        if let Some(on_change) = on_change {
            on_change.call(collection.value());
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_follows_orientation() {
        let vertical = Orientation::Vertical;
        assert_eq!(navigation_for(&Key::ArrowDown, vertical), Some(Navigation::Next));
        assert_eq!(navigation_for(&Key::ArrowRight, vertical), None);

        let horizontal = Orientation::Horizontal;
        assert_eq!(
            navigation_for(&Key::ArrowLeft, horizontal),
            Some(Navigation::Previous)
        );
        assert_eq!(navigation_for(&Key::PageDown, horizontal), Some(Navigation::Last));
    }

    #[test]
    fn test_space_only_extends_a_running_query() {
        let space = KeyboardEvent::new(Key::Space);
        assert_eq!(typeahead_char(&space, false), None);
        assert_eq!(typeahead_char(&space, true), Some(' '));

        let mut ctrl_a = KeyboardEvent::new(Key::Character('a'));
        ctrl_a.ctrl = true;
        assert_eq!(typeahead_char(&ctrl_a, false), None);
    }
}
