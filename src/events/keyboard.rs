//! Keyboard events and DOM key values

use std::str::FromStr;

use super::EventPropagation;

/// A DOM `KeyboardEvent.key` value the engine reacts to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Escape,
    Tab,
    Space,
    Backspace,
    /// Any other single printable character
    Character(char),
    /// Named keys the engine ignores (`Shift`, `F5`, ...)
    Other(String),
}

impl Key {
    /// The printable character this key produces, if any.
    /// `Space` produces `' '`.
    pub fn printable(&self) -> Option<char> {
        match self {
            Key::Character(c) => Some(*c),
            Key::Space => Some(' '),
            _ => None,
        }
    }
}

impl FromStr for Key {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Home" => Key::Home,
            "End" => Key::End,
            "PageUp" => Key::PageUp,
            "PageDown" => Key::PageDown,
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            "Tab" => Key::Tab,
            " " | "Space" | "Spacebar" => Key::Space,
            "Backspace" => Key::Backspace,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c),
                    _ => Key::Other(other.to_string()),
                }
            }
        })
    }
}

/// A `keydown`/`keyup` event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub key: Key,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    /// IME composition in progress
    pub is_composing: bool,
    pub propagation: EventPropagation,
}

impl KeyboardEvent {
    /// Event for a key with no modifiers held
    pub fn new(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
            alt: false,
            meta: false,
            is_composing: false,
            propagation: EventPropagation::default(),
        }
    }

    /// Parse the DOM `.key` string
    pub fn from_dom_key(key: &str) -> Self {
        let key = match key.parse() {
            Ok(key) => key,
            Err(never) => match never {},
        };
        Self::new(key)
    }

    /// Same event with Shift held
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn prevent_default(&mut self) {
        self.propagation.prevent_default();
    }

    pub fn stop_propagation(&mut self) {
        self.propagation.stop_propagation();
    }

    pub fn is_default_prevented(&self) -> bool {
        self.propagation.is_default_prevented()
    }
}
