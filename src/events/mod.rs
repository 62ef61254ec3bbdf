//! Host event types consumed by the engine
//!
//! The event system provides:
//! - Keyboard events carrying a parsed DOM `.key` value
//! - Pointer, touch and focus events carrying their target and composed path
//! - Default-prevention and propagation flags shared by all of them
//! - A typed dispatcher used for change notifications

pub mod dispatcher;
pub mod event;
pub mod keyboard;
pub mod pointer;

pub use dispatcher::{Dispatcher, Subscription};
pub use event::EventPropagation;
pub use keyboard::{Key, KeyboardEvent};
pub use pointer::{FocusEvent, PointerEvent, TouchEvent};
