//! Focus management
//!
//! Focusable discovery, relative focus movement, the shared focus history
//! and the focus trap built on top of them.

mod direction;
mod focusable;
mod history;
mod trap;

pub use direction::{TabDirection, TabDirectionTracker};
pub use focusable::{
    autofocus_elements, focus_element, focus_from, focus_in, focusable_elements, is_focusable,
    is_focusable_element, sort_by_document_order, FocusFlags, FocusResult, FocusScope,
    FocusableMode,
};
pub use history::ActiveElementHistory;
pub use trap::{FocusTrapController, FocusTrapProps, TrapFeatures};
