//! Collections: ordered options, an active option and a value
//!
//! Every selection widget in the kit is built on the same pieces:
//! - [`OptionRegistry`] keeps mounted options in display order
//! - [`resolve`] maps a [`Navigation`] to the next active index
//! - [`TypeaheadMatcher`] turns printable keys into a prefix search
//! - [`CollectionState`] and [`transition`] tie them into one state machine
//! - [`Collection`] shares that machine between a widget's parts

mod comparator;
mod error;
mod handle;
mod machine;
mod option;
mod registry;
mod resolver;
mod text;
mod typeahead;

pub use comparator::Comparator;
pub use error::CollectionError;
pub use handle::{Collection, CollectionEvent, OptionRegistration};
pub use machine::{
    transition, Action, ActivationTrigger, CollectionBuilder, CollectionState, OpenState,
    SelectionMode,
};
pub use option::{CollectionOption, OptionId};
pub use registry::OptionRegistry;
pub use resolver::{resolve, resolve_wrapping, Navigable, Navigation};
pub use text::{text_value, TextValue};
pub use typeahead::TypeaheadMatcher;
