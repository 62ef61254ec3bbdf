//! Active index resolution
//!
//! [`resolve`] is a pure function from a navigation intent and the current
//! ordered items to the next active index. It never fails: when no target
//! qualifies it returns the current index unchanged.

use super::{CollectionOption, OptionId};

/// What a navigation action asks for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// First enabled item
    First,
    /// Closest enabled item before the current one
    Previous,
    /// Closest enabled item after the current one
    Next,
    /// Last enabled item
    Last,
    /// The item with this id, disabled or not
    Specific(OptionId),
    /// Explicit deactivation
    Nothing,
}

impl Navigation {
    pub fn specific(id: impl Into<OptionId>) -> Self {
        Navigation::Specific(id.into())
    }
}

/// Read access the resolver needs on each item
pub trait Navigable {
    fn id(&self) -> &OptionId;
    fn is_disabled(&self) -> bool;
}

impl<V> Navigable for CollectionOption<V> {
    fn id(&self) -> &OptionId {
        &self.id
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// Compute the next active index.
///
/// - `First`/`Last` scan from the respective end for the first enabled item.
/// - `Next` scans forward from just after `current` (from 0 when nothing is
///   active); `Previous` scans backward from just before `current` (from the
///   end when nothing is active).
/// - `Specific` matches by id and may land on a disabled item.
/// - `Nothing` always yields `None`.
///
/// Every scan that finds nothing returns `current` unchanged, as does an
/// empty `items`.
pub fn resolve<T: Navigable>(
    navigation: &Navigation,
    items: &[T],
    current: Option<usize>,
) -> Option<usize> {
    if let Navigation::Nothing = navigation {
        return None;
    }
    if items.is_empty() {
        return current;
    }
    // A stale index past the end behaves like "nothing active".
    let anchor = current.filter(|&i| i < items.len());
    let enabled = |i: &usize| !items[*i].is_disabled();

    let found = match navigation {
        Navigation::First => (0..items.len()).find(enabled),
        Navigation::Last => (0..items.len()).rev().find(enabled),
        Navigation::Previous => {
            let start = anchor.unwrap_or(items.len());
            (0..start).rev().find(enabled)
        }
        Navigation::Next => {
            let start = anchor.map_or(0, |i| i + 1);
            (start..items.len()).find(enabled)
        }
        Navigation::Specific(id) => items.iter().position(|item| item.id() == id),
        Navigation::Nothing => None,
    };

    found.or(current)
}

/// [`resolve`], but `Next` past the last enabled item wraps to the first and
/// `Previous` before the first wraps to the last.
pub fn resolve_wrapping<T: Navigable>(
    navigation: &Navigation,
    items: &[T],
    current: Option<usize>,
) -> Option<usize> {
    let resolved = resolve(navigation, items, current);
    if resolved != current || current.is_none() {
        return resolved;
    }
    match navigation {
        Navigation::Next => resolve(&Navigation::First, items, current),
        Navigation::Previous => resolve(&Navigation::Last, items, current),
        _ => resolved,
    }
}
