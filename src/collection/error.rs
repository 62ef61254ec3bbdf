//! Error types for collection wiring

/// Errors raised when a collection or one of its leaves is wired incorrectly.
///
/// These always indicate a structural mistake in how widgets were composed,
/// never a runtime race, so they are raised at construction time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    /// A leaf component was created without its required ancestor
    #[error("<{component} /> is missing a parent <{parent} /> component.")]
    MissingParent {
        component: &'static str,
        parent: &'static str,
    },

    /// A selecting collection was built without a value comparator
    #[error("<{collection} /> requires a value comparator (by value, by field, or custom)")]
    MissingComparator { collection: &'static str },

    /// A field comparator could not read the named field from a value
    #[error("Comparator error: {0}")]
    Comparator(String),
}
