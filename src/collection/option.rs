//! Options: the selectable leaves of a collection

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dom::{Dom, NodeId};

use super::text::TextValue;

/// Opaque identity of an option, unique among its collection's live options
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct OptionId(Arc<str>);

impl OptionId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OptionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OptionId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<OptionId> for String {
    fn from(id: OptionId) -> Self {
        id.0.to_string()
    }
}

/// One registered option
#[derive(Debug, Clone)]
pub struct CollectionOption<V> {
    /// Stable identity
    pub id: OptionId,
    /// Backing element. The engine never destroys it.
    pub node: NodeId,
    /// Sort key supplied by virtualized collections; overrides DOM order when
    /// every option carries one
    pub order: Option<i64>,
    /// Disabled options stay registered but are skipped by navigation
    pub disabled: bool,
    /// Payload compared with the collection's comparator
    pub value: V,
    text: TextValue,
}

impl<V> CollectionOption<V> {
    /// An enabled option without an order key
    pub fn new(id: impl Into<OptionId>, node: NodeId, value: V) -> Self {
        Self {
            id: id.into(),
            node,
            order: None,
            disabled: false,
            value,
            text: TextValue::new(),
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    /// Lowercase typeahead text, served from cache while the node's text is unchanged
    pub fn text_value<D: Dom + ?Sized>(&mut self, dom: &D) -> &str {
        self.text.resolve(dom, self.node)
    }

    /// Drop the cached text value
    pub fn invalidate_text(&mut self) {
        self.text.invalidate();
    }
}
