//! Host DOM abstraction for the headless engine
//!
//! The engine never owns elements. It sees the host document through the
//! [`Dom`] trait, which exposes just enough of a tree to answer the questions
//! the engine asks:
//! - where is this node in composed document order?
//! - is it still connected, and which containers hold it?
//! - what text does it show, and what attributes does it carry?
//! - which element has focus, and can focus be moved?
//!
//! [`MemoryDom`] is a complete in-memory host, used by the test-suite and by
//! hosts that keep their own retained tree.

pub mod memory;
pub mod query;

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use memory::MemoryDom;

/// Stable handle for a node owned by the host document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Options passed along when the engine moves focus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusOptions {
    /// Ask the host not to scroll the newly focused element into view
    pub prevent_scroll: bool,
}

impl FocusOptions {
    /// Focus without scrolling
    pub fn no_scroll() -> Self {
        Self {
            prevent_scroll: true,
        }
    }
}

/// Read access to the host document, plus focus movement
///
/// Shadow roots are modelled as nodes whose [`Dom::shadow_host`] is the
/// element they are attached to. They are not listed among the host's
/// children; composed traversal crosses them through `shadow_host`.
pub trait Dom {
    /// The document node
    fn root(&self) -> NodeId;

    /// Parent in the light tree (`None` for the document and for shadow roots)
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children in tree order
    fn children(&self, node: NodeId) -> &[NodeId];

    /// For a shadow root, the element hosting it
    fn shadow_host(&self, node: NodeId) -> Option<NodeId>;

    /// The shadow root attached to an element, if any
    fn shadow_root(&self, node: NodeId) -> Option<NodeId>;

    /// Lowercase tag name for elements, `None` for text nodes and roots
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    /// Character data for text nodes
    fn text(&self, node: NodeId) -> Option<&str>;

    /// Attribute value on an element
    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Lookup by the `id` attribute among connected elements
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Currently focused element
    fn active_element(&self) -> Option<NodeId>;

    /// Try to focus `node`. Returns whether focus actually landed there.
    fn focus(&mut self, node: NodeId, options: FocusOptions) -> bool;

    /// Select the text content of an input-like element
    fn select_text(&mut self, _node: NodeId) {}

    /// Parent in the composed tree: light parent, or shadow host for a shadow root
    fn composed_parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).or_else(|| self.shadow_host(node))
    }

    /// Whether `node` is reachable from the document root
    fn is_connected(&self, node: NodeId) -> bool {
        query::is_connected(self, node)
    }

    /// Order of `a` relative to `b` in composed document order.
    /// `None` when either node is detached.
    fn document_order(&self, a: NodeId, b: NodeId) -> Option<Ordering> {
        query::document_order(self, a, b)
    }

    /// Whether the node is an element
    fn is_element(&self, node: NodeId) -> bool {
        self.tag_name(node).is_some()
    }

    /// Presence check for boolean attributes
    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }
}
