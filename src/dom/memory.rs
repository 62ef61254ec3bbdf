//! In-memory document host
//!
//! An arena-backed tree with elements, text nodes and shadow roots. Nodes are
//! never freed; removing a node only detaches it, so stale [`NodeId`]s keep
//! answering queries the way detached DOM nodes do.

use std::collections::BTreeMap;

use super::query;
use super::{Dom, FocusOptions, NodeId};

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(String),
    Text(String),
    ShadowRoot(NodeId),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    shadow_root: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            shadow_root: None,
        }
    }
}

/// Arena document implementing [`Dom`]
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<NodeData>,
    body: NodeId,
    active: Option<NodeId>,
    /// Every successful focus call, in order
    focus_log: Vec<(NodeId, FocusOptions)>,
    selected_text: Option<NodeId>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Create a document with an empty `<body>`
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: vec![NodeData::new(NodeKind::Document)],
            body: NodeId(0),
            active: None,
            focus_log: Vec::new(),
            selected_text: None,
        };
        let body = dom.create_element("body");
        dom.append_child(NodeId(0), body);
        dom.body = body;
        dom
    }

    /// The `<body>` element
    pub fn body(&self) -> NodeId {
        self.body
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(kind));
        id
    }

    fn data(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.0)
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(tag.to_ascii_lowercase()))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Move `child` to the end of `parent`'s children
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` under `parent` before `reference`, or at the end
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = reference
            .and_then(|r| children.iter().position(|&c| c == r))
            .unwrap_or(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Create an element and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.create_element(tag);
        self.append_child(parent, node);
        node
    }

    /// Create a text node and append it to `parent`
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = self.create_text(text);
        self.append_child(parent, node);
        node
    }

    /// Replace the children of `node` with a single text node
    pub fn set_text_content(&mut self, node: NodeId, text: &str) {
        for child in self.nodes[node.0].children.clone() {
            self.detach(child);
        }
        self.append_text(node, text);
    }

    /// Replace the data of a text node
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let NodeKind::Text(data) = &mut self.nodes[node.0].kind {
            *data = text.to_string();
        }
    }

    /// Attach an open shadow root to `host`
    pub fn attach_shadow(&mut self, host: NodeId) -> NodeId {
        let shadow = self.push(NodeKind::ShadowRoot(host));
        self.nodes[host.0].shadow_root = Some(shadow);
        shadow
    }

    /// Set an attribute
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.nodes[node.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    /// Remove an attribute
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.nodes[node.0].attributes.remove(name);
    }

    /// Detach `node` (and its subtree) from its parent.
    /// Focus inside the removed subtree is dropped, as browsers do.
    pub fn remove(&mut self, node: NodeId) {
        self.detach(node);
        if let Some(active) = self.active {
            if !self.is_connected(active) {
                self.active = None;
            }
        }
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    /// Drop focus without moving it elsewhere
    pub fn blur(&mut self) {
        self.active = None;
    }

    /// Every successful focus call, oldest first
    pub fn focus_log(&self) -> &[(NodeId, FocusOptions)] {
        &self.focus_log
    }

    /// The last element whose text was selected
    pub fn selected_text(&self) -> Option<NodeId> {
        self.selected_text
    }

    fn is_focus_blocked(&self, node: NodeId) -> bool {
        if self.has_attribute(node, "disabled") {
            return true;
        }
        query::closest(self, node, |dom, n| dom.has_attribute(n, "inert")).is_some()
    }
}

impl Dom for MemoryDom {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).and_then(|d| d.parent)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.data(node).map(|d| d.children.as_slice()).unwrap_or(&[])
    }

    fn shadow_host(&self, node: NodeId) -> Option<NodeId> {
        match self.data(node)?.kind {
            NodeKind::ShadowRoot(host) => Some(host),
            _ => None,
        }
    }

    fn shadow_root(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).and_then(|d| d.shadow_root)
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.data(node)?.kind {
            NodeKind::Element(tag) => Some(tag.as_str()),
            _ => None,
        }
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.data(node)?.kind {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.data(node)?.attributes.get(name).map(String::as_str)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|&n| self.attribute(n, "id") == Some(id))
            .find(|&n| self.is_connected(n))
    }

    fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    fn focus(&mut self, node: NodeId, options: FocusOptions) -> bool {
        if !self.is_element(node) || !self.is_connected(node) || self.is_focus_blocked(node) {
            return false;
        }
        self.active = Some(node);
        self.focus_log.push((node, options));
        true
    }

    fn select_text(&mut self, node: NodeId) {
        self.selected_text = Some(node);
    }
}
