//! Text values used for typeahead matching

use std::sync::OnceLock;

use regex::Regex;

use crate::dom::{query, Dom, NodeId};

fn pictographs() -> &'static Regex {
    static PICTOGRAPHS: OnceLock<Regex> = OnceLock::new();
    PICTOGRAPHS.get_or_init(|| {
        Regex::new(r"[\u{2011}-\u{26FF}\u{2700}-\u{27BF}\u{E000}-\u{F8FF}\u{1F000}-\u{1FFFF}]")
            .expect("pictograph pattern is valid")
    })
}

/// Visible text of `node` with hidden/decorative descendants and emoji removed
fn text_contents<D: Dom + ?Sized>(dom: &D, node: NodeId) -> String {
    let text = query::visible_text(dom, node);
    pictographs().replace_all(&text, "").into_owned()
}

fn label_of<D: Dom + ?Sized>(dom: &D, node: NodeId) -> String {
    match dom.attribute(node, "aria-label") {
        Some(label) => label.trim().to_string(),
        None => text_contents(dom, node).trim().to_string(),
    }
}

/// The accessible text of an option, in priority order:
/// `aria-label`, then the texts of the `aria-labelledby` targets joined with
/// `", "`, then the element's own visible text.
pub fn text_value<D: Dom + ?Sized>(dom: &D, node: NodeId) -> String {
    if let Some(label) = dom.attribute(node, "aria-label") {
        return label.trim().to_string();
    }

    if let Some(ids) = dom.attribute(node, "aria-labelledby") {
        let labels: Vec<String> = ids
            .split_whitespace()
            .filter_map(|id| dom.element_by_id(id))
            .map(|label| label_of(dom, label))
            .filter(|label| !label.is_empty())
            .collect();
        if !labels.is_empty() {
            return labels.join(", ");
        }
    }

    text_contents(dom, node).trim().to_string()
}

/// Cached lowercase text value, keyed on the raw text of the node.
///
/// The derived value is recomputed only when the node's raw text changes.
/// Label attributes are read on recompute, so a host that edits
/// `aria-label` without touching text must call [`TextValue::invalidate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextValue {
    key: Option<String>,
    value: String,
}

impl TextValue {
    /// An empty, never-computed cache
    pub fn new() -> Self {
        Self::default()
    }

    /// The lowercase text value of `node`, recomputed if its text changed
    pub fn resolve<D: Dom + ?Sized>(&mut self, dom: &D, node: NodeId) -> &str {
        let key = query::raw_text(dom, node);
        if self.key.as_deref() != Some(key.as_str()) {
            self.value = text_value(dom, node).to_lowercase();
            self.key = Some(key);
        }
        &self.value
    }

    /// Force the next [`TextValue::resolve`] to recompute
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    /// The last computed value, if any
    pub fn cached(&self) -> Option<&str> {
        self.key.as_ref().map(|_| self.value.as_str())
    }
}
