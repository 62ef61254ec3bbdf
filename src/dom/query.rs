//! Tree queries over any [`Dom`] host
//!
//! These are the engine-side equivalents of `Node.contains`,
//! `compareDocumentPosition`, `composedPath` and friends.

use std::cmp::Ordering;

use super::{Dom, NodeId};

/// Whether `node` can be reached from the document root through the composed tree
pub fn is_connected<D: Dom + ?Sized>(dom: &D, node: NodeId) -> bool {
    let root = dom.root();
    let mut current = node;
    loop {
        if current == root {
            return true;
        }
        match dom.composed_parent(current) {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

/// Composed ancestor chain, starting at the root and ending at `node`.
/// `None` if the chain does not reach the document root.
fn rooted_chain<D: Dom + ?Sized>(dom: &D, node: NodeId) -> Option<Vec<NodeId>> {
    let root = dom.root();
    let mut chain = vec![node];
    let mut current = node;
    while current != root {
        current = dom.composed_parent(current)?;
        chain.push(current);
    }
    chain.reverse();
    Some(chain)
}

/// Position of `child` under `parent` in composed order. A shadow root sorts
/// ahead of the light children of its host.
fn slot_in_parent<D: Dom + ?Sized>(dom: &D, parent: NodeId, child: NodeId) -> isize {
    if dom.shadow_root(parent) == Some(child) {
        return -1;
    }
    dom.children(parent)
        .iter()
        .position(|&c| c == child)
        .map(|i| i as isize)
        .unwrap_or(isize::MAX)
}

/// Composed document order of `a` relative to `b`.
///
/// Ancestors precede their descendants. Returns `None` if either node is
/// detached, which callers treat as "order unknown".
pub fn document_order<D: Dom + ?Sized>(dom: &D, a: NodeId, b: NodeId) -> Option<Ordering> {
    if a == b {
        return Some(Ordering::Equal);
    }
    let chain_a = rooted_chain(dom, a)?;
    let chain_b = rooted_chain(dom, b)?;

    let common = chain_a
        .iter()
        .zip(chain_b.iter())
        .take_while(|(x, y)| x == y)
        .count();

    if common == chain_a.len() {
        return Some(Ordering::Less);
    }
    if common == chain_b.len() {
        return Some(Ordering::Greater);
    }

    let parent = chain_a[common - 1];
    let slot_a = slot_in_parent(dom, parent, chain_a[common]);
    let slot_b = slot_in_parent(dom, parent, chain_b[common]);
    Some(slot_a.cmp(&slot_b))
}

/// Light-tree containment, inclusive (`contains(x, x)` is true)
pub fn contains<D: Dom + ?Sized>(dom: &D, ancestor: NodeId, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(n) = current {
        if n == ancestor {
            return true;
        }
        current = dom.parent(n);
    }
    false
}

/// The composed path from `node` up to the document root, target first
pub fn composed_path<D: Dom + ?Sized>(dom: &D, node: NodeId) -> Vec<NodeId> {
    let mut path = vec![node];
    let mut current = node;
    while let Some(parent) = dom.composed_parent(current) {
        path.push(parent);
        current = parent;
    }
    path
}

/// Element descendants of `node` (exclusive) in light-tree preorder
pub fn descendants<D: Dom + ?Sized>(dom: &D, node: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = dom.children(node).iter().rev().copied().collect();
    while let Some(current) = stack.pop() {
        if dom.is_element(current) {
            out.push(current);
        }
        stack.extend(dom.children(current).iter().rev().copied());
    }
    out
}

/// Closest inclusive light-tree ancestor matching `predicate`
pub fn closest<D, F>(dom: &D, node: NodeId, predicate: F) -> Option<NodeId>
where
    D: Dom + ?Sized,
    F: Fn(&D, NodeId) -> bool,
{
    let mut current = Some(node);
    while let Some(n) = current {
        if dom.is_element(n) && predicate(dom, n) {
            return Some(n);
        }
        current = dom.parent(n);
    }
    None
}

fn sibling_element<D: Dom + ?Sized>(dom: &D, node: NodeId, forward: bool) -> Option<NodeId> {
    let parent = dom.parent(node)?;
    let siblings = dom.children(parent);
    let index = siblings.iter().position(|&c| c == node)?;
    if forward {
        siblings[index + 1..]
            .iter()
            .copied()
            .find(|&c| dom.is_element(c))
    } else {
        siblings[..index]
            .iter()
            .rev()
            .copied()
            .find(|&c| dom.is_element(c))
    }
}

/// `nextElementSibling`
pub fn next_element_sibling<D: Dom + ?Sized>(dom: &D, node: NodeId) -> Option<NodeId> {
    sibling_element(dom, node, true)
}

/// `previousElementSibling`
pub fn previous_element_sibling<D: Dom + ?Sized>(dom: &D, node: NodeId) -> Option<NodeId> {
    sibling_element(dom, node, false)
}

/// Subtrees excluded from visible text
fn is_text_hidden<D: Dom + ?Sized>(dom: &D, node: NodeId) -> bool {
    dom.has_attribute(node, "hidden")
        || dom.has_attribute(node, "aria-hidden")
        || dom.attribute(node, "role") == Some("img")
}

/// Concatenated text of `node`, skipping hidden and decorative subtrees
/// (`hidden`, `aria-hidden`, `role="img"`) below it.
pub fn visible_text<D: Dom + ?Sized>(dom: &D, node: NodeId) -> String {
    let mut out = String::new();
    collect_text(dom, node, true, &mut out);
    out
}

/// Concatenated text of `node` with nothing skipped
pub fn raw_text<D: Dom + ?Sized>(dom: &D, node: NodeId) -> String {
    let mut out = String::new();
    collect_text(dom, node, false, &mut out);
    out
}

fn collect_text<D: Dom + ?Sized>(dom: &D, node: NodeId, skip_hidden: bool, out: &mut String) {
    if let Some(text) = dom.text(node) {
        out.push_str(text);
        return;
    }
    for &child in dom.children(node) {
        if skip_hidden && dom.is_element(child) && is_text_hidden(dom, child) {
            continue;
        }
        collect_text(dom, child, skip_hidden, out);
    }
}
