//! Focusable element discovery and relative focus movement

use crate::dom::{query, Dom, FocusOptions, NodeId};

bitflags::bitflags! {
    /// What [`focus_in`] should do
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FocusFlags: u8 {
        /// First candidate
        const FIRST       = 0b0000_0001;
        /// Candidate before the reference element
        const PREVIOUS    = 0b0000_0010;
        /// Candidate after the reference element
        const NEXT        = 0b0000_0100;
        /// Last candidate
        const LAST        = 0b0000_1000;
        /// Wrap past either end instead of reporting overflow/underflow
        const WRAP_AROUND = 0b0001_0000;
        /// Ask the host not to scroll
        const NO_SCROLL   = 0b0010_0000;
        /// Only consider `[data-autofocus]` candidates
        const AUTO_FOCUS  = 0b0100_0000;
    }
}

/// Outcome of [`focus_in`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusResult {
    /// Focus landed on a candidate
    Success,
    /// Ran past the last candidate
    Overflow,
    /// Ran before the first candidate
    Underflow,
    /// No candidate accepted focus
    Error,
}

/// How [`is_focusable`] matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusableMode {
    /// The element itself must be focusable
    Strict,
    /// The element or one of its ancestors must be focusable
    Loose,
}

/// Candidates for [`focus_in`]
#[derive(Debug, Clone, Copy)]
pub enum FocusScope<'a> {
    /// Focusable descendants of an element
    Container(NodeId),
    /// An explicit set of elements, visited in document order
    Elements(&'a [NodeId]),
}

fn tab_index<D: Dom + ?Sized>(dom: &D, node: NodeId) -> Option<i64> {
    dom.attribute(node, "tabindex")
        .and_then(|v| v.trim().parse().ok())
}

/// Whether `node` matches the focusable selector: editable content, anything
/// with a `tabindex`, links and areas with `href`, enabled form controls and
/// iframes. `tabindex="-1"` always excludes.
pub fn is_focusable_element<D: Dom + ?Sized>(dom: &D, node: NodeId) -> bool {
    let Some(tag) = dom.tag_name(node) else {
        return false;
    };
    if tab_index(dom, node) == Some(-1) {
        return false;
    }
    if dom.attribute(node, "contenteditable") == Some("true") || dom.has_attribute(node, "tabindex")
    {
        return true;
    }
    match tag {
        "a" | "area" => dom.has_attribute(node, "href"),
        "button" | "input" | "select" | "textarea" => !dom.has_attribute(node, "disabled"),
        "iframe" => true,
        _ => false,
    }
}

pub fn is_focusable<D: Dom + ?Sized>(dom: &D, node: NodeId, mode: FocusableMode) -> bool {
    match mode {
        FocusableMode::Strict => is_focusable_element(dom, node),
        FocusableMode::Loose => {
            query::closest(dom, node, |dom, n| is_focusable_element(dom, n)).is_some()
        }
    }
}

fn is_excluded_subtree<D: Dom + ?Sized>(dom: &D, node: NodeId) -> bool {
    dom.has_attribute(node, "hidden") || dom.has_attribute(node, "inert")
}

/// Whether `node` or an ancestor below `container` hides it
fn is_hidden_within<D: Dom + ?Sized>(dom: &D, container: NodeId, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(n) = current {
        if n == container {
            return false;
        }
        if is_excluded_subtree(dom, n) {
            return true;
        }
        current = dom.parent(n);
    }
    false
}

/// Focusable descendants of `container` in tab order: document order, with
/// positive `tabindex` values first (ascending) and `tabindex="0"` or
/// implicit ones after them.
pub fn focusable_elements<D: Dom + ?Sized>(dom: &D, container: NodeId) -> Vec<NodeId> {
    let mut elements: Vec<NodeId> = query::descendants(dom, container)
        .into_iter()
        .filter(|&n| is_focusable_element(dom, n) && !is_hidden_within(dom, container, n))
        .collect();
    elements.sort_by_key(|&n| match tab_index(dom, n) {
        None | Some(0) => i64::MAX,
        Some(index) => index,
    });
    elements
}

/// Focusable descendants carrying `data-autofocus`
pub fn autofocus_elements<D: Dom + ?Sized>(dom: &D, container: NodeId) -> Vec<NodeId> {
    focusable_elements(dom, container)
        .into_iter()
        .filter(|&n| dom.has_attribute(n, "data-autofocus"))
        .collect()
}

/// Sort by composed document order; detached nodes keep their relative order
/// at the end.
pub fn sort_by_document_order<D: Dom + ?Sized>(dom: &D, nodes: &mut Vec<NodeId>) {
    let (mut connected, detached): (Vec<_>, Vec<_>) =
        nodes.drain(..).partition(|&n| dom.is_connected(n));
    connected.sort_by(|&a, &b| {
        dom.document_order(a, b)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    connected.extend(detached);
    *nodes = connected;
}

/// Focus `node` without scrolling
pub fn focus_element<D: Dom + ?Sized>(dom: &mut D, node: NodeId) -> bool {
    log::trace!("focusing {node}");
    dom.focus(node, FocusOptions::no_scroll())
}

fn is_selectable<D: Dom + ?Sized>(dom: &D, node: NodeId) -> bool {
    matches!(dom.tag_name(node), Some("input") | Some("textarea"))
}

/// Move focus among the candidates of `scope`.
///
/// The starting point comes from `flags`: FIRST/LAST are absolute, while
/// NEXT/PREVIOUS are relative to `relative_to` (the active element when
/// `None`). Candidates that refuse focus are skipped in the direction of
/// travel. Elements in `skip` are ignored unless they are the only
/// candidate. Moving with NEXT/PREVIOUS onto a text field selects its
/// contents.
pub fn focus_in<D: Dom + ?Sized>(
    dom: &mut D,
    scope: FocusScope<'_>,
    flags: FocusFlags,
    relative_to: Option<NodeId>,
    skip: &[NodeId],
) -> FocusResult {
    let mut elements = match scope {
        FocusScope::Elements(nodes) => {
            let mut nodes = nodes.to_vec();
            sort_by_document_order(&*dom, &mut nodes);
            nodes
        }
        FocusScope::Container(container) if flags.contains(FocusFlags::AUTO_FOCUS) => {
            autofocus_elements(&*dom, container)
        }
        FocusScope::Container(container) => focusable_elements(&*dom, container),
    };
    if !skip.is_empty() && elements.len() > 1 {
        elements.retain(|n| !skip.contains(n));
    }

    let relative_to = relative_to.or_else(|| dom.active_element());
    let relative_index = relative_to
        .and_then(|r| elements.iter().position(|&n| n == r))
        .unwrap_or(0) as i64;
    let total = elements.len() as i64;

    let direction: i64 = if flags.intersects(FocusFlags::FIRST | FocusFlags::NEXT) {
        1
    } else if flags.intersects(FocusFlags::PREVIOUS | FocusFlags::LAST) {
        -1
    } else {
        log::warn!("focus_in called without FIRST, PREVIOUS, NEXT or LAST");
        return FocusResult::Error;
    };
    let start = if flags.contains(FocusFlags::FIRST) {
        0
    } else if flags.contains(FocusFlags::PREVIOUS) {
        relative_index - 1
    } else if flags.contains(FocusFlags::NEXT) {
        relative_index + 1
    } else {
        total - 1
    };

    let options = if flags.contains(FocusFlags::NO_SCROLL) {
        FocusOptions::no_scroll()
    } else {
        FocusOptions::default()
    };

    let mut offset = 0i64;
    loop {
        if offset >= total || offset + total <= 0 {
            return FocusResult::Error;
        }
        let mut index = start + offset;
        if flags.contains(FocusFlags::WRAP_AROUND) {
            index = index.rem_euclid(total);
        } else if index < 0 {
            return FocusResult::Underflow;
        } else if index >= total {
            return FocusResult::Overflow;
        }

        let candidate = elements[index as usize];
        offset += direction;
        if dom.focus(candidate, options) && dom.active_element() == Some(candidate) {
            log::trace!("focus moved to {candidate}");
            if flags.intersects(FocusFlags::NEXT | FocusFlags::PREVIOUS)
                && is_selectable(&*dom, candidate)
            {
                dom.select_text(candidate);
            }
            return FocusResult::Success;
        }
    }
}

/// Move focus relative to `from` among every focusable element of the
/// document
pub fn focus_from<D: Dom + ?Sized>(dom: &mut D, from: NodeId, flags: FocusFlags) -> FocusResult {
    let root = dom.root();
    focus_in(dom, FocusScope::Container(root), flags, Some(from), &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    fn form(dom: &mut MemoryDom) -> (NodeId, Vec<NodeId>) {
        let body = dom.body();
        let form = dom.append_element(body, "form");
        let a = dom.append_element(form, "input");
        let b = dom.append_element(form, "button");
        let c = dom.append_element(form, "textarea");
        (form, vec![a, b, c])
    }

    #[test]
    fn test_focusable_selector() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let link = dom.append_element(body, "a");
        assert!(!is_focusable_element(&dom, link));
        dom.set_attribute(link, "href", "#");
        assert!(is_focusable_element(&dom, link));

        let button = dom.append_element(body, "button");
        dom.set_attribute(button, "disabled", "");
        assert!(!is_focusable_element(&dom, button));

        let div = dom.append_element(body, "div");
        dom.set_attribute(div, "tabindex", "0");
        assert!(is_focusable_element(&dom, div));
        dom.set_attribute(div, "tabindex", "-1");
        assert!(!is_focusable_element(&dom, div));

        let editable = dom.append_element(body, "div");
        dom.set_attribute(editable, "contenteditable", "true");
        assert!(is_focusable_element(&dom, editable));
    }

    #[test]
    fn test_loose_matching_looks_at_ancestors() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let button = dom.append_element(body, "button");
        let icon = dom.append_element(button, "span");
        assert!(!is_focusable(&dom, icon, FocusableMode::Strict));
        assert!(is_focusable(&dom, icon, FocusableMode::Loose));
    }

    #[test]
    fn test_positive_tabindex_sorts_first() {
        let mut dom = MemoryDom::new();
        let (form, nodes) = form(&mut dom);
        dom.set_attribute(nodes[2], "tabindex", "1");
        dom.set_attribute(nodes[1], "tabindex", "0");
        assert_eq!(
            focusable_elements(&dom, form),
            vec![nodes[2], nodes[0], nodes[1]]
        );
    }

    #[test]
    fn test_hidden_and_inert_subtrees_are_skipped() {
        let mut dom = MemoryDom::new();
        let (form, nodes) = form(&mut dom);
        let hidden = dom.append_element(form, "div");
        dom.set_attribute(hidden, "hidden", "");
        dom.append_element(hidden, "button");
        dom.set_attribute(nodes[1], "inert", "");
        assert_eq!(focusable_elements(&dom, form), vec![nodes[0], nodes[2]]);
    }

    #[test]
    fn test_focus_in_first_last_and_overflow() {
        let mut dom = MemoryDom::new();
        let (form, nodes) = form(&mut dom);
        let scope = FocusScope::Container(form);

        assert_eq!(
            focus_in(&mut dom, scope, FocusFlags::FIRST, None, &[]),
            FocusResult::Success
        );
        assert_eq!(dom.active_element(), Some(nodes[0]));
        assert_eq!(
            focus_in(&mut dom, scope, FocusFlags::LAST, None, &[]),
            FocusResult::Success
        );
        assert_eq!(dom.active_element(), Some(nodes[2]));
        assert_eq!(
            focus_in(&mut dom, scope, FocusFlags::NEXT, None, &[]),
            FocusResult::Overflow
        );
        assert_eq!(
            focus_in(&mut dom, scope, FocusFlags::NEXT | FocusFlags::WRAP_AROUND, None, &[]),
            FocusResult::Success
        );
        assert_eq!(dom.active_element(), Some(nodes[0]));
        assert_eq!(
            focus_in(&mut dom, scope, FocusFlags::PREVIOUS, None, &[]),
            FocusResult::Underflow
        );
    }

    #[test]
    fn test_focus_in_empty_scope_is_error() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let empty = dom.append_element(body, "div");
        assert_eq!(
            focus_in(&mut dom, FocusScope::Container(empty), FocusFlags::FIRST, None, &[]),
            FocusResult::Error
        );
    }

    #[test]
    fn test_next_selects_text_fields() {
        let mut dom = MemoryDom::new();
        let (form, nodes) = form(&mut dom);
        focus_element(&mut dom, nodes[1]);
        focus_in(
            &mut dom,
            FocusScope::Container(form),
            FocusFlags::NEXT,
            None,
            &[],
        );
        assert_eq!(dom.active_element(), Some(nodes[2]));
        assert_eq!(dom.selected_text(), Some(nodes[2]));
    }

    #[test]
    fn test_skip_elements_and_explicit_scope() {
        let mut dom = MemoryDom::new();
        let (_, nodes) = form(&mut dom);
        let reversed = vec![nodes[2], nodes[1], nodes[0]];
        focus_in(
            &mut dom,
            FocusScope::Elements(&reversed),
            FocusFlags::FIRST,
            None,
            &[nodes[0]],
        );
        assert_eq!(dom.active_element(), Some(nodes[1]));
    }

    #[test]
    fn test_autofocus_candidates() {
        let mut dom = MemoryDom::new();
        let (form, nodes) = form(&mut dom);
        dom.set_attribute(nodes[1], "data-autofocus", "");
        assert_eq!(
            focus_in(
                &mut dom,
                FocusScope::Container(form),
                FocusFlags::FIRST | FocusFlags::AUTO_FOCUS,
                None,
                &[]
            ),
            FocusResult::Success
        );
        assert_eq!(dom.active_element(), Some(nodes[1]));
    }
}
