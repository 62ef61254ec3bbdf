//! Typeahead: printable keys resolved to an option by text prefix

use crate::dom::Dom;

use super::CollectionOption;

/// Accumulates printable keystrokes into a lowercase search buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeaheadMatcher {
    query: String,
}

impl TypeaheadMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated buffer
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether a query is in progress
    pub fn is_searching(&self) -> bool {
        !self.query.is_empty()
    }

    /// Append `input` (lowercased) and find the first enabled option whose
    /// text value starts with the whole buffer.
    ///
    /// Candidates are scanned in rotation order starting from the active
    /// option. A fresh query starts just after it, so pressing the same
    /// letter again once the buffer cleared moves on to the next match. A
    /// continuing query includes it, so widening a prefix that still matches
    /// the active option keeps it. With nothing active the scan starts at 0.
    ///
    /// The buffer keeps the new input even when nothing matches.
    pub fn on_input<V, D: Dom + ?Sized>(
        &mut self,
        input: &str,
        options: &mut [CollectionOption<V>],
        active: Option<usize>,
        dom: &D,
    ) -> Option<usize> {
        let offset = if self.is_searching() { 0 } else { 1 };
        self.query.push_str(&input.to_lowercase());

        let len = options.len();
        if len == 0 {
            return None;
        }
        let start = match active.filter(|&i| i < len) {
            Some(i) => (i + offset) % len,
            None => 0,
        };

        (0..len).map(|step| (start + step) % len).find(|&index| {
            let option = &mut options[index];
            !option.disabled && option.text_value(dom).starts_with(self.query.as_str())
        })
    }

    /// [`TypeaheadMatcher::on_input`] for a single key
    pub fn on_key<V, D: Dom + ?Sized>(
        &mut self,
        key: char,
        options: &mut [CollectionOption<V>],
        active: Option<usize>,
        dom: &D,
    ) -> Option<usize> {
        let mut buf = [0u8; 4];
        self.on_input(key.encode_utf8(&mut buf), options, active, dom)
    }

    /// Empty the buffer
    pub fn clear(&mut self) {
        self.query.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, NodeId};

    fn fixture(labels: &[&str]) -> (MemoryDom, Vec<CollectionOption<usize>>) {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let list = dom.append_element(body, "ul");
        let options = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let node: NodeId = dom.append_element(list, "li");
                dom.append_text(node, label);
                CollectionOption::new(format!("o{i}"), node, i)
            })
            .collect();
        (dom, options)
    }

    #[test]
    fn test_prefix_match_is_case_insensitive() {
        let (dom, mut options) = fixture(&["Alpha", "alpine", "Beta"]);
        let mut matcher = TypeaheadMatcher::new();

        assert_eq!(matcher.on_key('A', &mut options, None, &dom), Some(0));
        assert_eq!(matcher.on_key('L', &mut options, Some(0), &dom), Some(0));
        assert_eq!(matcher.query(), "al");
        assert_eq!(matcher.on_key('p', &mut options, Some(0), &dom), Some(0));
        assert_eq!(matcher.on_key('i', &mut options, Some(0), &dom), Some(1));
    }

    #[test]
    fn test_fresh_query_starts_after_active() {
        let (dom, mut options) = fixture(&["Alpha", "alpine", "Beta"]);
        let mut matcher = TypeaheadMatcher::new();

        assert_eq!(matcher.on_key('a', &mut options, Some(0), &dom), Some(1));
        matcher.clear();
        assert_eq!(matcher.on_key('a', &mut options, Some(1), &dom), Some(0));
    }

    #[test]
    fn test_no_match_keeps_query() {
        let (dom, mut options) = fixture(&["Alpha", "Beta"]);
        let mut matcher = TypeaheadMatcher::new();

        assert_eq!(matcher.on_key('z', &mut options, Some(1), &dom), None);
        assert_eq!(matcher.query(), "z");
        assert!(matcher.is_searching());
    }

    #[test]
    fn test_disabled_options_are_skipped() {
        let (dom, mut options) = fixture(&["Banana", "Berry", "Apple"]);
        options[0].disabled = true;
        let mut matcher = TypeaheadMatcher::new();

        assert_eq!(matcher.on_key('b', &mut options, None, &dom), Some(1));
    }

    #[test]
    fn test_widening_query_moves_to_longer_match() {
        let (dom, mut options) = fixture(&["Banana", "Berry", "Apple"]);
        let mut matcher = TypeaheadMatcher::new();

        assert_eq!(matcher.on_key('b', &mut options, None, &dom), Some(0));
        assert_eq!(matcher.on_key('e', &mut options, Some(0), &dom), Some(1));
        assert_eq!(matcher.query(), "be");
    }
}
